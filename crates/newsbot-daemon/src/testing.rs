//! 테스트용 가짜 시세 제공자와 기록용 전송기.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use newsbot_core::{Price, PriceBar, SubscriberId};
use newsbot_data::{DataError, QuoteProvider};
use newsbot_notification::{NotificationError, NotificationResult, Notifier};
use rust_decimal::Decimal;

#[derive(Default)]
pub struct FakeQuotes {
    pub series: HashMap<String, Vec<PriceBar>>,
    pub latest: Mutex<HashMap<String, Price>>,
    pub latest_calls: Mutex<Vec<String>>,
}

impl FakeQuotes {
    pub fn with_series(mut self, symbol: &str, closes: &[Decimal]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar::from_close(start + chrono::Duration::days(i as i64), *c))
            .collect();
        self.series.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_latest(self, symbol: &str, price: Price) -> Self {
        self.set_latest(symbol, price);
        self
    }

    pub fn set_latest(&self, symbol: &str, price: Price) {
        self.latest.lock().unwrap().insert(symbol.to_string(), price);
    }
}

#[async_trait]
impl QuoteProvider for FakeQuotes {
    async fn daily_series(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> newsbot_data::Result<Vec<PriceBar>> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::Unavailable(symbol.to_string()))
    }

    async fn latest_price(&self, symbol: &str) -> newsbot_data::Result<Price> {
        self.latest_calls.lock().unwrap().push(symbol.to_string());
        self.latest
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| DataError::Unavailable(symbol.to_string()))
    }
}

/// 오름차순 종가 n개 (100, 101, ...).
pub fn rising(n: usize) -> Vec<Decimal> {
    (0..n).map(|i| Decimal::from(100 + i as i64)).collect()
}

/// 보낸 메시지를 기록하는 전송기. `fail_for` 수신자에게는 실패합니다.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail_for: Option<SubscriberId>,
    sent: tokio::sync::Mutex<Vec<(SubscriberId, String)>>,
}

impl RecordingNotifier {
    pub fn failing_for(recipient: SubscriberId) -> Self {
        Self {
            fail_for: Some(recipient),
            ..Default::default()
        }
    }

    pub async fn sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, recipient: &SubscriberId, text: &str) -> NotificationResult<()> {
        if self.fail_for.as_ref() == Some(recipient) {
            return Err(NotificationError::RecipientUnavailable("blocked".into()));
        }
        self.sent
            .lock()
            .await
            .push((recipient.clone(), text.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
