//! 일일 다이제스트 사이클.
//!
//! 짧은 주기로 현지 시각(시계 + 고정 UTC 오프셋)을 확인하다가
//! 목표 시각의 0분에 한 번 발송합니다. 발송 후에는 그 분의 남은 시간을 쉬어
//! 같은 경계 안에서 다시 발송되지 않게 하고, 날짜 기록으로 하루 한 번을 보장합니다.
//! 날짜는 발송이 성공한 뒤에만 기록되므로 실패한 발송은 backoff 후 재시도됩니다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use newsbot_core::{Signal, SignalReport};
use newsbot_data::SubscriberRegistry;
use newsbot_notification::{Broadcaster, NotificationEvent};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::clock::Clock;
use crate::scheduler::Cycle;
use crate::service::MarketService;
use crate::stats::CycleStats;
use crate::Result;

/// 기본 티커 목록의 스냅샷을 모아 하루 한 번 모든 구독자에게 보냅니다.
pub struct DigestCycle {
    registry: Arc<SubscriberRegistry>,
    market: Arc<MarketService>,
    broadcaster: Broadcaster,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    target_hour: u32,
    tickers: Vec<String>,
    last_fired: Mutex<Option<NaiveDate>>,
    cancel: CancellationToken,
}

impl DigestCycle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        market: Arc<MarketService>,
        broadcaster: Broadcaster,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
        target_hour: u32,
        tickers: Vec<String>,
    ) -> Self {
        Self {
            registry,
            market,
            broadcaster,
            clock,
            offset,
            target_hour,
            tickers,
            last_fired: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// 발송 후 분 경계 대기를 종료 신호로 끊을 수 있게 합니다.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 현지 시각.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// 목표 시각의 0분이고 오늘 아직 발송하지 않았으면 `true`.
    pub async fn is_due(&self, local: DateTime<FixedOffset>) -> bool {
        local.hour() == self.target_hour
            && local.minute() == 0
            && *self.last_fired.lock().await != Some(local.date_naive())
    }

    /// 다이제스트를 만들어 모든 구독자에게 보냅니다.
    pub async fn send_digest(&self, date: NaiveDate) -> Result<CycleStats> {
        let mut stats = CycleStats::new();

        // FETCHING + PROCESSING
        let mut reports = Vec::with_capacity(self.tickers.len());
        for ticker in &self.tickers {
            let report = self.market.report(ticker).await;
            stats.total += 1;
            match &report {
                SignalReport::Ready(_) => stats.success += 1,
                SignalReport::InsufficientData { .. } => stats.skipped += 1,
                SignalReport::Unavailable { .. } => stats.errors += 1,
            }
            reports.push(report);
        }

        let buys = reports.iter().filter(|r| r.signal() == Signal::Buy).count();
        let sells = reports.iter().filter(|r| r.signal() == Signal::Sell).count();

        // DISPATCHING
        let recipients = self.registry.list_all().await?;
        let report = self
            .broadcaster
            .broadcast(&recipients, &NotificationEvent::DailyDigest { date, reports })
            .await;
        stats.record_dispatch(report);

        info!(%date, buys, sells, recipients = recipients.len(), "일일 다이제스트 발송");
        Ok(stats)
    }
}

#[async_trait]
impl Cycle for DigestCycle {
    fn name(&self) -> &'static str {
        "digest"
    }

    async fn run_once(&self) -> Result<CycleStats> {
        let local = self.local_now();
        if !self.is_due(local).await {
            return Ok(CycleStats::new());
        }

        let date = local.date_naive();
        let stats = self.send_digest(date).await?;
        *self.last_fired.lock().await = Some(date);

        // 같은 분 경계 안에서 재발송 방지
        let remaining = 60 - u64::from(self.local_now().second().min(59));
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(Duration::from_secs(remaining)) => {}
        }

        Ok(stats)
    }
}
