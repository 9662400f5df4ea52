//! Yahoo Finance 시세 제공자.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use newsbot_core::{Price, PriceBar};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api::{Quote, YahooConnector};

use super::QuoteProvider;
use crate::error::{DataError, Result};

/// Yahoo Finance 기반 시세 제공자.
///
/// 모든 호출은 `request_timeout`으로 제한됩니다.
pub struct YahooQuoteProvider {
    connector: YahooConnector,
    request_timeout: Duration,
    /// 최근가 조회 실패 시 떼고 재시도할 거래소 접미사 (예: ".JK")
    fallback_suffix: Option<String>,
}

impl YahooQuoteProvider {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let connector = YahooConnector::new()
            .map_err(|e| DataError::ConfigError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self {
            connector,
            request_timeout,
            fallback_suffix: None,
        })
    }

    /// 최근가 조회가 실패하면 이 접미사를 제거한 심볼로 한 번 더 시도합니다.
    pub fn with_fallback_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.fallback_suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    async fn with_timeout<T, F>(&self, symbol: &str, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| DataError::Timeout(format!("Yahoo Finance ({})", symbol)))?
    }

    async fn fetch_last_close(&self, symbol: &str) -> Result<Price> {
        self.with_timeout(symbol, async {
            let response = self
                .connector
                .get_latest_quotes(symbol, "1d")
                .await
                .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", symbol, e)))?;
            let quote = response
                .last_quote()
                .map_err(|e| DataError::Unavailable(format!("{}: {}", symbol, e)))?;
            to_decimal(quote.close)
                .filter(|p| *p > Decimal::ZERO)
                .ok_or_else(|| DataError::Unavailable(symbol.to_string()))
        })
        .await
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn daily_series(&self, symbol: &str, lookback_days: u32) -> Result<Vec<PriceBar>> {
        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(i64::from(lookback_days.max(1)));

        debug!(symbol, lookback_days, "Yahoo Finance 일봉 조회");

        let quotes = self
            .with_timeout(symbol, async {
                let response = self
                    .connector
                    .get_quote_history_interval(symbol, start, end, "1d")
                    .await
                    .map_err(|e| {
                        DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", symbol, e))
                    })?;
                response
                    .quotes()
                    .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))
            })
            .await?;

        let series = quotes_to_bars(&quotes);
        if series.is_empty() {
            return Err(DataError::Unavailable(symbol.to_string()));
        }
        Ok(series)
    }

    async fn latest_price(&self, symbol: &str) -> Result<Price> {
        match self.fetch_last_close(symbol).await {
            Ok(price) => Ok(price),
            Err(err) => {
                let stripped = self
                    .fallback_suffix
                    .as_deref()
                    .and_then(|suffix| symbol.strip_suffix(suffix))
                    .filter(|s| !s.is_empty());
                match stripped {
                    Some(bare) => {
                        warn!(symbol, error = %err, "최근가 조회 실패, 접미사 없이 재시도");
                        self.fetch_last_close(bare).await
                    }
                    None => Err(err),
                }
            }
        }
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.normalize())
}

/// Yahoo 응답을 날짜 오름차순, 날짜 중복 없는 일봉으로 변환합니다.
///
/// 같은 날짜가 여러 번 오면 마지막 값을 사용합니다. 결측 가격은 0으로 둡니다.
fn quotes_to_bars(quotes: &[Quote]) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = quotes
        .iter()
        .filter_map(|q| {
            let date = Utc.timestamp_opt(q.timestamp as i64, 0).single()?.date_naive();
            Some(PriceBar::new(
                date,
                to_decimal(q.open).unwrap_or_default(),
                to_decimal(q.high).unwrap_or_default(),
                to_decimal(q.low).unwrap_or_default(),
                to_decimal(q.close).unwrap_or_default(),
                Decimal::from(q.volume),
            ))
        })
        .collect();

    bars.sort_by_key(|b| b.date);

    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }
    deduped
}
