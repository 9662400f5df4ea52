//! 시세 제공자.
//!
//! 심볼 정규화(거래소 접미사)는 호출자가 수행합니다.

mod yahoo;

pub use yahoo::YahooQuoteProvider;

use async_trait::async_trait;
use newsbot_core::{Price, PriceBar, PriceChange};

use crate::error::{DataError, Result};

/// 전일 대비 변화 계산에 쓰는 조회 기간 (휴장일 포함 여유).
pub const PRICE_CHANGE_LOOKBACK_DAYS: u32 = 7;

/// 일봉 시계열과 최근가를 제공하는 외부 시세 소스.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 최근 `lookback_days`일의 일봉을 날짜 오름차순으로 반환합니다.
    async fn daily_series(&self, symbol: &str, lookback_days: u32) -> Result<Vec<PriceBar>>;

    /// 최근가. 조회할 수 없으면 `DataError::Unavailable` 등의 에러.
    async fn latest_price(&self, symbol: &str) -> Result<Price>;

    /// 최근 종가와 전일 종가.
    async fn price_change(&self, symbol: &str) -> Result<PriceChange> {
        let series = self.daily_series(symbol, PRICE_CHANGE_LOOKBACK_DAYS).await?;
        PriceChange::from_series(symbol, &series)
            .ok_or_else(|| DataError::Unavailable(symbol.to_string()))
    }
}
