//! 시장 데이터 타입.
//!
//! - `PriceBar` - 일봉 OHLCV 데이터
//! - `PriceChange` - 최근 종가와 전일 대비 변화

use crate::types::{percent_change, Percentage, Price};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 한 거래 세션의 일봉 데이터.
///
/// 시계열은 날짜 오름차순이며 날짜가 중복되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Decimal,
}

impl PriceBar {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 종가만으로 일봉을 생성합니다 (테스트/보간용).
    pub fn from_close(date: NaiveDate, close: Price) -> Self {
        Self::new(date, close, close, close, close, Decimal::ZERO)
    }

    /// 유효한 종가인지 확인합니다. 제공자 결측치는 0으로 디코딩되므로 제외됩니다.
    pub fn has_valid_close(&self) -> bool {
        self.close > Decimal::ZERO
    }
}

/// 시계열에서 유효한 종가만 순서대로 추출합니다.
pub fn valid_closes(series: &[PriceBar]) -> Vec<Price> {
    series
        .iter()
        .filter(|bar| bar.has_valid_close())
        .map(|bar| bar.close)
        .collect()
}

/// 최근 종가와 전일 대비 변화.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    /// 시세 조회 심볼
    pub symbol: String,
    /// 최근 종가
    pub last: Price,
    /// 전일 종가 (없으면 None)
    pub previous: Option<Price>,
}

impl PriceChange {
    /// 시계열의 마지막 두 유효 종가로 생성합니다.
    pub fn from_series(symbol: impl Into<String>, series: &[PriceBar]) -> Option<Self> {
        let closes = valid_closes(series);
        let last = *closes.last()?;
        let previous = closes.len().checked_sub(2).map(|i| closes[i]);
        Some(Self {
            symbol: symbol.into(),
            last,
            previous,
        })
    }

    /// 전일 대비 변화율(%).
    pub fn change_pct(&self) -> Option<Percentage> {
        self.previous.and_then(|prev| percent_change(prev, self.last))
    }
}
