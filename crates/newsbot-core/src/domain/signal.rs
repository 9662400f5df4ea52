//! 지표 스냅샷과 매매 신호.

use crate::types::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 규칙 기반 분류 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    /// 유효 종가가 부족하여 분류하지 않음
    InsufficientData,
}

impl Signal {
    /// 메시지에 붙이는 이모지.
    pub fn emoji(&self) -> &'static str {
        match self {
            Signal::Buy => "🟢",
            Signal::Sell => "🔴",
            Signal::Hold => "🟡",
            Signal::InsufficientData => "⚪",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
            Signal::InsufficientData => write!(f, "INSUFFICIENT_DATA"),
        }
    }
}

/// 가격 시계열로부터 계산된 지표 스냅샷.
///
/// 매 요청마다 새로 계산되며 저장하거나 캐시하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    /// 마지막 유효 종가
    pub latest_price: Price,
    pub ema20: Decimal,
    pub ema50: Decimal,
    pub rsi14: Decimal,
    pub macd_line: Decimal,
    pub macd_signal: Decimal,
    pub macd_histogram: Decimal,
    pub signal: Signal,
}

/// 한 티커에 대한 on-demand 분석 결과.
///
/// 데이터를 가져오지 못하거나 부족한 경우도 명시적인 결과로 표현합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalReport {
    /// 지표 계산 완료
    Ready(IndicatorSnapshot),
    /// 유효 종가 부족
    InsufficientData { symbol: String, provided: usize },
    /// 시세 제공자에서 데이터를 가져오지 못함
    Unavailable { symbol: String },
}

impl SignalReport {
    pub fn symbol(&self) -> &str {
        match self {
            SignalReport::Ready(snapshot) => &snapshot.symbol,
            SignalReport::InsufficientData { symbol, .. } => symbol,
            SignalReport::Unavailable { symbol } => symbol,
        }
    }

    /// 분류 결과. 데이터가 없거나 부족하면 `InsufficientData`.
    pub fn signal(&self) -> Signal {
        match self {
            SignalReport::Ready(snapshot) => snapshot.signal,
            _ => Signal::InsufficientData,
        }
    }
}
