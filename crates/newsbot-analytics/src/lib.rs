//! 기술적 지표 및 신호 분류 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 추세 지표 (SMA, EMA, MACD)
//! - 모멘텀 지표 (RSI, Wilder 평활)
//! - 일봉 시계열을 지표 스냅샷과 BUY/SELL/HOLD 신호로 변환하는 [`IndicatorEngine`]
//!
//! 모든 계산은 순수 함수이며 캐시하지 않습니다.

pub mod engine;
pub mod indicators;

pub use engine::{IndicatorEngine, SignalRules};
pub use indicators::{
    EmaParams, EmaSeed, IndicatorError, IndicatorResult, MacdParams, MacdResult,
    MomentumCalculator, RsiParams, SmaParams, TrendIndicators,
};
