//! 기술적 지표 모듈.
//!
//! 모든 지표는 `Decimal` 가격 배열을 받아 입력과 같은 길이의
//! `Vec<Option<Decimal>>`를 반환합니다. 값이 정의되지 않는 구간은 `None`입니다.
//!
//! ## 추세 지표
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균 (첫 값 시드 또는 SMA 시드)
//! - **MACD**: 이동평균 수렴/확산
//!
//! ## 모멘텀 지표
//! - **RSI**: 상대강도지수 (Wilder 평활, α = 1/period)

pub mod momentum;
pub mod trend;

use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, EmaSeed, MacdParams, MacdResult, SmaParams, TrendIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

impl From<IndicatorError> for newsbot_core::BotError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { required, provided } => {
                newsbot_core::BotError::InsufficientData { required, provided }
            }
            IndicatorError::InvalidParameter(msg) => newsbot_core::BotError::InvalidInput(msg),
        }
    }
}

/// 시계열 마지막 시점의 값을 반환합니다. 마지막 시점이 미정의면 `None`.
pub fn latest(values: &[Option<rust_decimal::Decimal>]) -> Option<rust_decimal::Decimal> {
    values.last().copied().flatten()
}
