//! 에러 타입 정의.

use newsbot_core::BotError;
use newsbot_data::{DataError, StoreError};
use newsbot_notification::NotificationError;
use thiserror::Error;

/// 데몬 에러 타입
#[derive(Debug, Error)]
pub enum DaemonError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 영속 상태 에러
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// 데이터 소스 에러 (Yahoo 등)
    #[error("Data source error: {0}")]
    DataSource(#[from] DataError),

    /// 알림 전송 에러
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// 도메인 에러
    #[error(transparent)]
    Bot(#[from] BotError),
}

impl From<DaemonError> for BotError {
    fn from(err: DaemonError) -> Self {
        match err {
            DaemonError::Config(msg) => BotError::Config(msg),
            DaemonError::Store(e) => e.into(),
            DaemonError::DataSource(e) => e.into(),
            DaemonError::Notification(e) => BotError::AdapterUnavailable(e.to_string()),
            DaemonError::Bot(e) => e,
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, DaemonError>;
