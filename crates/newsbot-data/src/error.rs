//! 데이터 모듈 오류 타입.

use std::path::PathBuf;

use newsbot_core::BotError;
use thiserror::Error;

/// 외부 데이터 소스 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 시세/데이터 없음
    #[error("Data unavailable: {0}")]
    Unavailable(String),

    /// 잘못된 입력
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::ParseError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<DataError> for BotError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::InvalidData(msg) => BotError::InvalidInput(msg),
            DataError::ConfigError(msg) => BotError::Config(msg),
            other => BotError::AdapterUnavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

/// 영속 상태 저장 오류.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 파일 입출력 오류
    #[error("Storage I/O error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 직렬화/역직렬화 오류
    #[error("Serialization error ({path}): {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 검증 실패
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<StoreError> for BotError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(msg) => BotError::InvalidInput(msg),
            other => BotError::Persistence(other.to_string()),
        }
    }
}
