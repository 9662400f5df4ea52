//! 알림 봇의 에러 분류 체계.
//!
//! 모든 에러는 그 에러를 만든 사이클 경계에서 복구됩니다.
//! 사이클 전체를 중단시키는 에러는 없으며, 분류에 따라 처리 방식이 다릅니다.

use thiserror::Error;

/// 핵심 봇 에러.
#[derive(Debug, Error)]
pub enum BotError {
    /// 외부 어댑터(시세/뉴스)를 사용할 수 없음. 이번 사이클에서 해당 소스/티커를 건너뜁니다.
    #[error("어댑터 사용 불가: {0}")]
    AdapterUnavailable(String),

    /// 지표 계산에 필요한 데이터 부족
    #[error("데이터 부족: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 수신자 한 명에 대한 발송 실패. 다른 수신자는 계속 처리합니다.
    #[error("발송 실패 ({recipient}): {reason}")]
    DispatchFailure { recipient: String, reason: String },

    /// 영속화 실패. 메모리 상태는 다음 사이클에서 다시 저장을 시도합니다.
    #[error("저장 실패: {0}")]
    Persistence(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 봇 작업을 위한 Result 타입.
pub type BotResult<T> = Result<T, BotError>;

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::Persistence(err.to_string())
    }
}
