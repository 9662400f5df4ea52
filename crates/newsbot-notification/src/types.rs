//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::NaiveDate;
use newsbot_core::{BotError, NewsItem, PriceChange, SignalReport, SubscriberId, TriggeredAlert};

/// 구독자에게 보내는 알림 이벤트.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// 새 뉴스
    News(NewsItem),
    /// 뉴스 티커의 지표 스냅샷 또는 `/signal` 응답
    Signal(SignalReport),
    /// 가격 알림 발동
    AlertTriggered(TriggeredAlert),
    /// 일일 다이제스트
    DailyDigest {
        date: NaiveDate,
        reports: Vec<SignalReport>,
    },
    /// `/harga` 시세 표. 조회하지 못한 티커는 `None`.
    PriceTable(Vec<(String, Option<PriceChange>)>),
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("수신자가 봇을 차단했거나 찾을 수 없음: {0}")]
    RecipientUnavailable(String),

    #[error("명령 처리 실패: {0}")]
    CommandFailed(String),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl NotificationError {
    /// 특정 수신자 한 명에 국한된 실패를 `BotError::DispatchFailure`로 변환합니다.
    pub fn for_recipient(self, recipient: &SubscriberId) -> BotError {
        BotError::DispatchFailure {
            recipient: recipient.to_string(),
            reason: self.to_string(),
        }
    }
}

/// 알림 전송 경계.
///
/// 코어 입장에서는 fire-and-forget 입니다. 실패는 수신자 단위이며 치명적이지 않고,
/// 같은 사이클 안에서 재시도하지 않습니다.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 수신자에게 HTML 텍스트를 보냅니다.
    async fn send_text(&self, recipient: &SubscriberId, text: &str) -> NotificationResult<()>;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}
