//! 구독자 일괄 전송.

use std::sync::Arc;

use newsbot_core::SubscriberId;
use tracing::{debug, warn};

use crate::format::MessageFormatter;
use crate::types::{NotificationEvent, Notifier};

/// 한 번의 일괄 전송 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

/// 이벤트를 렌더링하여 수신자들에게 순서대로 전송합니다.
///
/// 수신자 한 명의 실패는 로그만 남기고 다음 수신자로 넘어갑니다.
#[derive(Clone)]
pub struct Broadcaster {
    notifier: Arc<dyn Notifier>,
    formatter: MessageFormatter,
}

impl Broadcaster {
    pub fn new(notifier: Arc<dyn Notifier>, formatter: MessageFormatter) -> Self {
        Self {
            notifier,
            formatter,
        }
    }

    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    /// 수신자 한 명에게 전송합니다.
    pub async fn send_to(&self, recipient: &SubscriberId, event: &NotificationEvent) -> bool {
        let text = self.formatter.render(event);
        match self.notifier.send_text(recipient, &text).await {
            Ok(()) => {
                debug!(recipient = %recipient, notifier = self.notifier.name(), "전송 완료");
                true
            }
            Err(e) => {
                let failure = e.for_recipient(recipient);
                warn!(notifier = self.notifier.name(), error = %failure, "전송 실패, 다음 수신자로 진행");
                false
            }
        }
    }

    /// 수신자 목록 순서대로 전송합니다.
    pub async fn broadcast(
        &self,
        recipients: &[SubscriberId],
        event: &NotificationEvent,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for recipient in recipients {
            if self.send_to(recipient, event).await {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}
