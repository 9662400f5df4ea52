//! # NewsBot Notification
//!
//! 구독자 알림 전송 서비스.
//!
//! - [`Notifier`]: 수신자 한 명에게 텍스트를 보내는 경계 trait
//! - [`TelegramNotifier`]: Telegram Bot API 구현
//! - [`Broadcaster`]: 여러 수신자에게 순서대로 전송하고 실패를 수신자 단위로 격리
//! - [`MessageFormatter`]: 뉴스/알림/다이제스트/시세 메시지 HTML 렌더링
//!
//! # 텔레그램 봇 명령어
//!
//! - `/start`, `/subscribe` - 구독
//! - `/stop`, `/unsubscribe` - 구독 해지
//! - `/alert TICKER PRICE` - 가격 알림 등록
//! - `/alerts` - 내 알림 목록
//! - `/removealert TICKER` - 알림 삭제
//! - `/signal TICKER` - 지표 스냅샷
//! - `/harga T1 [T2 ...]` - 현재가 및 전일 대비
//! - `/help` - 도움말

pub mod bot_handler;
pub mod dispatch;
pub mod format;
pub mod telegram;
pub mod types;

pub use bot_handler::*;
pub use dispatch::*;
pub use format::*;
pub use telegram::*;
pub use types::*;
