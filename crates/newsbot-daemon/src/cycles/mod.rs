//! 주기 사이클 본문.
//!
//! 각 사이클은 `IDLE → FETCHING → PROCESSING → DISPATCHING → PERSISTING → IDLE` 순서로
//! 진행합니다. 항목/수신자 단위 실패는 로그만 남기고 건너뜁니다.

pub mod alert;
pub mod digest;
pub mod news;

pub use alert::AlertCycle;
pub use digest::DigestCycle;
pub use news::NewsCycle;
