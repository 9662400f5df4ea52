//! 알림 봇의 도메인 모델.

mod alert;
mod market_data;
mod news;
mod signal;
mod subscriber;

pub use alert::*;
pub use market_data::*;
pub use news::*;
pub use signal::*;
pub use subscriber::*;
