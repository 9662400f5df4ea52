//! 시장 뉴스 및 가격 알림 봇 데몬.
//!
//! 이 crate는 다른 crate의 구성 요소를 묶어 실행합니다:
//! - 뉴스 사이클 (수집 → 중복 제거 → 발송 → 티커 스냅샷)
//! - 가격 알림 사이클 (최근가 평가, 한 번만 발동)
//! - 일일 다이제스트 (현지 시각 기준 하루 한 번)
//! - 텔레그램 명령어 처리
//! - 환경변수 설정과 CLI

pub mod app;
pub mod clock;
pub mod commands;
pub mod config;
pub mod cycles;
pub mod error;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod stats;

#[cfg(test)]
mod testing;

pub use app::App;
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::CommandService;
pub use config::BotConfig;
pub use cycles::{AlertCycle, DigestCycle, NewsCycle};
pub use error::{DaemonError, Result};
pub use resolver::{TickerResolver, UppercaseTokenResolver};
pub use scheduler::{run_periodic, Cycle, Schedule, Scheduler};
pub use service::MarketService;
pub use stats::CycleStats;
