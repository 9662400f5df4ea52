//! # NewsBot Core
//!
//! 시장 뉴스/가격 알림 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 데이터 (`PriceBar`)
//! - 뉴스 아이템과 중복 제거 키
//! - 가격 알림 (fire-once)
//! - 구독자 식별자
//! - 지표 스냅샷 및 매매 신호
//! - 티커 정규화
//! - 에러 분류 체계
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
