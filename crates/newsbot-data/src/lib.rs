//! 외부 데이터 어댑터 및 영속 상태.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시세 제공자 (Yahoo Finance 일봉/최근가)
//! - 뉴스 소스 (Yahoo 검색 JSON, HTML 헤드라인 스크래퍼)
//! - 스냅샷 저장소 (JSON 파일, 메모리)
//! - 구독자 레지스트리
//! - 뉴스 중복 제거 (seen 집합)
//! - 가격 알림 저장소 및 평가기

pub mod alerts;
pub mod dedup;
pub mod error;
pub mod news;
pub mod provider;
pub mod registry;
pub mod storage;

pub use alerts::{AlertBook, AlertEvaluation, AlertStore};
pub use dedup::{filter_new, NewsDeduplicator, SeenSet};
pub use error::{DataError, Result, StoreError};
pub use news::{fetch_all, HtmlHeadlineSource, NewsSource, YahooNewsSource};
pub use provider::{QuoteProvider, YahooQuoteProvider};
pub use registry::SubscriberRegistry;
pub use storage::{JsonFileStore, MemoryStore, Persisted, SnapshotStore};
