//! 뉴스 소스.
//!
//! 뉴스 소스는 실패하지 않습니다. 내부 오류는 로그로 남기고 빈 목록을 반환합니다.

mod html;
mod yahoo;

pub use html::HtmlHeadlineSource;
pub use yahoo::YahooNewsSource;

use async_trait::async_trait;
use futures::future::join_all;
use newsbot_core::NewsItem;
use tracing::debug;

/// 최근 기사 목록을 제공하는 외부 뉴스 소스.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// 출처 태그 (로그 및 `NewsItem::origin_tag`).
    fn name(&self) -> &str;

    /// 최근 기사를 최대 `limit`개 반환합니다. 실패 시 빈 목록.
    async fn fetch_recent(&self, limit: usize) -> Vec<NewsItem>;
}

/// 모든 소스를 동시에 조회하고 소스 순서대로 결과를 이어 붙입니다.
pub async fn fetch_all(sources: &[Box<dyn NewsSource>], limit: usize) -> Vec<NewsItem> {
    let batches = join_all(sources.iter().map(|source| source.fetch_recent(limit))).await;

    let mut items = Vec::new();
    for (source, batch) in sources.iter().zip(batches) {
        debug!(source = source.name(), count = batch.len(), "뉴스 수집");
        items.extend(batch);
    }
    items
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
