//! 뉴스 사이클.

use std::sync::Arc;

use async_trait::async_trait;
use newsbot_core::SignalReport;
use newsbot_data::{fetch_all, filter_new, NewsDeduplicator, NewsSource, SubscriberRegistry};
use newsbot_notification::{Broadcaster, NotificationEvent};
use tracing::{debug, error, info};

use crate::resolver::TickerResolver;
use crate::scheduler::Cycle;
use crate::service::MarketService;
use crate::stats::CycleStats;
use crate::Result;

/// 모든 소스에서 뉴스를 모아 새 기사만 구독자에게 보냅니다.
pub struct NewsCycle {
    sources: Vec<Box<dyn NewsSource>>,
    dedup: Arc<NewsDeduplicator>,
    registry: Arc<SubscriberRegistry>,
    market: Arc<MarketService>,
    resolver: Arc<dyn TickerResolver>,
    broadcaster: Broadcaster,
    fetch_limit: usize,
}

impl NewsCycle {
    pub fn new(
        sources: Vec<Box<dyn NewsSource>>,
        dedup: Arc<NewsDeduplicator>,
        registry: Arc<SubscriberRegistry>,
        market: Arc<MarketService>,
        resolver: Arc<dyn TickerResolver>,
        broadcaster: Broadcaster,
        fetch_limit: usize,
    ) -> Self {
        Self {
            sources,
            dedup,
            registry,
            market,
            resolver,
            broadcaster,
            fetch_limit,
        }
    }
}

#[async_trait]
impl Cycle for NewsCycle {
    fn name(&self) -> &'static str {
        "news"
    }

    async fn run_once(&self) -> Result<CycleStats> {
        let mut stats = CycleStats::new();

        // FETCHING
        let candidates = fetch_all(&self.sources, self.fetch_limit).await;
        stats.total = candidates.len();

        // PROCESSING
        let seen = self.dedup.load().await?;
        let (fresh, updated) = filter_new(candidates, &seen);
        stats.success = fresh.len();
        stats.skipped = stats.total - fresh.len();

        // DISPATCHING
        if !fresh.is_empty() {
            let recipients = self.registry.list_all().await?;
            info!(new_items = fresh.len(), recipients = recipients.len(), "새 뉴스 발송");

            for item in fresh {
                // 소스가 준 코드는 그대로, 제목에서 찾은 티커만 정규화
                let symbol = match &item.ticker_code {
                    Some(code) => Some(code.clone()),
                    None => self
                        .resolver
                        .resolve(&item.title)
                        .map(|ticker| self.market.normalize(&ticker)),
                };

                let report = self
                    .broadcaster
                    .broadcast(&recipients, &NotificationEvent::News(item))
                    .await;
                stats.record_dispatch(report);

                let Some(symbol) = symbol else {
                    continue;
                };
                if recipients.is_empty() {
                    continue;
                }

                match self.market.report_symbol(&symbol).await {
                    report @ SignalReport::Ready(_) => {
                        let sent = self
                            .broadcaster
                            .broadcast(&recipients, &NotificationEvent::Signal(report))
                            .await;
                        stats.record_dispatch(sent);
                    }
                    other => debug!(symbol = %symbol, signal = %other.signal(), "스냅샷 생략"),
                }
            }
        }

        // PERSISTING
        if let Err(e) = self.dedup.commit(updated).await {
            stats.errors += 1;
            error!(error = %e, "seen 집합 저장 실패, 다음 사이클에 재시도");
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::UppercaseTokenResolver;
    use crate::testing::{rising, FakeQuotes, RecordingNotifier};
    use newsbot_analytics::IndicatorEngine;
    use newsbot_core::{NewsItem, SubscriberId};
    use newsbot_data::{MemoryStore, SeenSet, SnapshotStore};
    use newsbot_notification::MessageFormatter;
    use tokio::sync::Mutex;

    /// 미리 정해둔 배치를 돌려주는 소스.
    struct FixedSource {
        items: Mutex<Vec<NewsItem>>,
    }

    #[async_trait]
    impl NewsSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_recent(&self, limit: usize) -> Vec<NewsItem> {
            self.items.lock().await.iter().take(limit).cloned().collect()
        }
    }

    struct Fixture {
        cycle: NewsCycle,
        notifier: Arc<RecordingNotifier>,
        seen_store: MemoryStore<SeenSet>,
    }

    async fn fixture(items: Vec<NewsItem>, subscribers: &[i64]) -> Fixture {
        let notifier = Arc::new(RecordingNotifier::default());
        let seen_store = MemoryStore::new();
        let registry = Arc::new(SubscriberRegistry::new(MemoryStore::new()));
        for id in subscribers {
            registry.add(SubscriberId::from(*id)).await.unwrap();
        }

        let quotes = FakeQuotes::default()
            .with_series("BBCA.JK", &rising(60))
            .with_series("AAPL", &rising(60));
        let market = Arc::new(MarketService::new(
            Arc::new(quotes),
            IndicatorEngine::new(),
            120,
            ".JK",
        ));

        let cycle = NewsCycle::new(
            vec![Box::new(FixedSource {
                items: Mutex::new(items),
            })],
            Arc::new(NewsDeduplicator::new(seen_store.clone())),
            registry,
            market,
            Arc::new(UppercaseTokenResolver::new()),
            Broadcaster::new(notifier.clone(), MessageFormatter::default()),
            10,
        );

        Fixture {
            cycle,
            notifier,
            seen_store,
        }
    }

    #[tokio::test]
    async fn test_same_batch_is_delivered_once() {
        let items = vec![
            NewsItem::new("IHSG menguat", "https://n/1", "fixed"),
            NewsItem::new("Rupiah melemah", "https://n/2", "fixed"),
        ];
        let f = fixture(items, &[1, 2]).await;

        let first = f.cycle.run_once().await.unwrap();
        assert_eq!(first.success, 2);
        assert_eq!(first.dispatched, 4);
        assert_eq!(f.notifier.sent().await.len(), 4);

        let second = f.cycle.run_once().await.unwrap();
        assert_eq!(second.success, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(f.notifier.sent().await.len(), 4);

        let persisted = f.seen_store.load().await.unwrap();
        assert!(persisted.contains("https://n/1"));
        assert!(persisted.contains("https://n/2"));
    }

    #[tokio::test]
    async fn test_identical_link_different_title_is_one_item() {
        let items = vec![
            NewsItem::new("IHSG menguat", "https://n/1", "fixed"),
            NewsItem::new("IHSG ditutup menguat tipis", "https://n/1", "other"),
        ];
        let f = fixture(items, &[1]).await;

        let stats = f.cycle.run_once().await.unwrap();
        assert_eq!(stats.success, 1);
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_news_with_ticker_is_followed_by_snapshot() {
        let items = vec![
            NewsItem::new("Laba BBCA naik", "https://n/bbca", "fixed"),
            NewsItem::new("Kabar emiten", "https://n/x", "fixed").with_ticker("XXXX.JK"),
        ];
        let f = fixture(items, &[7]).await;

        let stats = f.cycle.run_once().await.unwrap();
        let sent = f.notifier.sent().await;

        // BBCA 뉴스 + BBCA 스냅샷 + XXXX 뉴스 (XXXX는 시세 없음)
        assert_eq!(stats.dispatched, 3);
        assert_eq!(sent.len(), 3);
        assert!(sent[0].1.contains("Laba BBCA naik"));
        assert!(sent[1].1.contains("<b>BBCA</b>"));
        assert!(sent[2].1.contains("Kabar emiten"));
    }

    #[tokio::test]
    async fn test_items_are_marked_seen_without_subscribers() {
        let items = vec![NewsItem::new("IHSG menguat", "https://n/1", "fixed")];
        let f = fixture(items, &[]).await;

        f.cycle.run_once().await.unwrap();
        assert!(f.notifier.sent().await.is_empty());
        assert!(f.seen_store.load().await.unwrap().contains("https://n/1"));
    }

    #[tokio::test]
    async fn test_source_ticker_code_is_used_as_given() {
        let items = vec![
            NewsItem::new("Apple earnings beat", "https://n/aapl", "fixed").with_ticker("AAPL"),
        ];
        let f = fixture(items, &[7]).await;

        let stats = f.cycle.run_once().await.unwrap();
        let sent = f.notifier.sent().await;

        // 접미사가 붙었다면 시세가 없어 스냅샷이 생략됨
        assert_eq!(stats.dispatched, 2);
        assert!(sent[1].1.contains("AAPL"));
    }
}
