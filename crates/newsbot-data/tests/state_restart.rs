//! JSON 파일 저장소 기반 상태가 재시작 후에도 유지되는지 확인합니다.

use std::collections::HashMap;
use std::path::Path;

use newsbot_core::{NewsItem, SubscriberId};
use newsbot_data::{
    filter_new, AlertStore, JsonFileStore, NewsDeduplicator, SnapshotStore, SubscriberRegistry,
};
use rust_decimal_macros::dec;

fn registry(dir: &Path) -> SubscriberRegistry {
    SubscriberRegistry::new(JsonFileStore::new(dir.join("subscribers.json")))
}

fn alerts(dir: &Path) -> AlertStore {
    AlertStore::new(JsonFileStore::new(dir.join("alerts.json")))
}

fn dedup(dir: &Path) -> NewsDeduplicator {
    NewsDeduplicator::new(JsonFileStore::new(dir.join("seen_news.json")))
}

#[tokio::test]
async fn test_subscribers_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let registry = registry(dir.path());
        registry.add(SubscriberId::from(3_i64)).await.unwrap();
        registry.add(SubscriberId::from(1_i64)).await.unwrap();
        registry.add(SubscriberId::from(2_i64)).await.unwrap();
        registry.remove(&SubscriberId::from(1_i64)).await.unwrap();
    }

    let restarted = registry(dir.path());
    assert_eq!(
        restarted.list_all().await.unwrap(),
        vec![SubscriberId::from(3_i64), SubscriberId::from(2_i64)]
    );
}

#[tokio::test]
async fn test_fired_alert_stays_removed_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let owner = SubscriberId::from(9_i64);

    {
        let store = alerts(dir.path());
        store.add_alert(owner.clone(), "BBCA.JK", dec!(9500)).await.unwrap();
        store.add_alert(owner.clone(), "TLKM.JK", dec!(3500)).await.unwrap();

        let quotes = HashMap::from([("BBCA.JK".to_string(), dec!(9600))]);
        let evaluation = store.evaluate_cycle(&quotes).await.unwrap();
        assert_eq!(evaluation.fired.len(), 1);
        assert!(evaluation.persist_error.is_none());
    }

    let restarted = alerts(dir.path());
    let left = restarted.list_alerts(&owner).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].ticker, "TLKM.JK");

    let quotes = HashMap::from([("BBCA.JK".to_string(), dec!(9999))]);
    let evaluation = restarted.evaluate_cycle(&quotes).await.unwrap();
    assert!(evaluation.fired.is_empty());
}

#[tokio::test]
async fn test_seen_news_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let batch = vec![
        NewsItem::new("IHSG menguat", "https://n/1", "yahoo"),
        NewsItem::new("Rupiah stabil", "https://n/2", "yahoo"),
    ];

    {
        let dedup = dedup(dir.path());
        let seen = dedup.load().await.unwrap();
        let (fresh, updated) = filter_new(batch.clone(), &seen);
        assert_eq!(fresh.len(), 2);
        dedup.commit(updated).await.unwrap();
    }

    let restarted = dedup(dir.path());
    let seen = restarted.load().await.unwrap();
    let (fresh, _) = filter_new(batch, &seen);
    assert!(fresh.is_empty());

    let raw: newsbot_data::SeenSet = JsonFileStore::new(dir.path().join("seen_news.json"))
        .load()
        .await
        .unwrap();
    assert_eq!(raw.len(), 2);
}

#[tokio::test]
async fn test_missing_files_start_empty() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state");

    assert!(registry(&nested).list_all().await.unwrap().is_empty());
    assert!(dedup(&nested).load().await.unwrap().is_empty());
    assert!(alerts(&nested).distinct_tickers().await.unwrap().is_empty());
}
