//! 뉴스 중복 제거.
//!
//! seen 집합은 단조 증가하며 정리(prune)하지 않습니다. 재시작 후에도 유지됩니다.

use std::collections::{BTreeSet, HashSet};

use newsbot_core::NewsItem;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::{Persisted, SnapshotStore};

/// 이미 발송한 뉴스의 중복 제거 키 집합.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeSet<String>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    fn insert(&mut self, key: &str) {
        self.0.insert(key.to_string());
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// 후보 중 처음 보는 뉴스만 고릅니다.
///
/// - 배치 안에서는 먼저 나온 항목이 이기며 순서를 유지합니다.
/// - `seen`에 있는 키는 제외합니다.
/// - 반환하는 집합은 `seen ∪ keys(새 항목)`입니다.
/// - 키가 빈 문자열인 항목(제목과 링크 모두 없음)은 버립니다.
pub fn filter_new(candidates: Vec<NewsItem>, seen: &SeenSet) -> (Vec<NewsItem>, SeenSet) {
    let mut updated = seen.clone();
    let mut batch_keys = HashSet::new();
    let mut fresh = Vec::new();

    for item in candidates {
        let key = item.dedup_key().to_string();
        if key.is_empty() || seen.contains(&key) || !batch_keys.insert(key.clone()) {
            continue;
        }
        updated.insert(&key);
        fresh.push(item);
    }

    (fresh, updated)
}

/// 영속 seen 집합을 가진 중복 제거기.
///
/// 사이클 시작에 `load`, 배치 발송이 끝난 뒤 `commit` 합니다.
/// 발송과 저장 사이에 프로세스가 죽으면 재발송될 수 있습니다.
pub struct NewsDeduplicator {
    state: Persisted<SeenSet>,
}

impl NewsDeduplicator {
    pub fn new(store: impl SnapshotStore<SeenSet> + 'static) -> Self {
        Self {
            state: Persisted::new("seen_news", store),
        }
    }

    pub async fn load(&self) -> Result<SeenSet, StoreError> {
        self.state.read().await
    }

    /// 갱신된 집합을 저장합니다. 기존 키는 절대 빠지지 않도록 현재 상태와 합칩니다.
    pub async fn commit(&self, updated: SeenSet) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let mut current = guard.load().await?;
        let before = current.len();
        current.0.extend(updated.0);
        if current.len() == before && !guard.is_pending() {
            return Ok(());
        }
        guard.commit(current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn item(title: &str, link: &str) -> NewsItem {
        NewsItem::new(title, link, "test")
    }

    #[test]
    fn test_same_batch_twice() {
        let batch = vec![item("A", "https://a"), item("B", "https://b")];

        let (fresh, seen) = filter_new(batch.clone(), &SeenSet::new());
        assert_eq!(fresh.len(), 2);

        let (fresh, seen2) = filter_new(batch, &seen);
        assert!(fresh.is_empty());
        assert_eq!(seen, seen2);
    }

    #[test]
    fn test_first_occurrence_wins_in_batch() {
        let batch = vec![
            item("IHSG menguat", "https://x/1"),
            item("IHSG ditutup menguat", "https://x/1"),
            item("Rupiah", ""),
            item("Rupiah", ""),
        ];

        let (fresh, seen) = filter_new(batch, &SeenSet::new());
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].title, "IHSG menguat");
        assert_eq!(fresh[1].title, "Rupiah");
        assert!(seen.contains("https://x/1"));
        assert!(seen.contains("Rupiah"));
    }

    #[test]
    fn test_seen_only_grows() {
        let seen: SeenSet = ["old"].into_iter().collect();
        let (_, updated) = filter_new(vec![item("new", "")], &seen);
        assert!(updated.contains("old"));
        assert!(updated.contains("new"));
    }

    #[test]
    fn test_empty_key_is_dropped() {
        let (fresh, seen) = filter_new(vec![item("  ", "")], &SeenSet::new());
        assert!(fresh.is_empty());
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_commit_merges_with_stored() {
        let store = MemoryStore::with_value(["a"].into_iter().collect::<SeenSet>());
        let dedup = NewsDeduplicator::new(store.clone());

        dedup.commit(["b"].into_iter().collect()).await.unwrap();

        let stored = store.load().await.unwrap();
        assert!(stored.contains("a"));
        assert!(stored.contains("b"));
    }
}
