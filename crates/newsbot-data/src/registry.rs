//! 구독자 레지스트리.
//!
//! 저장소가 유일한 원본이며 별도의 파생 상태를 두지 않습니다.
//! 구독 순서가 곧 발송 순서입니다.

use newsbot_core::SubscriberId;
use tracing::info;

use crate::error::StoreError;
use crate::storage::{Persisted, SnapshotStore};

/// 영속 구독자 집합 (중복 없음, 구독 순서 유지).
pub struct SubscriberRegistry {
    state: Persisted<Vec<SubscriberId>>,
}

impl SubscriberRegistry {
    pub fn new(store: impl SnapshotStore<Vec<SubscriberId>> + 'static) -> Self {
        Self {
            state: Persisted::new("subscribers", store),
        }
    }

    /// 구독자를 추가합니다. 새로 추가되었으면 `true`.
    ///
    /// 저장에 실패하면 구독 상태는 바뀌지 않습니다. `remove`도 같습니다.
    pub async fn add(&self, id: SubscriberId) -> Result<bool, StoreError> {
        let mut guard = self.state.lock().await;
        let mut members = guard.load().await?;
        if members.contains(&id) {
            return Ok(false);
        }
        members.push(id.clone());
        guard.commit_or_discard(members).await?;
        info!(subscriber = %id, "구독자 추가");
        Ok(true)
    }

    /// 구독자를 제거합니다. 실제로 제거되었으면 `true`.
    pub async fn remove(&self, id: &SubscriberId) -> Result<bool, StoreError> {
        let mut guard = self.state.lock().await;
        let mut members = guard.load().await?;
        let before = members.len();
        members.retain(|m| m != id);
        if members.len() == before {
            return Ok(false);
        }
        guard.commit_or_discard(members).await?;
        info!(subscriber = %id, "구독자 제거");
        Ok(true)
    }

    /// 전체 구독자 목록.
    pub async fn list_all(&self) -> Result<Vec<SubscriberId>, StoreError> {
        self.state.read().await
    }

    pub async fn contains(&self, id: &SubscriberId) -> Result<bool, StoreError> {
        Ok(self.list_all().await?.contains(id))
    }
}
