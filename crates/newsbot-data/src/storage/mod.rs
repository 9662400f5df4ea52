//! 스냅샷 저장소.
//!
//! 모든 영속 상태(구독자, 알림, seen 집합)는 문서 하나를 통째로 읽고
//! 메모리에서 수정한 뒤 통째로 다시 씁니다. 부분 갱신은 없습니다.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

use crate::error::StoreError;

/// 문서 하나를 통째로 읽고 쓰는 저장소.
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// 저장된 스냅샷을 읽습니다. 아직 저장된 적이 없으면 `T::default()`.
    async fn load(&self) -> Result<T, StoreError>;

    /// 스냅샷 전체를 씁니다.
    async fn save(&self, value: &T) -> Result<(), StoreError>;
}

/// 저장소 위의 read-modify-write 보호 계층.
///
/// - 비동기 뮤텍스로 같은 문서에 대한 동시 수정을 직렬화합니다.
/// - `commit`: 저장에 실패한 스냅샷은 메모리에 보관하고, 다음 `load`가 디스크 대신
///   이를 반환하며 다음 `commit`에서 다시 저장을 시도합니다 (사이클용).
/// - `commit_or_discard`: 저장에 실패하면 변경을 버립니다. 호출자에게 실패를
///   알리는 명령어 처리용입니다.
pub struct Persisted<T>
where
    T: Clone + Send + Sync + 'static,
{
    store: Box<dyn SnapshotStore<T>>,
    name: &'static str,
    pending: Mutex<Option<T>>,
}

/// `Persisted::lock`이 반환하는 가드. 가드가 살아 있는 동안 다른 수정은 대기합니다.
pub struct PersistedGuard<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    owner: &'a Persisted<T>,
    pending: MutexGuard<'a, Option<T>>,
}

impl<T> Persisted<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, store: impl SnapshotStore<T> + 'static) -> Self {
        Self {
            store: Box::new(store),
            name,
            pending: Mutex::new(None),
        }
    }

    /// 문서 이름 (로그용).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 수정 구간을 시작합니다.
    pub async fn lock(&self) -> PersistedGuard<'_, T> {
        PersistedGuard {
            owner: self,
            pending: self.pending.lock().await,
        }
    }

    /// 읽기 전용 스냅샷.
    pub async fn read(&self) -> Result<T, StoreError> {
        self.lock().await.load().await
    }

    /// 저장 대기 중인 스냅샷이 있는지 확인합니다.
    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}

impl<T> PersistedGuard<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// 현재 상태를 읽습니다. 저장 대기 중인 스냅샷이 있으면 그것이 우선합니다.
    pub async fn load(&self) -> Result<T, StoreError> {
        match self.pending.as_ref() {
            Some(value) => Ok(value.clone()),
            None => self.owner.store.load().await,
        }
    }

    /// 이전 저장 실패로 보류 중인 스냅샷이 있는지 확인합니다.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 수정된 상태를 저장합니다.
    ///
    /// 실패하면 스냅샷을 메모리에 남기고 에러를 반환합니다.
    pub async fn commit(&mut self, value: T) -> Result<(), StoreError> {
        match self.owner.store.save(&value).await {
            Ok(()) => {
                if self.pending.take().is_some() {
                    warn!(store = self.owner.name, "보류 중이던 스냅샷 저장 성공");
                }
                Ok(())
            }
            Err(e) => {
                error!(store = self.owner.name, error = %e, "스냅샷 저장 실패, 다음 사이클에 재시도");
                *self.pending = Some(value);
                Err(e)
            }
        }
    }

    /// 수정된 상태를 저장합니다.
    ///
    /// 실패하면 이번 변경은 버려지고, 이전에 보류 중이던 스냅샷은 그대로 남습니다.
    pub async fn commit_or_discard(&mut self, value: T) -> Result<(), StoreError> {
        match self.owner.store.save(&value).await {
            Ok(()) => {
                if self.pending.take().is_some() {
                    warn!(store = self.owner.name, "보류 중이던 스냅샷 저장 성공");
                }
                Ok(())
            }
            Err(e) => {
                error!(store = self.owner.name, error = %e, "스냅샷 저장 실패, 변경 취소");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// 저장 실패를 흉내내는 저장소.
    struct FlakyStore {
        inner: MemoryStore<Vec<u32>>,
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SnapshotStore<Vec<u32>> for FlakyStore {
        async fn load(&self) -> Result<Vec<u32>, StoreError> {
            self.inner.load().await
        }

        async fn save(&self, value: &Vec<u32>) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: "flaky".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.save(value).await
        }
    }

    #[tokio::test]
    async fn test_failed_commit_is_served_from_memory() {
        let fail = Arc::new(AtomicBool::new(true));
        let inner = MemoryStore::new();
        let persisted = Persisted::new(
            "flaky",
            FlakyStore {
                inner: inner.clone(),
                fail: fail.clone(),
            },
        );

        {
            let mut guard = persisted.lock().await;
            assert!(guard.commit(vec![1, 2]).await.is_err());
        }
        assert!(persisted.has_pending().await);
        // 디스크에는 없지만 load는 보류 스냅샷을 반환
        assert_eq!(inner.load().await.unwrap(), Vec::<u32>::new());
        assert_eq!(persisted.read().await.unwrap(), vec![1, 2]);

        fail.store(false, Ordering::SeqCst);
        {
            let mut guard = persisted.lock().await;
            let mut value = guard.load().await.unwrap();
            value.push(3);
            guard.commit(value).await.unwrap();
        }
        assert!(!persisted.has_pending().await);
        assert_eq!(inner.load().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_discarded_commit_keeps_previous_state() {
        let inner = MemoryStore::with_value(vec![1]);
        let persisted = Persisted::new("memory", inner.clone());

        inner.fail_saves(true);
        {
            let mut guard = persisted.lock().await;
            assert!(guard.commit_or_discard(vec![1, 2]).await.is_err());
        }
        assert!(!persisted.has_pending().await);
        assert_eq!(persisted.read().await.unwrap(), vec![1]);

        // 사이클 저장 실패로 보류된 스냅샷은 명령어 실패로 사라지지 않음
        {
            let mut guard = persisted.lock().await;
            assert!(guard.commit(vec![1, 3]).await.is_err());
            assert!(guard.commit_or_discard(vec![1, 3, 4]).await.is_err());
        }
        assert_eq!(persisted.read().await.unwrap(), vec![1, 3]);

        inner.fail_saves(false);
        {
            let mut guard = persisted.lock().await;
            let mut value = guard.load().await.unwrap();
            value.push(5);
            guard.commit_or_discard(value).await.unwrap();
        }
        assert!(!persisted.has_pending().await);
        assert_eq!(inner.load().await.unwrap(), vec![1, 3, 5]);
    }
}
