//! 메모리 스냅샷 저장소.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SnapshotStore;
use crate::error::StoreError;

/// 프로세스 메모리에만 보관하는 저장소. 복제본끼리 상태를 공유합니다.
///
/// `fail_loads`/`fail_saves`로 저장 장애를 재현할 수 있습니다.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<T> {
    value: Arc<RwLock<Option<T>>>,
    fail_loads: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
            fail_loads: Arc::new(AtomicBool::new(false)),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 초기값을 가진 저장소를 생성합니다.
    pub fn with_value(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(value))),
            ..Self::new()
        }
    }

    /// 켜져 있는 동안 `load`가 I/O 오류를 반환합니다.
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// 켜져 있는 동안 `save`가 I/O 오류를 반환하고 값을 바꾸지 않습니다.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn unavailable(op: &str) -> StoreError {
        StoreError::Io {
            path: "memory".into(),
            source: std::io::Error::other(format!("{op} 실패")),
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for MemoryStore<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    async fn load(&self) -> Result<T, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Self::unavailable("load"));
        }
        Ok(self.value.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, value: &T) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::unavailable("save"));
        }
        *self.value.write().await = Some(value.clone());
        Ok(())
    }
}
