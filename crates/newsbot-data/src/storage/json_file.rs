//! JSON 파일 스냅샷 저장소.
//!
//! 임시 파일에 전체를 쓴 뒤 rename 하므로, 쓰기 도중 중단되어도
//! 이전 스냅샷 또는 새 스냅샷 중 하나만 남습니다.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::SnapshotStore;
use crate::error::StoreError;

/// JSON 문서 하나를 저장하는 파일 저장소.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    async fn load(&self) -> Result<T, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "스냅샷 파일 없음, 기본값 사용");
                return Ok(T::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, value: &T) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "스냅샷 저장 완료");
        Ok(())
    }
}
