use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::debug;

use crate::dao::{
    models::StoredGameData,
    session_store::SessionStore,
    storage::{StorageError, StorageResult},
};

/// Session slot backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: Arc<PathBuf>,
}

impl FileSessionStore {
    /// Store the blob at `path`; parent directories are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    /// Location of the blob.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, data: StoredGameData) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            let raw = serde_json::to_vec_pretty(&data).map_err(|source| {
                StorageError::corrupted(format!("failed to encode {}", path.display()), source)
            })?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await.map_err(|err| {
                    StorageError::unavailable(format!("failed to create {}", parent.display()), err)
                })?;
            }
            // Replaced via rename; readers never see a partial blob.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, raw).await.map_err(|err| {
                StorageError::unavailable(format!("failed to write {}", tmp.display()), err)
            })?;
            fs::rename(&tmp, path.as_ref()).await.map_err(|err| {
                StorageError::unavailable(format!("failed to replace {}", path.display()), err)
            })?;
            debug!(path = %path.display(), "session snapshot written");
            Ok(())
        })
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<StoredGameData>>> {
        let path = self.path.clone();
        Box::pin(async move {
            let raw = match fs::read(path.as_ref()).await {
                Ok(raw) => raw,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => {
                    return Err(StorageError::unavailable(
                        format!("failed to read {}", path.display()),
                        err,
                    ));
                }
            };
            serde_json::from_slice(&raw).map(Some).map_err(|source| {
                StorageError::corrupted(format!("failed to decode {}", path.display()), source)
            })
        })
    }

    fn clear(&self) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            match fs::remove_file(path.as_ref()).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to remove {}", path.display()),
                    err,
                )),
            }
        })
    }

    fn exists(&self) -> BoxFuture<'static, StorageResult<bool>> {
        let path = self.path.clone();
        Box::pin(async move {
            fs::try_exists(path.as_ref()).await.map_err(|err| {
                StorageError::unavailable(format!("failed to stat {}", path.display()), err)
            })
        })
    }
}
