use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::ModelArtifact,
};

/// Storage for the single current model artifact
///
/// One writer (training) and many readers (recommendation requests). `save`
/// replaces the previous artifact atomically; `load` returns `None` until an
/// artifact has been saved.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(&self, artifact: &ModelArtifact) -> AppResult<()>;

    async fn load(&self) -> AppResult<Option<Arc<ModelArtifact>>>;
}

/// File identity used to decide whether the cached artifact is current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(metadata: &std::fs::Metadata) -> Self {
        Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        }
    }
}

#[derive(Debug)]
struct CachedArtifact {
    stamp: FileStamp,
    artifact: Arc<ModelArtifact>,
}

/// Stores the artifact as a JSON file
///
/// The parsed artifact is kept in memory and reused until the file on disk
/// changes, so a retrain from another process is picked up on the next load.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    path: PathBuf,
    cache: Arc<RwLock<Option<CachedArtifact>>>,
}

impl FileArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A unique sibling of the target, so the final rename stays on one filesystem
    fn staging_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }

    async fn cached(&self, stamp: FileStamp) -> Option<Arc<ModelArtifact>> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.stamp == stamp)
            .map(|cached| Arc::clone(&cached.artifact))
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn save(&self, artifact: &ModelArtifact) -> AppResult<()> {
        let bytes = serde_json::to_vec(artifact)
            .map_err(|e| AppError::Artifact(format!("Serialization failed: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Artifact(format!("Cannot create {}: {}", parent.display(), e)))?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| AppError::Artifact(format!("Write failed: {}", e)))?;

        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(AppError::Artifact(format!("Replace failed: {}", e)));
        }
        *self.cache.write().await = None;

        tracing::info!(
            path = %self.path.display(),
            version = %artifact.version,
            bytes = bytes.len(),
            "Model artifact saved"
        );
        Ok(())
    }

    async fn load(&self) -> AppResult<Option<Arc<ModelArtifact>>> {
        let stamp = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => FileStamp::of(&metadata),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No model artifact on disk");
                *self.cache.write().await = None;
                return Ok(None);
            }
            Err(e) => return Err(AppError::Artifact(format!("Read failed: {}", e))),
        };

        if let Some(artifact) = self.cached(stamp).await {
            return Ok(Some(artifact));
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Artifact(format!("Read failed: {}", e))),
        };

        let artifact: ModelArtifact = tokio::task::spawn_blocking(move || {
            serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Artifact(format!("Deserialization failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Artifact parse task failed: {}", e)))??;

        let artifact = Arc::new(artifact);
        tracing::info!(
            path = %self.path.display(),
            version = %artifact.version,
            "Model artifact loaded"
        );
        *self.cache.write().await = Some(CachedArtifact {
            stamp,
            artifact: Arc::clone(&artifact),
        });
        Ok(Some(artifact))
    }
}
