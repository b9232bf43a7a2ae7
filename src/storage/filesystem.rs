//! Filesystem-backed object store. Containers are sub-directories of a root
//! directory and keys are relative paths inside them.

use super::{ObjectStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a container/key pair, refusing anything that escapes the root
    pub fn object_path(&self, container: &str, key: &str) -> StorageResult<PathBuf> {
        validate_segment(container)?;

        let relative = Path::new(key);
        if key.is_empty() || relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
                reason: "key must be a relative path without '.' or '..' components".to_string(),
            });
        }

        Ok(self.root.join(container).join(relative))
    }
}

fn validate_segment(container: &str) -> StorageResult<()> {
    let mut components = Path::new(container).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidKey {
            key: container.to_string(),
            reason: "container must be a single path segment".to_string(),
        }),
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn exists(&self, container: &str, key: &str) -> StorageResult<bool> {
        let path = self.object_path(container, key)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io("exists", container, key, e)),
        }
    }

    async fn copy(
        &self,
        source_container: &str,
        key: &str,
        destination_container: &str,
    ) -> StorageResult<()> {
        let source = self.object_path(source_container, key)?;
        let destination = self.object_path(destination_container, key)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io("copy", destination_container, key, e))?;
        }

        // Write next to the destination, flush to disk, then rename into place
        let staging = destination.with_file_name(format!(
            ".{}.{}.tmp",
            destination
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Uuid::new_v4()
        ));

        if let Err(e) = fs::copy(&source, &staging).await {
            let _ = fs::remove_file(&staging).await;
            return Err(if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(source_container, key)
            } else {
                StorageError::io("copy", source_container, key, e)
            });
        }

        let synced = async {
            fs::File::open(&staging).await?.sync_all().await?;
            fs::rename(&staging, &destination).await?;
            // The rename itself is only durable once the directory entry is flushed
            match destination.parent() {
                Some(parent) => sync_directory(parent).await,
                None => Ok(()),
            }
        }
        .await;

        if let Err(e) = synced {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::io("copy", destination_container, key, e));
        }

        debug!(
            source = %source.display(),
            destination = %destination.display(),
            "Object copied"
        );
        Ok(())
    }

    async fn delete(&self, container: &str, key: &str) -> StorageResult<()> {
        let path = self.object_path(container, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io("delete", container, key, e)),
        }
    }
}

#[cfg(unix)]
async fn sync_directory(path: &Path) -> std::io::Result<()> {
    fs::File::open(path).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_directory(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
