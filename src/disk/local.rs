//! Directory-backed disk
//!
//! Maps `(bucket, path)` to `<root>/<bucket>/<path>` and reads with
//! `tokio::fs`. Bucket and path components may not escape the root.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use super::StorageDisk;
use crate::error::DiskError;

/// Storage disk rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    /// Create a disk rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The disk's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, bucket: &str, path: &str) -> Result<PathBuf, DiskError> {
        let mut full = self.root.clone();
        for part in [bucket, path] {
            for component in Path::new(part).components() {
                match component {
                    Component::Normal(c) => full.push(c),
                    Component::CurDir | Component::RootDir => {}
                    Component::ParentDir | Component::Prefix(_) => {
                        return Err(DiskError::FileNotFound)
                    }
                }
            }
        }
        Ok(full)
    }
}

#[async_trait]
impl StorageDisk for LocalDisk {
    async fn read_all(&self, bucket: &str, path: &str) -> Result<Bytes, DiskError> {
        let bucket_dir = self.resolve(bucket, "")?;
        match tokio::fs::metadata(&bucket_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(DiskError::VolumeNotFound),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DiskError::VolumeNotFound)
            }
            Err(e) => return Err(e.into()),
        }

        let file = self.resolve(bucket, path)?;
        trace!(path = %file.display(), "reading file");
        let data = tokio::fs::read(&file).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::IsADirectory {
                DiskError::FileNotFound
            } else {
                DiskError::from(e)
            }
        })?;
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_disk_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket/obj")).unwrap();
        std::fs::write(dir.path().join("bucket/obj/xl.json"), b"{}").unwrap();

        let disk = LocalDisk::new(dir.path());
        let data = disk.read_all("bucket", "obj/xl.json").await.unwrap();
        assert_eq!(&data[..], b"{}");
    }

    #[tokio::test]
    async fn test_local_disk_missing_bucket_and_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket")).unwrap();

        let disk = LocalDisk::new(dir.path());
        assert_eq!(
            disk.read_all("nope", "obj/xl.json").await,
            Err(DiskError::VolumeNotFound)
        );
        assert_eq!(
            disk.read_all("bucket", "obj/xl.json").await,
            Err(DiskError::FileNotFound)
        );
    }

    #[tokio::test]
    async fn test_local_disk_rejects_parent_components() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket")).unwrap();
        let disk = LocalDisk::new(dir.path());

        assert_eq!(
            disk.read_all("bucket", "../../etc/passwd").await,
            Err(DiskError::FileNotFound)
        );
    }
}
