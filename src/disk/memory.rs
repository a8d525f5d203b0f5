//! In-memory disk
//!
//! A [`StorageDisk`] backed by nested DashMaps, with injectable read
//! failures and latency. Used by tests and by tools that assemble disk sets
//! without touching the filesystem.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::StorageDisk;
use crate::error::DiskError;

/// In-memory storage disk
pub struct MemoryDisk {
    /// Disk name, shown in Debug output
    name: String,
    /// Storage (bucket -> path -> data)
    storage: DashMap<String, DashMap<String, Bytes>>,
    /// Failure returned for every read, if set
    fault: RwLock<Option<DiskError>>,
    /// Delay applied before every read
    latency: Option<Duration>,
    /// Read operations
    reads: AtomicU64,
}

impl MemoryDisk {
    /// Create an empty disk
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: DashMap::new(),
            fault: RwLock::new(None),
            latency: None,
            reads: AtomicU64::new(0),
        }
    }

    /// Delay every read by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store `data` at `(bucket, path)`, creating the bucket if needed
    pub fn put(&self, bucket: &str, path: &str, data: impl Into<Bytes>) {
        self.storage
            .entry(bucket.to_string())
            .or_default()
            .insert(path.to_string(), data.into());
    }

    /// Create an empty bucket
    pub fn make_bucket(&self, bucket: &str) {
        self.storage.entry(bucket.to_string()).or_default();
    }

    /// Make every subsequent read fail with `err`
    pub fn inject_fault(&self, err: DiskError) {
        *self.fault.write() = Some(err);
    }

    /// Remove an injected fault
    pub fn clear_fault(&self) {
        *self.fault.write() = None;
    }

    /// Number of reads served or attempted
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MemoryDisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDisk").field("name", &self.name).finish()
    }
}

#[async_trait]
impl StorageDisk for MemoryDisk {
    async fn read_all(&self, bucket: &str, path: &str) -> Result<Bytes, DiskError> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = self.fault.read().clone() {
            return Err(err);
        }

        let bucket = self.storage.get(bucket).ok_or(DiskError::VolumeNotFound)?;
        let data = bucket
            .get(path)
            .map(|data| data.value().clone())
            .ok_or(DiskError::FileNotFound);
        data
    }
}
