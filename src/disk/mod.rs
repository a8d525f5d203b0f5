//! Disk Abstraction
//!
//! The metadata layer needs exactly one primitive from a disk: read a whole
//! file at `(bucket, path)`. A disk set is an ordered slice of
//! [`DiskHandle`]s where `None` marks an unreachable disk. Absence is a
//! valid member of the set and is distinct from a disk that fails a read.

pub mod local;
pub mod memory;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::error;

use crate::error::{DiskError, Error};

pub use local::LocalDisk;
pub use memory::MemoryDisk;

/// Storage disk trait
#[async_trait]
pub trait StorageDisk: Send + Sync + Debug {
    /// Read the entire file at `path` inside `bucket`
    async fn read_all(&self, bucket: &str, path: &str) -> Result<Bytes, DiskError>;
}

/// One slot of a disk set; `None` is an absent disk
pub type DiskHandle = Option<Arc<dyn StorageDisk>>;

/// Number of present disks, skipping absent slots
pub fn disk_count(disks: &[DiskHandle]) -> usize {
    disks.iter().filter(|d| d.is_some()).count()
}

/// Drop every disk whose slot in `errs` carries a failure.
///
/// Returns a new disk set where a slot with an error becomes `None` and
/// every other slot keeps its handle. Mismatched lengths are logged and an
/// empty set is returned.
pub fn eval_disks(disks: &[DiskHandle], errs: &[Option<DiskError>]) -> Vec<DiskHandle> {
    try_eval_disks(disks, errs).unwrap_or_else(|e| {
        error!(error = %e, "unable to evaluate disks");
        Vec::new()
    })
}

/// [`eval_disks`] that reports mismatched lengths as
/// [`Error::InternalConsistency`]
pub fn try_eval_disks(
    disks: &[DiskHandle],
    errs: &[Option<DiskError>],
) -> crate::error::Result<Vec<DiskHandle>> {
    if disks.len() != errs.len() {
        return Err(Error::InternalConsistency(format!(
            "{} disks but {} errors",
            disks.len(),
            errs.len()
        )));
    }

    Ok(disks
        .iter()
        .zip(errs)
        .map(|(disk, err)| match err {
            None => disk.clone(),
            Some(_) => None,
        })
        .collect())
}
