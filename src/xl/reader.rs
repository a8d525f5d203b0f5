//! Parallel Metadata Reader
//!
//! Reads one object's metadata document from every disk of a disk set at
//! once and joins the results into arrays index-aligned with the set.
//!
//! Each present disk gets its own task. Every task owns one slot and
//! returns its outcome; the coordinator waits for all of them before
//! filling the output arrays, so there is no early return and a slow or
//! failing disk never disturbs another slot. Absent disks are not read and
//! report [`DiskError::DiskNotFound`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, instrument};

use super::meta::{MetadataRecord, PartInfo, StatInfo};
use super::parse::{parse_metadata, parse_parts, parse_stat};
use crate::config::MetaConfig;
use crate::disk::{DiskHandle, StorageDisk};
use crate::error::{DiskError, ErrorSet};

/// Stat section and user metadata of one disk's document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStat {
    pub stat: StatInfo,
    pub meta: HashMap<String, String>,
}

type Decoder<T> = fn(&[u8], &MetaConfig) -> Result<T, DiskError>;

fn decode_stat(buf: &[u8], config: &MetaConfig) -> Result<ObjectStat, DiskError> {
    let (stat, meta) = parse_stat(buf, config)?;
    Ok(ObjectStat { stat, meta })
}

/// Reads metadata documents from single disks and whole disk sets
#[derive(Debug, Clone, Default)]
pub struct MetadataReader {
    config: Arc<MetaConfig>,
}

impl MetadataReader {
    /// Create a reader using `config`
    pub fn new(config: MetaConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The reader's configuration
    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    // =========================================================================
    // Single Disk
    // =========================================================================

    /// Read and decode the full metadata document from one disk
    pub async fn read_metadata(
        &self,
        disk: &dyn StorageDisk,
        bucket: &str,
        object: &str,
    ) -> Result<MetadataRecord, DiskError> {
        read_one(disk, bucket, object, &self.config, parse_metadata).await
    }

    /// Read only `stat` and user metadata from one disk
    pub async fn read_stat(
        &self,
        disk: &dyn StorageDisk,
        bucket: &str,
        object: &str,
    ) -> Result<ObjectStat, DiskError> {
        read_one(disk, bucket, object, &self.config, decode_stat).await
    }

    /// Read only the parts list from one disk
    pub async fn read_parts(
        &self,
        disk: &dyn StorageDisk,
        bucket: &str,
        object: &str,
    ) -> Result<Vec<PartInfo>, DiskError> {
        read_one(disk, bucket, object, &self.config, parse_parts).await
    }

    // =========================================================================
    // Disk Set
    // =========================================================================

    /// Read the full metadata document from every disk in parallel.
    ///
    /// Slots that failed hold a zero-value record and their failure.
    #[instrument(skip(self, disks), fields(disks = disks.len()))]
    pub async fn read_all_metadata(
        &self,
        disks: &[DiskHandle],
        bucket: &str,
        object: &str,
    ) -> (Vec<MetadataRecord>, ErrorSet) {
        self.fan_out(disks, bucket, object, parse_metadata).await
    }

    /// Read only `stat` and user metadata from every disk in parallel
    #[instrument(skip(self, disks), fields(disks = disks.len()))]
    pub async fn read_all_stat(
        &self,
        disks: &[DiskHandle],
        bucket: &str,
        object: &str,
    ) -> (Vec<ObjectStat>, ErrorSet) {
        self.fan_out(disks, bucket, object, decode_stat).await
    }

    /// Read only the parts list from every disk in parallel
    #[instrument(skip(self, disks), fields(disks = disks.len()))]
    pub async fn read_all_parts(
        &self,
        disks: &[DiskHandle],
        bucket: &str,
        object: &str,
    ) -> (Vec<Vec<PartInfo>>, ErrorSet) {
        self.fan_out(disks, bucket, object, parse_parts).await
    }

    async fn fan_out<T>(
        &self,
        disks: &[DiskHandle],
        bucket: &str,
        object: &str,
        decode: Decoder<T>,
    ) -> (Vec<T>, ErrorSet)
    where
        T: Default + Send + 'static,
    {
        let tasks = disks.iter().map(|disk| {
            let task = disk.as_ref().map(|disk| {
                let disk = Arc::clone(disk);
                let bucket = bucket.to_string();
                let object = object.to_string();
                let config = Arc::clone(&self.config);
                tokio::spawn(async move {
                    read_one(disk.as_ref(), &bucket, &object, &config, decode).await
                })
            });

            async move {
                match task {
                    None => Err(DiskError::DiskNotFound),
                    Some(handle) => handle.await.unwrap_or_else(|e| {
                        error!(error = %e, "metadata read task did not complete");
                        Err(DiskError::FaultyDisk)
                    }),
                }
            }
        });

        // Wait for every disk, successful or not.
        let outcomes = join_all(tasks).await;

        let mut values = Vec::with_capacity(outcomes.len());
        let mut errs = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(value) => {
                    values.push(value);
                    errs.push(None);
                }
                Err(err) => {
                    debug!(disk = index, error = %err, "metadata read failed");
                    values.push(T::default());
                    errs.push(Some(err));
                }
            }
        }

        (values, errs)
    }
}

async fn read_one<T>(
    disk: &dyn StorageDisk,
    bucket: &str,
    object: &str,
    config: &MetaConfig,
    decode: Decoder<T>,
) -> Result<T, DiskError> {
    let buf = disk.read_all(bucket, &config.metadata_path(object)).await?;
    decode(&buf, config)
}
