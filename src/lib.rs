//! stripemeta - Erasure Metadata Consistency Layer
//!
//! Per-object metadata of an erasure-coded object store is written to every
//! disk of a disk set. Disks fail, lag and disagree; this crate reads all of
//! them in parallel, decides by quorum whether the set agrees, and maps the
//! surviving metadata from physical disk order into logical block order.
//!
//! # Architecture
//!
//! ```text
//! MetadataReader ──► Parser (per disk) ──► Quorum Resolver ──► Shuffler
//! ```
//!
//! The part-size predictor and disk availability evaluator are used on
//! their own by repair and write planning.
//!
//! # Modules
//!
//! - [`config`] - Accepted document formats and file naming
//! - [`disk`] - Disk trait, local and in-memory disks, availability evaluation
//! - [`error`] - Error types
//! - [`xl`] - Metadata parsing, parallel reads, quorum, distribution, part sizes

pub mod config;
pub mod disk;
pub mod error;
pub mod xl;

// Re-export commonly used types
pub use config::{FormatVersion, MetaConfig};
pub use disk::{
    disk_count, eval_disks, try_eval_disks, DiskHandle, LocalDisk, MemoryDisk, StorageDisk,
};
pub use error::{DiskError, Error, ErrorSet, QuorumKind, Result};
pub use xl::{MetadataReader, MetadataRecord, ObjectQuorum};
