//! Erasure Metadata Module
//!
//! Consistency layer for per-object metadata striped across a disk set.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                      Erasure Metadata Module                          │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                       │
//! │  disks ──► MetadataReader ──► parse (per disk) ──► (records, errs)    │
//! │                                                        │              │
//! │                                                        ▼              │
//! │                                              Quorum Resolver          │
//! │                                                        │              │
//! │                                                        ▼              │
//! │                                           Distribution Shuffler       │
//! │                                                        │              │
//! │                                                        ▼              │
//! │                                          records in logical order     │
//! │                                                                       │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **Metadata Record** (`meta.rs`): decoded document types
//! - **Parser** (`parse.rs`): document decode/encode and the format check
//! - **Reader** (`reader.rs`): parallel fan-out reads over a disk set
//! - **Quorum Resolver** (`quorum.rs`): reduces per-disk errors to one outcome
//! - **Distribution** (`distribution.rs`): physical to logical reordering
//! - **Part Size** (`part_size.rs`): expected size of a part by index
//!
//! # Usage
//!
//! ```rust,ignore
//! use stripemeta::xl::{reduce_read_quorum_errs, shuffle_parts_metadata, MetadataReader};
//!
//! let reader = MetadataReader::default();
//! let (records, errs) = reader.read_all_metadata(&disks, "bucket", "object").await;
//! reduce_read_quorum_errs(&errs, &[], read_quorum)?;
//!
//! let distribution = records[0].erasure.distribution.clone();
//! let ordered = shuffle_parts_metadata(records, Some(&distribution[..]));
//! ```

pub mod distribution;
pub mod meta;
pub mod parse;
pub mod part_size;
pub mod quorum;
pub mod reader;

#[cfg(test)]
mod proptest;

pub use distribution::{
    hash_order, inverse_distribution, is_valid_distribution, shuffle, shuffle_disks,
    shuffle_parts_metadata,
};
pub use meta::{BitrotAlgorithm, ChecksumInfo, ErasureInfo, MetadataRecord, PartInfo, StatInfo};
pub use parse::{check_format, encode_metadata, parse_metadata, parse_parts, parse_stat};
pub use part_size::part_size_from_index;
pub use quorum::{
    reduce_errs, reduce_quorum_errs, reduce_read_quorum_errs, reduce_write_quorum_errs,
    ObjectQuorum,
};
pub use reader::{MetadataReader, ObjectStat};
