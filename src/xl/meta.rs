//! Object Metadata Record
//!
//! In-memory form of one disk's metadata document. A record is built per
//! read attempt, never mutated after decoding, and dropped once the caller
//! is done with it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::DiskError;

// =============================================================================
// Bitrot Algorithm
// =============================================================================

/// Per-shard integrity hash algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitrotAlgorithm {
    Sha256,
    Blake2b512,
    HighwayHash256,
}

impl BitrotAlgorithm {
    /// Name as persisted in the metadata document
    pub fn as_str(&self) -> &'static str {
        match self {
            BitrotAlgorithm::Sha256 => "sha256",
            BitrotAlgorithm::Blake2b512 => "blake2b",
            BitrotAlgorithm::HighwayHash256 => "highwayhash256",
        }
    }

    /// Length in bytes of a digest produced by this algorithm
    pub fn digest_len(&self) -> usize {
        match self {
            BitrotAlgorithm::Sha256 => 32,
            BitrotAlgorithm::Blake2b512 => 64,
            BitrotAlgorithm::HighwayHash256 => 32,
        }
    }
}

impl FromStr for BitrotAlgorithm {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(BitrotAlgorithm::Sha256),
            "blake2b" => Ok(BitrotAlgorithm::Blake2b512),
            "highwayhash256" => Ok(BitrotAlgorithm::HighwayHash256),
            other => Err(DiskError::UnknownChecksumAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for BitrotAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Record Sections
// =============================================================================

/// Object stat section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatInfo {
    /// Last modification time
    pub mod_time: DateTime<Utc>,
    /// Object size in bytes; -1 when unknown
    pub size: i64,
}

/// Checksum of one part's shard on this disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumInfo {
    /// Part file name the checksum belongs to
    pub name: String,
    pub algorithm: BitrotAlgorithm,
    pub hash: Vec<u8>,
}

/// Erasure coding section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErasureInfo {
    /// Erasure algorithm name
    pub algorithm: String,
    /// Number of data shards
    pub data_blocks: usize,
    /// Number of parity shards
    pub parity_blocks: usize,
    /// Erasure block size in bytes
    pub block_size: i64,
    /// 1-based position of this disk's shard
    pub index: usize,
    /// Physical disk position -> 1-based logical block slot
    pub distribution: Vec<usize>,
    pub checksums: Vec<ChecksumInfo>,
}

impl ErasureInfo {
    /// The distribution, or `None` when the stripe is already in logical order
    pub fn distribution(&self) -> Option<&[usize]> {
        if self.distribution.is_empty() {
            None
        } else {
            Some(&self.distribution)
        }
    }

    /// Checksum entry for the part file `name`
    pub fn checksum_info(&self, name: &str) -> Option<&ChecksumInfo> {
        self.checksums.iter().find(|c| c.name == name)
    }

    /// Total shards in the stripe
    pub fn total_blocks(&self) -> usize {
        self.data_blocks + self.parity_blocks
    }
}

/// One part of a (possibly multipart) object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartInfo {
    pub number: usize,
    pub name: String,
    pub etag: String,
    pub size: i64,
}

// =============================================================================
// Metadata Record
// =============================================================================

/// Decoded metadata document of one disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub version: String,
    pub format: String,
    pub stat: StatInfo,
    pub erasure: ErasureInfo,
    pub parts: Vec<PartInfo>,
    /// User-defined metadata
    pub meta: HashMap<String, String>,
    /// Server release that wrote the document
    pub release: String,
}

impl MetadataRecord {
    /// Position of the part numbered `number` in `parts`
    pub fn object_part_index(&self, number: usize) -> Option<usize> {
        self.parts.iter().position(|p| p.number == number)
    }

    /// True for the zero-value record left in slots that failed to read
    pub fn is_empty(&self) -> bool {
        *self == MetadataRecord::default()
    }
}
