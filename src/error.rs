//! Error types for the metadata consistency layer
//!
//! Two levels exist. [`DiskError`] is the failure of a single disk slot and
//! compares by value (kind and payload), so identical failures reported by
//! different disks can be tallied together. [`Error`] is the crate-level
//! outcome returned to callers once per-disk results have been reduced.

use std::fmt;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Per-disk results, positionally aligned with the disk set.
///
/// `None` is "no error" for that slot.
pub type ErrorSet = Vec<Option<DiskError>>;

/// Failure of a single disk slot.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiskError {
    /// The slot has no backing disk handle
    #[error("disk not found")]
    DiskNotFound,

    /// The requested file does not exist on the disk
    #[error("file not found")]
    FileNotFound,

    /// The bucket (volume) does not exist on the disk
    #[error("volume not found")]
    VolumeNotFound,

    /// The disk is reachable but not behaving
    #[error("faulty disk")]
    FaultyDisk,

    /// No space left on the disk
    #[error("disk full")]
    DiskFull,

    /// Unrecognized version/format combination
    #[error("corrupted format")]
    CorruptedFormat,

    /// Checksum entry names an algorithm that cannot be verified
    #[error("unknown checksum algorithm: {0}")]
    UnknownChecksumAlgorithm(String),

    /// Checksum hash is not valid hexadecimal
    #[error("malformed checksum hash: {0}")]
    MalformedHash(String),

    /// `stat.modTime` is not an RFC3339 timestamp
    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(String),

    /// The document is not structurally decodable
    #[error("malformed metadata document: {0}")]
    MalformedDocument(String),

    /// Any other I/O failure reported by the disk
    #[error("disk I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DiskError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => DiskError::FileNotFound,
            ErrorKind::PermissionDenied => DiskError::FaultyDisk,
            _ if err.raw_os_error() == Some(28) => DiskError::DiskFull,
            _ => DiskError::Io(err.kind().to_string()),
        }
    }
}

/// Which quorum a reduction was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuorumKind {
    Read,
    Write,
}

impl fmt::Display for QuorumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumKind::Read => write!(f, "read"),
            QuorumKind::Write => write!(f, "write"),
        }
    }
}

/// Errors returned to callers of this crate
#[derive(Error, Debug)]
pub enum Error {
    /// A single disk failure reached quorum
    #[error("{cause} (agreed by {} of {} disks)", count_of(.errs, .cause), .errs.len())]
    Disk { cause: DiskError, errs: ErrorSet },

    /// Neither success nor any single failure reached quorum
    #[error("{kind} quorum not met ({} of {} disks failed)", failed(.errs), .errs.len())]
    QuorumNotMet { kind: QuorumKind, errs: ErrorSet },

    /// Part size below one passed to the part-size predictor
    #[error("part size must be positive")]
    InvalidPartSize,

    /// Part index below one passed to the part-size predictor
    #[error("part index cannot be smaller than 1")]
    InvalidPartIndex,

    /// Mismatched array lengths between co-indexed inputs
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Raw per-disk results attached to a quorum outcome, if any.
    pub fn errs(&self) -> Option<&[Option<DiskError>]> {
        match self {
            Error::Disk { errs, .. } | Error::QuorumNotMet { errs, .. } => Some(errs),
            _ => None,
        }
    }

    /// The per-disk failure this error reduces to, if it is one.
    pub fn disk_cause(&self) -> Option<&DiskError> {
        match self {
            Error::Disk { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

fn count_of(errs: &[Option<DiskError>], cause: &DiskError) -> usize {
    errs.iter().filter(|e| e.as_ref() == Some(cause)).count()
}

fn failed(errs: &[Option<DiskError>]) -> usize {
    errs.iter().filter(|e| e.is_some()).count()
}
