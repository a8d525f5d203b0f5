//! Quorum Resolver
//!
//! Reduces a per-disk [`ErrorSet`](crate::error::ErrorSet) to one outcome.
//! Every distinct value in the set ("no error" included) is tallied by value
//! equality; the most frequent value wins and is checked against the quorum.
//!
//! When several values share the highest count, "no error" is preferred.
//! Among tied failures the one seen first in disk order wins. With a quorum
//! of at least a simple majority no tied value can reach quorum, so the
//! choice never changes the result.

use std::collections::HashMap;

use tracing::debug;

use super::meta::ErasureInfo;
use crate::error::{DiskError, Error, QuorumKind, Result};

/// Most frequent value in `errs` and its count, skipping `ignored` failures.
///
/// Ignored slots are left out of the vote entirely. "No error" is never
/// ignored.
pub fn reduce_errs(
    errs: &[Option<DiskError>],
    ignored: &[DiskError],
) -> (usize, Option<DiskError>) {
    let voting = errs.iter().filter(|err| !is_ignored(err, ignored));

    let mut counts: HashMap<&Option<DiskError>, usize> = HashMap::new();
    for err in voting.clone() {
        *counts.entry(err).or_insert(0) += 1;
    }

    let mut max_count = 0;
    let mut max_err: Option<&Option<DiskError>> = None;
    for err in voting {
        let count = counts[err];
        match max_err {
            _ if count > max_count => {
                max_count = count;
                max_err = Some(err);
            }
            Some(Some(_)) if count == max_count && err.is_none() => {
                max_err = Some(err);
            }
            _ => {}
        }
    }

    (max_count, max_err.cloned().flatten())
}

fn is_ignored(err: &Option<DiskError>, ignored: &[DiskError]) -> bool {
    matches!(err, Some(e) if ignored.contains(e))
}

/// Reduce `errs` against `quorum`.
///
/// - "no error" reaching quorum is success
/// - a failure reaching quorum is returned as [`Error::Disk`]
/// - otherwise [`Error::QuorumNotMet`] of the given kind
///
/// Both failures carry the full raw set.
pub fn reduce_quorum_errs(
    errs: &[Option<DiskError>],
    ignored: &[DiskError],
    quorum: usize,
    kind: QuorumKind,
) -> Result<()> {
    let (max_count, max_err) = reduce_errs(errs, ignored);

    match max_err {
        None if max_count >= quorum => {
            debug!(max_count, quorum, %kind, "quorum reached");
            Ok(())
        }
        Some(cause) if max_count >= quorum => {
            debug!(max_count, quorum, %kind, error = %cause, "failure reached quorum");
            Err(Error::Disk {
                cause,
                errs: errs.to_vec(),
            })
        }
        _ => {
            debug!(max_count, quorum, %kind, "quorum not met");
            Err(Error::QuorumNotMet {
                kind,
                errs: errs.to_vec(),
            })
        }
    }
}

/// [`reduce_quorum_errs`] against the read quorum
pub fn reduce_read_quorum_errs(
    errs: &[Option<DiskError>],
    ignored: &[DiskError],
    read_quorum: usize,
) -> Result<()> {
    reduce_quorum_errs(errs, ignored, read_quorum, QuorumKind::Read)
}

/// [`reduce_quorum_errs`] against the write quorum
pub fn reduce_write_quorum_errs(
    errs: &[Option<DiskError>],
    ignored: &[DiskError],
    write_quorum: usize,
) -> Result<()> {
    reduce_quorum_errs(errs, ignored, write_quorum, QuorumKind::Write)
}

/// Read and write quorum of one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectQuorum {
    pub read: usize,
    pub write: usize,
}

impl ObjectQuorum {
    /// Quorum implied by an object's erasure layout.
    ///
    /// Reading needs every data shard; writing needs one more so two
    /// concurrent writers cannot both succeed.
    pub fn from_erasure(erasure: &ErasureInfo) -> Self {
        Self {
            read: erasure.data_blocks,
            write: erasure.data_blocks + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const NOT_FOUND: Option<DiskError> = Some(DiskError::FileNotFound);
    const FAULTY: Option<DiskError> = Some(DiskError::FaultyDisk);
    const MISSING: Option<DiskError> = Some(DiskError::DiskNotFound);

    #[test]
    fn test_reduce_errs_majority() {
        let errs = vec![None, NOT_FOUND, NOT_FOUND, FAULTY, NOT_FOUND];
        assert_eq!(reduce_errs(&errs, &[]), (3, NOT_FOUND));

        let errs = vec![None, None, FAULTY];
        assert_eq!(reduce_errs(&errs, &[]), (2, None));
    }

    #[test]
    fn test_reduce_errs_tie_prefers_no_error() {
        let errs = vec![FAULTY, None, FAULTY, None];
        assert_eq!(reduce_errs(&errs, &[]), (2, None));

        let errs = vec![NOT_FOUND, NOT_FOUND, None, None, FAULTY];
        assert_eq!(reduce_errs(&errs, &[]), (2, None));
    }

    #[test]
    fn test_reduce_errs_ignored() {
        let errs = vec![MISSING, MISSING, MISSING, None, None];
        assert_eq!(reduce_errs(&errs, &[DiskError::DiskNotFound]), (2, None));
        assert_eq!(reduce_errs(&errs, &[]), (3, MISSING));
    }

    #[test]
    fn test_reduce_errs_value_equality_on_payload() {
        let a = Some(DiskError::MalformedHash("odd length".into()));
        let b = Some(DiskError::MalformedHash("bad char".into()));
        let errs = vec![a.clone(), b, a.clone(), None];

        assert_eq!(reduce_errs(&errs, &[]), (2, a));
    }

    #[test]
    fn test_reduce_errs_empty() {
        assert_eq!(reduce_errs(&[], &[]), (0, None));
        assert_eq!(reduce_errs(&[FAULTY], &[DiskError::FaultyDisk]), (0, None));
    }

    #[test]
    fn test_reduce_quorum_success() {
        let errs = vec![None, None, None, FAULTY];
        assert!(reduce_read_quorum_errs(&errs, &[], 3).is_ok());
    }

    #[test]
    fn test_reduce_quorum_failure_in_quorum() {
        let errs = vec![NOT_FOUND, NOT_FOUND, NOT_FOUND, None];
        let err = reduce_read_quorum_errs(&errs, &[], 3).unwrap_err();

        assert_matches!(&err, Error::Disk { cause: DiskError::FileNotFound, .. });
        assert_eq!(err.errs(), Some(&errs[..]));
    }

    #[test]
    fn test_reduce_quorum_not_met() {
        let errs = vec![None, None, FAULTY, NOT_FOUND];

        let err = reduce_read_quorum_errs(&errs, &[], 3).unwrap_err();
        assert_matches!(&err, Error::QuorumNotMet { kind: QuorumKind::Read, .. });
        assert_eq!(err.errs(), Some(&errs[..]));

        let err = reduce_write_quorum_errs(&errs, &[], 3).unwrap_err();
        assert_matches!(err, Error::QuorumNotMet { kind: QuorumKind::Write, .. });
    }

    #[test]
    fn test_reduce_quorum_zero_disks() {
        let err = reduce_read_quorum_errs(&[], &[], 1).unwrap_err();
        assert_matches!(err, Error::QuorumNotMet { .. });
    }

    #[test]
    fn test_object_quorum_from_erasure() {
        let erasure = ErasureInfo {
            data_blocks: 4,
            parity_blocks: 2,
            ..Default::default()
        };

        assert_eq!(
            ObjectQuorum::from_erasure(&erasure),
            ObjectQuorum { read: 4, write: 5 }
        );
    }
}
