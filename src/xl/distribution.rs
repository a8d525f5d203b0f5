//! Erasure Distribution
//!
//! A distribution has one 1-based entry per physical disk position giving
//! the logical block slot that disk's shard occupies. It is persisted
//! 1-based; conversion to 0-based indices happens only inside [`shuffle`].

use super::meta::MetadataRecord;
use crate::disk::DiskHandle;

/// Reorder a physically indexed array into logical block order.
///
/// The element at physical position `i` moves to `distribution[i] - 1`.
/// With no distribution the input is already in logical order and is
/// returned as is. Metadata arrays and disk sets are shuffled by the same
/// rule so they stay co-indexed.
///
/// # Panics
///
/// If `distribution` is present but is not a permutation of `1..=len`.
/// Check with [`is_valid_distribution`] first when the source is untrusted.
pub fn shuffle<T: Default>(items: Vec<T>, distribution: Option<&[usize]>) -> Vec<T> {
    let Some(distribution) = distribution else {
        return items;
    };

    let mut shuffled: Vec<T> = std::iter::repeat_with(T::default)
        .take(items.len())
        .collect();
    for (item, &block) in items.into_iter().zip(distribution) {
        shuffled[block - 1] = item;
    }
    shuffled
}

/// Shuffle per-disk metadata into logical order
pub fn shuffle_parts_metadata(
    records: Vec<MetadataRecord>,
    distribution: Option<&[usize]>,
) -> Vec<MetadataRecord> {
    shuffle(records, distribution)
}

/// Shuffle a disk set into logical order
pub fn shuffle_disks(disks: Vec<DiskHandle>, distribution: Option<&[usize]>) -> Vec<DiskHandle> {
    shuffle(disks, distribution)
}

/// Whether `distribution` is a permutation of `1..=n`
pub fn is_valid_distribution(distribution: &[usize], n: usize) -> bool {
    if distribution.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &block in distribution {
        if block == 0 || block > n || seen[block - 1] {
            return false;
        }
        seen[block - 1] = true;
    }
    true
}

/// The distribution that undoes `distribution`.
///
/// `shuffle(shuffle(x, Some(p)), Some(&inverse_distribution(p))) == x`.
pub fn inverse_distribution(distribution: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; distribution.len()];
    for (position, &block) in distribution.iter().enumerate() {
        inverse[block - 1] = position + 1;
    }
    inverse
}

/// Deterministic 1-based order for `key` over `cardinality` disks.
///
/// Rotates `1..=cardinality` by an offset salted with the CRC32 (IEEE) of
/// the key. Collisions between keys are expected.
pub fn hash_order(key: &str, cardinality: usize) -> Vec<usize> {
    if cardinality == 0 {
        return Vec::new();
    }

    let key_crc = crc32fast::hash(key.as_bytes()) as usize;
    let start = (key_crc % cardinality) | 1;
    (1..=cardinality)
        .map(|i| 1 + (start + i) % cardinality)
        .collect()
}
