//! Property-Based Tests for the Metadata Layer
//!
//! # Test Properties
//!
//! 1. **Shuffle Roundtrip**: shuffle(shuffle(x, p), inverse(p)) = x
//! 2. **Shuffle Identity**: shuffle(x, none) = x
//! 3. **Quorum Majority**: a value with a strict plurality reaching quorum decides the outcome
//! 4. **Part Sizes**: predicted part sizes sum to the object size

#![cfg(test)]

use proptest::prelude::*;

use super::distribution::{inverse_distribution, is_valid_distribution, shuffle};
use super::part_size::part_size_from_index;
use super::quorum::{reduce_errs, reduce_read_quorum_errs};
use crate::error::{DiskError, Error};

// =============================================================================
// Property Strategies
// =============================================================================

/// Strategy for a disk count and a 1-based permutation over it.
fn permutation_strategy() -> impl Strategy<Value = Vec<usize>> {
    (1usize..=16)
        .prop_flat_map(|n| Just((1..=n).collect::<Vec<_>>()).prop_shuffle())
}

/// Strategy for a single per-disk outcome.
fn outcome_strategy() -> impl Strategy<Value = Option<DiskError>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some(DiskError::FileNotFound)),
        1 => Just(Some(DiskError::FaultyDisk)),
        1 => Just(Some(DiskError::DiskNotFound)),
    ]
}

// =============================================================================
// Distribution Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: shuffling then applying the inverse restores the input.
    #[test]
    fn prop_shuffle_roundtrip(p in permutation_strategy()) {
        prop_assert!(is_valid_distribution(&p, p.len()));

        let items: Vec<u32> = (0..p.len() as u32).map(|i| i * 7 + 1).collect();
        let inverse = inverse_distribution(&p);

        let shuffled = shuffle(items.clone(), Some(&p[..]));
        let restored = shuffle(shuffled, Some(&inverse[..]));
        prop_assert_eq!(restored, items);
    }

    /// Property: every element lands in exactly one slot.
    #[test]
    fn prop_shuffle_is_permutation(p in permutation_strategy()) {
        let items: Vec<usize> = (1..=p.len()).collect();
        let mut shuffled = shuffle(items.clone(), Some(&p[..]));
        shuffled.sort_unstable();
        prop_assert_eq!(shuffled, items);
    }

    /// Property: no distribution means no reordering.
    #[test]
    fn prop_shuffle_identity(items in prop::collection::vec(any::<u16>(), 0..32)) {
        prop_assert_eq!(shuffle(items.clone(), None), items);
    }
}

// =============================================================================
// Quorum Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: a strict plurality value reaching quorum decides the outcome.
    #[test]
    fn prop_strict_plurality_decides(
        errs in prop::collection::vec(outcome_strategy(), 1..16),
        quorum in 1usize..16,
    ) {
        let count = |v: &Option<DiskError>| errs.iter().filter(|e| *e == v).count();
        let (max_count, max_err) = reduce_errs(&errs, &[]);

        prop_assert_eq!(max_count, count(&max_err));
        prop_assert!(errs.iter().all(|e| count(e) <= max_count));

        let strict = errs.iter().all(|e| *e == max_err || count(e) < max_count);
        if strict && max_count >= quorum {
            match (reduce_read_quorum_errs(&errs, &[], quorum), &max_err) {
                (Ok(()), None) => {}
                (Err(Error::Disk { cause, .. }), Some(expected)) => {
                    prop_assert_eq!(&cause, expected);
                }
                (other, _) => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
    }

    /// Property: "no error" wins every tie it takes part in.
    #[test]
    fn prop_tie_prefers_no_error(n in 1usize..8) {
        let mut errs = vec![None; n];
        errs.extend(std::iter::repeat(Some(DiskError::FaultyDisk)).take(n));

        prop_assert_eq!(reduce_errs(&errs, &[]), (n, None));
        errs.reverse();
        prop_assert_eq!(reduce_errs(&errs, &[]), (n, None));
    }
}

// =============================================================================
// Part Size Properties
// =============================================================================

proptest! {
    /// Property: part sizes over the whole part range add up to the object size.
    #[test]
    fn prop_part_sizes_sum_to_total(total in 1i64..100_000, part in 1i64..10_000) {
        let parts_count = total / part + 1;
        let sum: i64 = (1..=parts_count + 1)
            .map(|i| part_size_from_index(total, part, i).unwrap())
            .sum();
        prop_assert_eq!(sum, total);
    }
}
