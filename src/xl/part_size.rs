//! Part-Size Predictor

use crate::error::{Error, Result};

/// Expected byte length of the 1-based part `part_index` of an object of
/// `total_size` bytes cut into `part_size` chunks.
///
/// A `total_size` of -1 (unknown) or 0 (empty) is returned unchanged. A
/// `part_size` below one is rejected.
/// Indices past the last part yield 0.
///
/// The part count is `total_size / part_size + 1`, so an object whose size
/// is an exact multiple of `part_size` has a trailing zero-length part
/// (100 bytes in 10 byte parts: part 11 has size 0). Callers rely on this.
pub fn part_size_from_index(total_size: i64, part_size: i64, part_index: i64) -> Result<i64> {
    if part_size <= 0 {
        return Err(Error::InvalidPartSize);
    }
    if part_index < 1 {
        return Err(Error::InvalidPartIndex);
    }
    if total_size == -1 || total_size == 0 {
        return Ok(total_size);
    }

    // Compared as `part_index - 1` against the full part count so that
    // `total_size / part_size + 1` cannot overflow.
    let full_parts = total_size / part_size;
    Ok(match (part_index - 1).cmp(&full_parts) {
        std::cmp::Ordering::Less => part_size,
        std::cmp::Ordering::Equal => total_size % part_size,
        std::cmp::Ordering::Greater => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_exact_multiple() {
        for index in 1..=10 {
            assert_eq!(part_size_from_index(100, 10, index).unwrap(), 10);
        }
        assert_eq!(part_size_from_index(100, 10, 11).unwrap(), 0);
        assert_eq!(part_size_from_index(100, 10, 12).unwrap(), 0);
    }

    #[test]
    fn test_remainder_part() {
        assert_eq!(part_size_from_index(105, 10, 10).unwrap(), 10);
        assert_eq!(part_size_from_index(105, 10, 11).unwrap(), 5);
        assert_eq!(part_size_from_index(105, 10, 12).unwrap(), 0);
        assert_eq!(part_size_from_index(5, 10, 1).unwrap(), 5);
    }

    #[test]
    fn test_unknown_and_empty_sizes() {
        for index in [1, 2, 100] {
            assert_eq!(part_size_from_index(-1, 10, index).unwrap(), -1);
            assert_eq!(part_size_from_index(0, 10, index).unwrap(), 0);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        for index in [0, 1, 5] {
            assert_matches!(part_size_from_index(100, 0, index), Err(Error::InvalidPartSize));
        }
        assert_matches!(part_size_from_index(100, 10, 0), Err(Error::InvalidPartIndex));
        assert_matches!(part_size_from_index(100, 10, -3), Err(Error::InvalidPartIndex));
        assert_matches!(part_size_from_index(-1, 10, 0), Err(Error::InvalidPartIndex));
    }

    #[test]
    fn test_negative_part_size_rejected() {
        assert_matches!(part_size_from_index(100, -10, 1), Err(Error::InvalidPartSize));
        assert_matches!(part_size_from_index(i64::MIN, -1, 1), Err(Error::InvalidPartSize));
    }

    #[test]
    fn test_extreme_sizes_do_not_overflow() {
        assert_eq!(part_size_from_index(i64::MAX, 1, 1).unwrap(), 1);
        assert_eq!(part_size_from_index(i64::MAX, 1, i64::MAX).unwrap(), 1);
        assert_eq!(part_size_from_index(i64::MAX, i64::MAX, 1).unwrap(), i64::MAX);
        assert_eq!(part_size_from_index(i64::MAX, i64::MAX, 2).unwrap(), 0);
    }
}
