//! Canonical balanced partition
//!
//! `n_elems` elements are split over `n_ranks` ranks in contiguous blocks of
//! `n_elems / n_ranks` elements. The first `n_elems % n_ranks` ranks hold one
//! extra element. Every rank can compute the range of every other rank without
//! communication.
use num::Integer;
use std::ops::Range;

/// The rank that owns global index `idx`.
///
/// Panics if `idx >= n_elems`.
pub fn locate_rank(n_elems: usize, n_ranks: usize, idx: usize) -> usize {
    assert!(
        idx < n_elems,
        "Index {idx} out of range for {n_elems} elements."
    );
    let (upp, rem) = n_elems.div_rem(&n_ranks);
    if idx < rem * (upp + 1) {
        idx / (upp + 1)
    } else {
        rem + (idx - rem * (upp + 1)) / upp
    }
}

/// Number of elements held by `rank`.
pub fn local_size(n_elems: usize, n_ranks: usize, rank: usize) -> usize {
    let (upp, rem) = n_elems.div_rem(&n_ranks);
    upp + usize::from(rank < rem)
}

/// Global index of the first element held by `rank`.
///
/// This is the exclusive prefix sum of [`local_size`] over the ranks before `rank`.
pub fn local_offset(n_elems: usize, n_ranks: usize, rank: usize) -> usize {
    let (upp, rem) = n_elems.div_rem(&n_ranks);
    rank * upp + rank.min(rem)
}

/// Range of global indices held by `rank`.
pub fn local_range(n_elems: usize, n_ranks: usize, rank: usize) -> Range<usize> {
    let start = local_offset(n_elems, n_ranks, rank);
    start..start + local_size(n_elems, n_ranks, rank)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_locate_rank() {
        assert_eq!(locate_rank(1, 1, 0), 0);

        assert_eq!(locate_rank(2, 1, 0), 0);
        assert_eq!(locate_rank(2, 1, 1), 0);

        assert_eq!(locate_rank(2, 2, 0), 0);
        assert_eq!(locate_rank(2, 2, 1), 1);

        assert_eq!(locate_rank(3, 2, 0), 0);
        assert_eq!(locate_rank(3, 2, 1), 0);
        assert_eq!(locate_rank(3, 2, 2), 1);

        assert_eq!(locate_rank(3, 3, 0), 0);
        assert_eq!(locate_rank(3, 3, 1), 1);
        assert_eq!(locate_rank(3, 3, 2), 2);

        assert_eq!(locate_rank(5, 3, 0), 0);
        assert_eq!(locate_rank(5, 3, 1), 0);
        assert_eq!(locate_rank(5, 3, 2), 1);
        assert_eq!(locate_rank(5, 3, 3), 1);
        assert_eq!(locate_rank(5, 3, 4), 2);
    }

    #[test]
    fn test_more_ranks_than_elements() {
        // Ranks past the remainder are empty and never returned.
        assert_eq!(local_size(2, 5, 0), 1);
        assert_eq!(local_size(2, 5, 1), 1);
        assert_eq!(local_size(2, 5, 4), 0);
        assert_eq!(locate_rank(2, 5, 1), 1);
        assert_eq!(local_range(2, 5, 3), 2..2);
    }

    #[test]
    #[should_panic]
    fn test_locate_rank_out_of_range() {
        locate_rank(4, 2, 4);
    }

    #[test]
    fn test_local_size_and_offset() {
        let sizes = (0..4).map(|r| local_size(15, 4, r)).collect::<Vec<_>>();
        assert_eq!(sizes, vec![4, 4, 4, 3]);
        let offsets = (0..4).map(|r| local_offset(15, 4, r)).collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 4, 8, 12]);
    }

    proptest! {
        #[test]
        fn test_partition_consistency(n_elems in 1usize..400, n_ranks in 1usize..17) {
            let mut start = 0;
            for rank in 0..n_ranks {
                let size = local_size(n_elems, n_ranks, rank);
                prop_assert_eq!(local_offset(n_elems, n_ranks, rank), start);
                for idx in start..start + size {
                    prop_assert_eq!(locate_rank(n_elems, n_ranks, idx), rank);
                }
                start += size;
            }
            prop_assert_eq!(start, n_elems);
        }
    }
}
