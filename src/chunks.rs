//! Map the concatenation of a set of files onto the canonical partition
use crate::{
    collective::exclusive_offset,
    displs::displs_from_counts,
    partition::{local_offset, local_size},
    types::Chunk,
};
use itertools::izip;
use log::debug;
use mpi::traits::Communicator;
use std::ops::Range;

/// The chunks of the files that make up the global range `range`.
///
/// The files are concatenated in order; `file_elems[i]` is the number of elements in file
/// `i`. The chunks are in increasing global order, there is at most one chunk per file and
/// empty files never produce a chunk.
pub fn plan_chunks(file_elems: &[usize], range: Range<usize>) -> Vec<Chunk> {
    let file_displs = displs_from_counts(file_elems);
    assert!(
        range.start <= range.end && range.end <= file_displs[file_elems.len()],
        "Range {range:?} does not fit into {} elements.",
        file_displs[file_elems.len()]
    );

    let mut chunks = vec![];
    let mut current = range.start;
    for (file, (start, n)) in izip!(&file_displs, file_elems).enumerate() {
        if current >= range.end {
            break;
        }
        if current < start + n {
            debug_assert!(current >= *start);
            let end = (start + n).min(range.end);
            chunks.push(Chunk::new(file, current - start, end - current));
            current = end;
        }
    }
    debug_assert_eq!(current, range.end);
    chunks
}

/// The chunks of the files this rank loads.
///
/// Together the chunks hold exactly the elements that the canonical partition of the
/// concatenated files assigns to this rank. Collective.
pub fn chunk_files(comm: &impl Communicator, file_elems: &[usize]) -> Vec<Chunk> {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let n_elems = file_elems.iter().sum::<usize>();
    let n_local_elems = local_size(n_elems, size, rank);
    let offset = exclusive_offset(comm, n_local_elems);
    debug_assert_eq!(offset, local_offset(n_elems, size, rank));

    let chunks = plan_chunks(file_elems, offset..offset + n_local_elems);
    debug!(
        "Rank {rank}: {n_local_elems} of {n_elems} elements from {} files in {} chunks.",
        file_elems.len(),
        chunks.len()
    );
    chunks
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::partition::local_range;

    fn chunks_for(file_elems: &[usize], n_ranks: usize, rank: usize) -> Vec<Chunk> {
        let n_elems = file_elems.iter().sum();
        plan_chunks(file_elems, local_range(n_elems, n_ranks, rank))
    }

    fn c(file: usize, offset: usize, len: usize) -> Chunk {
        Chunk::new(file, offset, len)
    }

    #[test]
    fn test_one_rank() {
        assert_eq!(
            chunks_for(&[3, 7, 5], 1, 0),
            vec![c(0, 0, 3), c(1, 0, 7), c(2, 0, 5)]
        );
    }

    #[test]
    fn test_two_ranks() {
        assert_eq!(chunks_for(&[3, 7, 5], 2, 0), vec![c(0, 0, 3), c(1, 0, 5)]);
        assert_eq!(chunks_for(&[3, 7, 5], 2, 1), vec![c(1, 5, 2), c(2, 0, 5)]);
    }

    #[test]
    fn test_three_ranks() {
        assert_eq!(chunks_for(&[3, 7, 5], 3, 0), vec![c(0, 0, 3), c(1, 0, 2)]);
        assert_eq!(chunks_for(&[3, 7, 5], 3, 1), vec![c(1, 2, 5)]);
        assert_eq!(chunks_for(&[3, 7, 5], 3, 2), vec![c(2, 0, 5)]);
    }

    #[test]
    fn test_four_ranks() {
        assert_eq!(chunks_for(&[3, 7, 5], 4, 0), vec![c(0, 0, 3), c(1, 0, 1)]);
        assert_eq!(chunks_for(&[3, 7, 5], 4, 1), vec![c(1, 1, 4)]);
        assert_eq!(chunks_for(&[3, 7, 5], 4, 2), vec![c(1, 5, 2), c(2, 0, 2)]);
        assert_eq!(chunks_for(&[3, 7, 5], 4, 3), vec![c(2, 2, 3)]);
    }

    #[test]
    fn test_empty_files() {
        assert_eq!(chunks_for(&[0, 4, 0, 0, 2, 0], 2, 0), vec![c(1, 0, 3)]);
        assert_eq!(
            chunks_for(&[0, 4, 0, 0, 2, 0], 2, 1),
            vec![c(1, 3, 1), c(4, 0, 2)]
        );
    }

    #[test]
    fn test_empty_range() {
        assert!(plan_chunks(&[], 0..0).is_empty());
        assert!(plan_chunks(&[3, 4], 3..3).is_empty());
        // More ranks than elements leaves the last ranks without chunks.
        assert!(chunks_for(&[1, 1], 3, 2).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_range_too_long() {
        plan_chunks(&[3, 4], 2..8);
    }
}
