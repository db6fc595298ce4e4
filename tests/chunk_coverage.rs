//! Test that file chunks cover the canonical partition
use proptest::prelude::*;
use redistribute::{
    chunks::plan_chunks,
    partition::{local_range, locate_rank},
    Chunk,
};

// Global indices of the elements in `chunks`, in chunk order.
fn global_indices(file_elems: &[usize], chunks: &[Chunk]) -> Vec<usize> {
    let file_starts = file_elems
        .iter()
        .scan(0, |acc, &n| {
            let old = *acc;
            *acc += n;
            Some(old)
        })
        .collect::<Vec<_>>();
    chunks
        .iter()
        .flat_map(|c| {
            assert!(c.end() <= file_elems[c.file]);
            let start = file_starts[c.file] + c.offset;
            start..start + c.len
        })
        .collect()
}

fn check_coverage(file_elems: &[usize], n_ranks: usize) {
    let n_elems = file_elems.iter().sum::<usize>();
    let mut seen = vec![0usize; n_elems];
    for rank in 0..n_ranks {
        let range = local_range(n_elems, n_ranks, rank);
        let chunks = plan_chunks(file_elems, range.clone());

        // Chunks are in file order, non-empty and at most one per file.
        assert!(chunks.iter().all(|c| c.len > 0));
        assert!(chunks.windows(2).all(|w| w[0].file < w[1].file));

        let indices = global_indices(file_elems, &chunks);
        assert_eq!(indices, range.collect::<Vec<_>>());
        for i in indices {
            assert_eq!(locate_rank(n_elems, n_ranks, i), rank);
            seen[i] += 1;
        }
    }
    assert!(seen.iter().all(|&s| s == 1));
}

macro_rules! make_tests {
    ($n_ranks:literal) => {
        paste::item! {
            #[test]
            fn [< test_three_files_ $n_ranks _ranks >]() {
                //! Files of 3, 7 and 5 elements
                check_coverage(&[3, 7, 5], $n_ranks);
            }
            #[test]
            fn [< test_sparse_files_ $n_ranks _ranks >]() {
                //! Files with empty files in between
                check_coverage(&[0, 1, 0, 0, 9, 2, 0, 4, 0], $n_ranks);
            }
            #[test]
            fn [< test_many_small_files_ $n_ranks _ranks >]() {
                //! More files than elements per rank
                check_coverage(&[1; 23], $n_ranks);
            }
        }
    };
}

make_tests!(1);
make_tests!(2);
make_tests!(3);
make_tests!(4);
make_tests!(7);
make_tests!(16);

proptest! {
    #[test]
    fn test_random_file_layouts(
        file_elems in prop::collection::vec(0usize..40, 0..12),
        n_ranks in 1usize..12,
    ) {
        check_coverage(&file_elems, n_ranks);
    }
}
