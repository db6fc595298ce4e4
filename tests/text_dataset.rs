//! Read a text dataset the way each rank would
use redistribute::{
    chunks::plan_chunks,
    config::Dataset,
    io::TextFiles,
    partition::local_range,
    traits::ChunkSource,
    RedistributeError,
};

fn write_dataset(prefix: &str, file_elems: &[usize], width: usize) -> TextFiles<i64> {
    let files = TextFiles::<i64>::new(Dataset::new(prefix, file_elems.len()).with_width(width));
    let mut start = 0;
    for (i, n) in file_elems.iter().enumerate() {
        let values = (start * width..(start + n) * width)
            .map(|v| -(v as i64))
            .collect::<Vec<_>>();
        files.write_file(i, &values).unwrap();
        start += n;
    }
    files
}

fn load_all_ranks(files: &mut TextFiles<i64>, n_ranks: usize) {
    let width = files.width();
    let file_elems = (0..files.n_files())
        .map(|i| files.element_count(i).unwrap())
        .collect::<Vec<_>>();
    let n_elems = file_elems.iter().sum::<usize>();

    for rank in 0..n_ranks {
        let range = local_range(n_elems, n_ranks, rank);
        let mut data = vec![0i64; range.len() * width];
        let mut start = 0;
        for chunk in plan_chunks(&file_elems, range.clone()) {
            let end = start + chunk.len * width;
            files.read_chunk(&chunk, &mut data[start..end]).unwrap();
            start = end;
        }
        let expected = (range.start * width..range.end * width)
            .map(|v| -(v as i64))
            .collect::<Vec<_>>();
        assert_eq!(data, expected);
    }
}

#[test]
fn test_single_values() {
    let mut files = write_dataset("_test_dataset_single", &[3, 7, 5], 1);
    for n_ranks in 1..6 {
        load_all_ranks(&mut files, n_ranks);
    }
}

#[test]
fn test_triples_with_empty_files() {
    let mut files = write_dataset("_test_dataset_triples", &[0, 4, 0, 2, 6], 3);
    for n_ranks in [1, 2, 5, 13] {
        load_all_ranks(&mut files, n_ranks);
    }
}

#[test]
fn test_truncated_file() {
    let mut files = write_dataset("_test_dataset_truncated", &[4], 1);
    std::fs::write(files.file_path(0), "4\n0\n-1\n").unwrap();
    assert_eq!(files.element_count(0).unwrap(), 4);

    let chunks = plan_chunks(&[4], 0..4);
    let mut data = vec![0i64; 4];
    assert!(matches!(
        files.read_chunk(&chunks[0], &mut data),
        Err(RedistributeError::Truncated { expected: 4, found: 2, .. })
    ));
}
