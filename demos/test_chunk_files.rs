use mpi::{environment::Universe, traits::Communicator};
use redistribute::{chunk_files, partition::local_range, Chunk};

fn c(file: usize, offset: usize, len: usize) -> Chunk {
    Chunk::new(file, offset, len)
}

/// Test chunking of three files with known results
fn test_three_files<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let chunks = chunk_files(comm, &[3, 7, 5]);

    let expected = match (size, rank) {
        (1, _) => Some(vec![c(0, 0, 3), c(1, 0, 7), c(2, 0, 5)]),
        (2, 0) => Some(vec![c(0, 0, 3), c(1, 0, 5)]),
        (2, _) => Some(vec![c(1, 5, 2), c(2, 0, 5)]),
        (3, 0) => Some(vec![c(0, 0, 3), c(1, 0, 2)]),
        (3, 1) => Some(vec![c(1, 2, 5)]),
        (3, _) => Some(vec![c(2, 0, 5)]),
        (4, 0) => Some(vec![c(0, 0, 3), c(1, 0, 1)]),
        (4, 1) => Some(vec![c(1, 1, 4)]),
        (4, 2) => Some(vec![c(1, 5, 2), c(2, 0, 2)]),
        (4, _) => Some(vec![c(2, 2, 3)]),
        _ => None,
    };
    if let Some(expected) = expected {
        assert_eq!(chunks, expected);
    }

    // Whatever the number of ranks, the chunks hold the local range.
    let n_local = chunks.iter().map(|c| c.len).sum::<usize>();
    assert_eq!(n_local, local_range(15, size, rank).len());
}

/// Test chunking when there are more ranks than elements
fn test_few_elements<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let chunks = chunk_files(comm, &[0, 1, 0, 1]);
    let n_local = chunks.iter().map(|c| c.len).sum::<usize>();
    assert_eq!(n_local, local_range(2, size, rank).len());
    assert!(chunks.iter().all(|c| c.len > 0));
}

/// Test chunking of no files
fn test_no_files<C: Communicator>(comm: &C) {
    assert!(chunk_files(comm, &[]).is_empty());
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing chunking of three files");
    }
    test_three_files(&world);
    if rank == 0 {
        println!("Testing chunking of files with few elements");
    }
    test_few_elements(&world);
    if rank == 0 {
        println!("Testing chunking of no files");
    }
    test_no_files(&world);
}
