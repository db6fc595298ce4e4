use mpi::{environment::Universe, traits::Communicator};
use redistribute::{partition::local_range, permute, scatter, ExchangePlan};

// Indices of the last element of the previous rank, the first element of the next rank and
// the middle element of this rank, with three elements per rank.
fn neighbour_idxs(rank: usize, size: usize) -> Vec<usize> {
    let prev = if rank == 0 { size - 1 } else { rank - 1 };
    vec![prev * 3 + 2, ((rank + 1) % size) * 3, rank * 3 + 1]
}

/// Test fetching elements from the neighbouring ranks
fn test_neighbours<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let idxs = neighbour_idxs(rank, size);
    let data = (0..3).map(|i| (rank * 3 + i) as i32).collect::<Vec<_>>();
    let data = permute(comm, size * 3, &idxs, data);

    assert_eq!(data.len(), 3);
    for (d, i) in data.iter().zip(&idxs) {
        assert_eq!(*d as usize, *i);
    }
}

/// Test that applying a permutation and then its inverse restores the data
fn test_round_trip<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    // Rotate by 7 and then back.
    let n_elems = 5 * size + 3;
    let range = local_range(n_elems, size, rank);
    let original = range.clone().map(|i| (i * 10) as u64).collect::<Vec<_>>();

    let forward = range.clone().map(|i| (i + 7) % n_elems).collect::<Vec<_>>();
    let backward = range
        .clone()
        .map(|i| (i + n_elems - 7) % n_elems)
        .collect::<Vec<_>>();

    let rotated = permute(comm, n_elems, &forward, original.clone());
    for (r, i) in rotated.iter().zip(&forward) {
        assert_eq!(*r, (*i * 10) as u64);
    }
    let restored = permute(comm, n_elems, &backward, rotated);
    assert_eq!(restored, original);
}

/// Test repeated indices and ranks that request nothing
fn test_duplicates_and_empty<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let n_elems = 2 * size;
    let data = local_range(n_elems, size, rank)
        .map(|i| i as f64 * 0.5)
        .collect::<Vec<_>>();

    // Only odd ranks ask for anything, and then for the same two elements several times.
    let idxs = if rank % 2 == 1 {
        vec![0, n_elems - 1, 0, 0, n_elems - 1]
    } else {
        vec![]
    };
    let result = scatter(comm, n_elems, &idxs, &data);
    assert_eq!(result.len(), idxs.len());
    for (r, i) in result.iter().zip(&idxs) {
        assert_eq!(*r, *i as f64 * 0.5);
    }
}

/// Test reusing one plan for several arrays
fn test_plan_reuse<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let n_elems = 4 * size;
    let range = local_range(n_elems, size, rank);
    let idxs = range.clone().rev().map(|i| n_elems - 1 - i).collect::<Vec<_>>();
    let plan = ExchangePlan::new(comm, n_elems, &idxs);
    assert_eq!(plan.n_requested(), idxs.len());

    let ids = range.clone().map(|i| i as u32).collect::<Vec<_>>();
    let squares = range.map(|i| (i * i) as u64).collect::<Vec<_>>();
    let ids = plan.scatter(&ids);
    let squares = plan.scatter(&squares);
    for ((id, sq), i) in ids.iter().zip(&squares).zip(&idxs) {
        assert_eq!(*id as usize, *i);
        assert_eq!(*sq as usize, i * i);
    }
}

/// Test permuting an array with no elements
fn test_empty_array<C: Communicator>(comm: &C) {
    let data = permute::<u64, _>(comm, 0, &[], vec![]);
    assert!(data.is_empty());

    let plan = ExchangePlan::new(comm, 0, &[]);
    assert_eq!(plan.n_local_elems(), 0);
    assert_eq!(plan.n_requested(), 0);
    assert_eq!(plan.n_served(), 0);
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing permutation with neighbours");
    }
    test_neighbours(&world);
    if rank == 0 {
        println!("Testing permutation round trip");
    }
    test_round_trip(&world);
    if rank == 0 {
        println!("Testing duplicate indices and empty requests");
    }
    test_duplicates_and_empty(&world);
    if rank == 0 {
        println!("Testing plan reuse");
    }
    test_plan_reuse(&world);
    if rank == 0 {
        println!("Testing permutation of an empty array");
    }
    test_empty_array(&world);
}
