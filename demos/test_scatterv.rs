use mpi::{environment::Universe, traits::Communicator};
use redistribute::{partition::local_range, permutev, scatterv, CsrArray};

// Three elements per rank, of one, two and three entries. Entry `k` on rank `r` is `6r + k`.
fn local_array(rank: usize) -> (Vec<usize>, Vec<i32>) {
    let displs = vec![0, 1, 3, 6];
    let data = (0..6).map(|k| (rank * 6 + k) as i32).collect();
    (displs, data)
}

/// Test gathering variable length elements from the neighbouring ranks
fn test_neighbours<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let prev = if rank == 0 { size - 1 } else { rank - 1 };
    let idxs = [prev * 3 + 2, ((rank + 1) % size) * 3, rank * 3 + 1];
    let (displs, data) = local_array(rank);

    let result = scatterv(comm, size * 3, &displs, &idxs, &data);

    assert_eq!(result.displs(), &[0, 3, 4, 6]);
    let i = idxs.map(|i| i as i32);
    assert_eq!(
        result.data(),
        &[
            i[0] * 2 - 1,
            i[0] * 2,
            i[0] * 2 + 1,
            i[1] * 2,
            i[2] * 2 - 1,
            i[2] * 2
        ]
    );
}

/// Test gathering every element on every rank
fn test_all<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let idxs = (0..size * 3).collect::<Vec<_>>();
    let (displs, data) = local_array(rank);

    let result = scatterv(comm, size * 3, &displs, &idxs, &data);

    assert_eq!(result.len(), idxs.len());
    assert_eq!(result.displs()[idxs.len()], 6 * size);
    for (n, element) in result.iter().enumerate() {
        let owner = n / 3;
        let expected = match n % 3 {
            0 => vec![owner * 6],
            1 => vec![owner * 6 + 1, owner * 6 + 2],
            _ => vec![owner * 6 + 3, owner * 6 + 4, owner * 6 + 5],
        };
        assert_eq!(
            element,
            expected.iter().map(|&e| e as i32).collect::<Vec<_>>()
        );
    }
}

/// Test reversing an array of variable length elements
fn test_permutev_reverse<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    // Element `i` has `i % 4` entries, all equal to `i`.
    let n_elems = 3 * size + 2;
    let range = local_range(n_elems, size, rank);
    let counts = range.clone().map(|i| i % 4).collect::<Vec<_>>();
    let data = range
        .clone()
        .flat_map(|i| std::iter::repeat(i as u64).take(i % 4))
        .collect::<Vec<_>>();
    let array = CsrArray::from_counts(data, &counts);

    let idxs = range.map(|i| n_elems - 1 - i).collect::<Vec<_>>();
    let array = permutev(comm, n_elems, &idxs, array);

    assert_eq!(array.len(), idxs.len());
    for (element, i) in array.iter().zip(&idxs) {
        assert_eq!(element.len(), i % 4);
        assert!(element.iter().all(|&e| e as usize == *i));
    }
}

/// Test ranks that request nothing
fn test_empty_requests<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let (displs, data) = local_array(rank);
    let idxs = if rank == 0 { vec![size * 3 - 1] } else { vec![] };

    let result = scatterv(comm, size * 3, &displs, &idxs, &data);
    if rank == 0 {
        let last = ((size - 1) * 6) as i32;
        assert_eq!(result.displs(), &[0, 3]);
        assert_eq!(result.data(), &[last + 3, last + 4, last + 5]);
    } else {
        assert!(result.is_empty());
        assert_eq!(result.displs(), &[0]);
    }
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing scatterv with neighbours");
    }
    test_neighbours(&world);
    if rank == 0 {
        println!("Testing scatterv to all");
    }
    test_all(&world);
    if rank == 0 {
        println!("Testing permutev");
    }
    test_permutev_reverse(&world);
    if rank == 0 {
        println!("Testing scatterv with empty requests");
    }
    test_empty_requests(&world);
}
