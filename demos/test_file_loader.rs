use mpi::{
    environment::Universe,
    traits::{Communicator, CommunicatorCollectives},
};
use redistribute::{
    config::Dataset,
    io::{read_header, read_records, TextFiles},
    loader::LoaderState,
    partition::local_range,
    FileLoader,
};

// Write files holding the global indices 0..n, split over files of the given sizes.
fn write_files<C: Communicator>(comm: &C, dataset: &Dataset, file_elems: &[usize]) {
    if comm.rank() == 0 {
        let files = TextFiles::<u64>::new(dataset.clone());
        let mut start = 0;
        for (i, n) in file_elems.iter().enumerate() {
            let values = (start..start + n)
                .flat_map(|e| (0..dataset.width).map(move |w| (e * dataset.width + w) as u64))
                .collect::<Vec<_>>();
            files.write_file(i, &values).unwrap();
            start += n;
        }
    }
    comm.barrier();
}

/// Test the step by step loading interface
fn test_steps<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let file_elems = [4, 0, 9, 1, 6];
    let dataset = Dataset::new("_test_file_loader_steps", file_elems.len());
    write_files(comm, &dataset, &file_elems);

    let mut fl = FileLoader::new(comm, dataset.n_files);
    assert_eq!(fl.state(), LoaderState::CollectingSizes { file: 0 });
    while !fl.init_done() {
        let n = read_header(&dataset.file_path(fl.init_file_index())).unwrap();
        fl.set_file_elems(n);
        fl.init_next();
    }
    assert_eq!(fl.state(), LoaderState::Planned);
    assert_eq!(fl.n_elems(), 20);

    let range = local_range(20, size, rank);
    assert_eq!(fl.n_local_elems(), range.len());
    assert_eq!(fl.elem_offset(), range.start);

    let mut data = vec![0u64; fl.n_local_elems()];
    fl.load_begin();
    while !fl.load_done() {
        let mut values = vec![0u64; fl.chunk_size()];
        read_records(
            &dataset.file_path(fl.chunk_file_index()),
            fl.chunk_offset(),
            1,
            &mut values,
        )
        .unwrap();
        for (k, v) in values.into_iter().enumerate() {
            data[fl.data_offset(k)] = v;
        }
        fl.load_next();
    }
    assert_eq!(fl.state(), LoaderState::Done);

    assert_eq!(data, range.map(|i| i as u64).collect::<Vec<_>>());
}

/// Test loading elements of several values through a chunk source
fn test_source<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let file_elems = [3, 7, 5];
    let dataset = Dataset::new("_test_file_loader_source", file_elems.len()).with_width(2);
    write_files(comm, &dataset, &file_elems);

    let mut files = TextFiles::<u64>::new(dataset);
    let data = FileLoader::load_from(comm, &mut files).unwrap();

    let range = local_range(15, size, rank);
    assert_eq!(
        data,
        range
            .flat_map(|e| [(2 * e) as u64, (2 * e + 1) as u64])
            .collect::<Vec<_>>()
    );
}

/// Test that a missing file is reported on every rank
fn test_missing_file<C: Communicator>(comm: &C) {
    let mut files = TextFiles::<u64>::new(Dataset::new("_test_file_loader_missing", 1));
    assert!(FileLoader::load_from(comm, &mut files).is_err());
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing step by step file loading");
    }
    test_steps(&world);
    if rank == 0 {
        println!("Testing file loading from a chunk source");
    }
    test_source(&world);
    if rank == 0 {
        println!("Testing file loading with a missing file");
    }
    test_missing_file(&world);
}
