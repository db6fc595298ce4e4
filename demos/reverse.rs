//! Load the files written by `gen_files`, rotate the array by ten places and print it.
use mpi::{
    collective::SystemOperation,
    datatype::PartitionMut,
    environment::Universe,
    traits::{Communicator, CommunicatorCollectives, Root},
};
use redistribute::{config::Dataset, io::TextFiles, partition::local_range, permute, FileLoader};

fn main() {
    env_logger::init();
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank() as usize;
    let size = world.size() as usize;

    let mut files = TextFiles::<u64>::new(Dataset::new("test_file", 8));
    let data = FileLoader::load_from(&world, &mut files).unwrap();

    // The permuted array keeps the partition of the loaded one.
    let n_local_elems = data.len() as u64;
    let mut n_elems = 0u64;
    world.all_reduce_into(&n_local_elems, &mut n_elems, SystemOperation::sum());
    let n_elems = n_elems as usize;
    if n_elems == 0 {
        if rank == 0 {
            println!("No elements to rotate");
        }
        return;
    }
    let idxs = local_range(n_elems, size, rank)
        .map(|i| (i + 10) % n_elems)
        .collect::<Vec<_>>();
    let data = permute(&world, n_elems, &idxs, data);

    let root = world.process_at_rank(0);
    let n_local = data.len() as i32;
    if rank == 0 {
        let mut counts = vec![0i32; size];
        root.gather_into_root(&n_local, &mut counts[..]);
        let displs = counts
            .iter()
            .scan(0, |acc, &n| {
                let old = *acc;
                *acc += n;
                Some(old)
            })
            .collect::<Vec<_>>();
        let mut all_data = vec![0u64; n_elems];
        let mut partition = PartitionMut::new(&mut all_data[..], counts, displs);
        root.gather_varcount_into_root(&data[..], &mut partition);

        let line = all_data
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
    } else {
        root.gather_into(&n_local);
        root.gather_varcount_into(&data[..]);
    }
}
