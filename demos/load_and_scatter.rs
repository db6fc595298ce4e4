//! Gather the particle ids of every galaxy.
//!
//! The particle ids are loaded as a distributed array. The halos are then loaded as ranges
//! of particle ids and the ids are permuted so that each rank holds the particles of the
//! halos it loaded. Finally the galaxies are loaded, each naming its halo, and the particle
//! ids of each halo are permuted into galaxy order.
//!
//! Usage: `load_and_scatter [CONFIG]`, where `CONFIG` is a RON file as written by
//! `gen_files`.
use mpi::{
    collective::SystemOperation,
    environment::Universe,
    traits::{Communicator, CommunicatorCollectives},
};
use redistribute::{
    config::PipelineConfig, io::TextFiles, permute, permutev, traits::ChunkSource, CsrArray,
    FileLoader, RedistributeError,
};

fn main() -> Result<(), RedistributeError> {
    env_logger::init();
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    let filename = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("pipeline.ron"));
    let config = PipelineConfig::import_from_ron(&filename)?;

    // Particle ids, evenly spread whatever the layout of the files.
    let mut pids_files = TextFiles::<u64>::new(config.pids.clone());
    let mut fl = FileLoader::new(&world, config.pids.n_files);
    fl.try_collect_sizes(|file| pids_files.element_count(file))?;
    let n_pids = fl.n_elems();
    let mut pids = vec![0u64; fl.n_local_elems()];
    fl.try_load_into(&mut pids, 1, |chunk, dest| pids_files.read_chunk(chunk, dest))?;

    // Halos as [begin, end) ranges of particles.
    let mut halos_files = TextFiles::<u64>::new(config.halos.clone());
    let halos = FileLoader::load_from(&world, &mut halos_files)?;

    // Convert the ranges to the particle indices of the local halos.
    let counts = halos
        .chunks(2)
        .map(|r| (r[1] - r[0]) as usize)
        .collect::<Vec<_>>();
    let idxs = halos
        .chunks(2)
        .flat_map(|r| (r[0] as usize)..(r[1] as usize))
        .collect::<Vec<_>>();
    let pids = permute(&world, n_pids, &idxs, pids);
    let halo_pids = CsrArray::from_counts(pids, &counts);

    // Galaxies name their halo.
    let n_local_halos = halo_pids.len() as u64;
    let mut n_halos = 0u64;
    world.all_reduce_into(&n_local_halos, &mut n_halos, SystemOperation::sum());
    let n_halos = n_halos as usize;
    let mut gals_files = TextFiles::<u64>::new(config.gals.clone());
    let gals = FileLoader::load_from(&world, &mut gals_files)?
        .into_iter()
        .map(|h| h as usize)
        .collect::<Vec<_>>();
    let gal_pids = permutev(&world, n_halos, &gals, halo_pids);

    println!(
        "Rank {rank}: {} galaxies with {} particles",
        gal_pids.len(),
        gal_pids.data().len()
    );
    if rank == 0 {
        if let Some(first) = gal_pids.iter().next() {
            println!("First galaxy particles: {first:?}");
        }
    }
    Ok(())
}
