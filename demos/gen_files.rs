//! Write synthetic input files for the `reverse` and `load_and_scatter` demos.
//!
//! Usage: `gen_files [N_PIDS] [N_FILES]`
use redistribute::{
    config::{Dataset, PipelineConfig},
    io::TextFiles,
};

// Split `values` (of `width` values per element) over `dataset.n_files` files of uneven size.
fn write_split(dataset: &Dataset, values: &[u64]) {
    let n_elems = values.len() / dataset.width;
    let weights = (0..dataset.n_files)
        .map(|i| (i * 7 + 3) % 11 + 1)
        .collect::<Vec<_>>();
    let total = weights.iter().sum::<usize>();

    let files = TextFiles::<u64>::new(dataset.clone());
    let mut start = 0;
    for (i, w) in weights.iter().enumerate() {
        let end = if i + 1 == dataset.n_files {
            n_elems
        } else {
            (start + n_elems * w / total).min(n_elems)
        };
        files
            .write_file(i, &values[start * dataset.width..end * dataset.width])
            .unwrap();
        start = end;
    }
    println!(
        "Wrote {n_elems} elements to {} files with prefix {}",
        dataset.n_files, dataset.prefix
    );
}

fn main() {
    let args = std::env::args().collect::<Vec<_>>();
    let n_pids = args.get(1).map_or(100, |a| a.parse::<usize>().unwrap());
    let n_files = args.get(2).map_or(4, |a| a.parse::<usize>().unwrap());
    assert!(n_files > 0);

    // Global indices, for `reverse`.
    let values = (0..n_pids as u64).collect::<Vec<_>>();
    write_split(&Dataset::new("test_file", 8), &values);

    // Particle ids.
    let pids = Dataset::new("pids", n_files);
    let values = (0..n_pids as u64).map(|p| 1000 + 3 * p).collect::<Vec<_>>();
    write_split(&pids, &values);

    // Halos own consecutive ranges of between one and five particles.
    let halos = Dataset::new("halos", n_files.div_ceil(2)).with_width(2);
    let mut ranges = vec![];
    let mut begin = 0;
    while begin < n_pids {
        let end = (begin + ranges.len() / 2 % 5 + 1).min(n_pids);
        ranges.extend([begin as u64, end as u64]);
        begin = end;
    }
    write_split(&halos, &ranges);

    // One galaxy per halo, in reverse halo order.
    let gals = Dataset::new("gals", n_files + 1);
    let n_halos = ranges.len() / 2;
    let values = (0..n_halos as u64).rev().collect::<Vec<_>>();
    write_split(&gals, &values);

    let config = PipelineConfig { pids, halos, gals };
    std::fs::write("pipeline.ron", config.to_ron_string().unwrap()).unwrap();
    println!("Wrote pipeline.ron");
}
