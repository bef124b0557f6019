//! Times insert/search/update/delete batches and prints CSV.
//!
//! ```text
//! cargo run --release --example benchmark_csv -- [OUTPUT.csv] [SIZE...]
//! ```
//!
//! Without an output path the CSV goes to stdout. Sizes default to
//! 100, 500 and 1000. `AVL_SEED` fixes the random contacts.

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};

use avl_store::workload::{self, BenchConfig};

fn main() -> io::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args.next().filter(|p| p != "-");
    let sizes: Vec<usize> = args
        .map(|s| {
            s.parse()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("size {s:?}: {e}")))
        })
        .collect::<io::Result<_>>()?;

    let mut config = BenchConfig::default();
    if !sizes.is_empty() {
        config.sizes = sizes;
    }
    config.seed = env::var("AVL_SEED").ok().and_then(|s| s.parse().ok());

    let timings = workload::run(&config);
    match path {
        Some(path) => {
            workload::write_csv(BufWriter::new(File::create(&path)?), &timings)?;
            log::info!("wrote {} rows to {path}", timings.len());
        }
        None => workload::write_csv(io::stdout().lock(), &timings)?,
    }
    Ok(())
}
