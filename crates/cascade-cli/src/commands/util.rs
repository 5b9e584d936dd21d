use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rayon::ThreadPoolBuilder;
use tracing::info;

/// Size the global rayon pool used by ensembles ("auto" means one thread per core).
pub fn configure_threads(threads: &str) {
    let count = if threads.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        threads.parse().unwrap_or_else(|_| num_cpus::get())
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}

/// Use the configured RNG seed, or draw one and log it so the run can be repeated.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!(rng_seed = seed, "no RNG seed configured; drew one");
            seed
        }
    }
}

/// Buffered writer for `path`, or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file '{}'", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
