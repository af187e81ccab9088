//! Resolves config arrays ahead of the workers that need them.

use std::path::PathBuf;

use lintpool_host::ConfigLoader;
use rayon::prelude::*;
use tracing::debug;

use crate::abort::AbortController;

/// Loads the config array of every file into `loader`'s cache, at most
/// `max_concurrency` at a time. Stops starting new files once `abort`
/// fires. Failures are left for the workers to report.
pub fn prewarm_configs(
    loader: &ConfigLoader,
    file_paths: &[PathBuf],
    max_concurrency: usize,
    abort: &AbortController,
) {
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(max_concurrency.max(1))
        .thread_name(|index| format!("lintpool-prewarm-{index}"))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            debug!("Config pre-warm skipped: {}", e);
            return;
        }
    };

    pool.install(|| {
        file_paths.par_iter().for_each(|path| {
            if abort.is_aborted() {
                return;
            }
            if let Err(e) = loader.load_config_array_for_file(path) {
                debug!("Pre-warming config for {} failed: {}", path.display(), e);
            }
        });
    });
}
