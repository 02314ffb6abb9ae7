//! Host parallelism configuration
//!
//! Controls how many worker threads execute kernel blocks and how many
//! blocks each rayon task takes. Defaults defer to rayon's global pool.

use log::warn;

/// Environment variable overriding the worker thread count
pub const ENV_NUM_THREADS: &str = "LANEMAT_NUM_THREADS";

/// Environment variable overriding the minimum blocks per rayon task
pub const ENV_CHUNK_SIZE: &str = "LANEMAT_CHUNK_SIZE";

/// Worker-pool settings for a [`super::KernelClient`]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Dedicated pool size; `None` uses the global rayon pool
    pub num_threads: Option<usize>,
    /// Minimum blocks per rayon task; `None` means 1
    pub chunk_size: Option<usize>,
}

impl ParallelismConfig {
    /// Create a configuration. Zero values are treated as unset.
    pub fn new(num_threads: Option<usize>, chunk_size: Option<usize>) -> Self {
        Self {
            num_threads: num_threads.filter(|&n| n > 0),
            chunk_size: chunk_size.filter(|&n| n > 0),
        }
    }

    /// Read `LANEMAT_NUM_THREADS` / `LANEMAT_CHUNK_SIZE` from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, config file, test map)
    ///
    /// Unparseable or zero values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| -> Option<usize> {
            let raw = lookup(key)?;
            match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => {
                    warn!("ignoring {key}={raw:?}: expected a positive integer");
                    None
                }
                Ok(n) => Some(n),
            }
        };
        Self::new(parse(ENV_NUM_THREADS), parse(ENV_CHUNK_SIZE))
    }

    /// Minimum blocks per rayon task
    #[inline]
    pub fn min_len(&self) -> usize {
        self.chunk_size.unwrap_or(1)
    }
}
