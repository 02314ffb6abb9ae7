//! Host execution of the lanemat kernels
//!
//! # Architecture
//!
//! ```text
//! KernelClient (checked dispatch, owns the stream bank)
//! ├── ParallelismConfig (worker pool size, blocks per task)
//! └── launch (grid/block geometry, lane and block dispatch)
//! ```

mod client;
pub mod launch;
mod parallelism;

pub use client::KernelClient;
pub use launch::{Dim3, LaunchConfig};
pub use parallelism::{ENV_CHUNK_SIZE, ENV_NUM_THREADS, ParallelismConfig};
