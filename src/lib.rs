//! # lanemat
//!
//! **Lane-parallel dense and sparse matrix kernels.**
//!
//! lanemat is the computational layer beneath a matrix-object API: a set of
//! data-parallel kernels written against a CUDA-style launch geometry and
//! executed on host worker threads.
//!
//! ## Features
//!
//! - **Random**: per-lane multiply-with-carry streams, uniform and Gaussian fills
//! - **Element-wise ops**: unary maps, binary and scalar arithmetic, comparisons
//! - **Broadcasts**: row- and column-vector add/multiply, fused scale-and-add
//! - **Reductions**: columnwise max/min/sum/argmax, row softmax
//! - **Layout**: tiled transpose, row slices, row gather/scatter
//! - **Sparse**: CSR x dense products and masked element-wise products
//!
//! All dense matrices are column-major: element `(r, c)` of a
//! `height x width` matrix lives at `c * height + r`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lanemat::prelude::*;
//!
//! let client = KernelClient::new();
//! client.init_random(generate_multipliers(1024), 42)?;
//!
//! let mut w = vec![0.0f32; 3 * 2];
//! client.fill_with_randn(&mut w)?;
//!
//! let mut probs = vec![0.0f32; w.len()];
//! client.softmax(&w, &mut probs, 2)?;
//! ```
//!
//! ## Layers
//!
//! - [`kernels`]: raw `unsafe` kernels over pointers and extents, no checks
//! - [`runtime::KernelClient`]: validates extents, chooses geometry, logs
//! - [`ffi`]: C entry points over the raw kernels
//!
//! ## Feature Flags
//!
//! - `rayon` (default): run blocks on a rayon thread pool
//! - `ffi` (default): export the `lanemat_*` C symbols

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kernels;
pub mod ops;
pub mod random;
pub mod runtime;
pub mod sparse;

#[cfg(feature = "ffi")]
pub mod ffi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::ops::{BinaryOp, BroadcastOp, ColumnReduceOp, CompareOp, UnaryOp, VectorAxis};
    pub use crate::random::{StreamBank, generate_multipliers, load_multipliers};
    pub use crate::runtime::{KernelClient, LaunchConfig, ParallelismConfig};
    pub use crate::sparse::{CsrData, CsrIndex, CsrMatrix};
}
