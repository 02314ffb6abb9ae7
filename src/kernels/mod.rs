//! Raw kernel implementations
//!
//! Every kernel is an `unsafe fn` over raw pointers plus explicit extents,
//! launched with a [`LaunchConfig`](crate::runtime::launch::LaunchConfig)
//! (the random kernels use the stream-bank width instead). Nothing here
//! validates arguments; see [`crate::runtime::KernelClient`] for the checked
//! entry points.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod binary;
pub mod broadcast;
pub mod compare;
pub mod random;
pub mod reduce;
pub mod scalar;
pub mod slice;
pub mod sparse;
pub mod transpose;
pub mod unary;

// Re-export all kernel functions for convenient access
pub use binary::binary_op_kernel;
pub use broadcast::broadcast_vector_kernel;
pub use compare::{compare_op_kernel, compare_scalar_kernel};
pub use random::{
    add_gaussian_noise_kernel, random_gaussian_kernel, random_uniform_kernel, seed_random_kernel,
};
pub use reduce::{columnwise_reduce_kernel, softmax_kernel};
pub use scalar::{assign_scalar_kernel, scalar_op_kernel};
pub use slice::{
    get_row_slice_kernel, select_rows_kernel, set_row_slice_kernel, set_selected_rows_kernel,
};
pub use sparse::{sparse_dense_dot_kernel, sparse_dense_elementwise_mul_kernel};
pub use transpose::transpose_kernel;
pub use unary::unary_op_kernel;
