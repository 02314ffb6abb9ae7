//! C-callable kernel surface
//!
//! Every entry point takes raw buffer addresses, explicit extents and (for
//! the launched kernels) a [`LanematLaunch`] geometry. Extents and buffer
//! capacities are trusted; the only checks are for null buffers and for
//! launches without lanes. Enable with the `ffi` feature flag.
//!
//! ```c
//! #include "lanemat.h"
//! lanemat_seed_random(42, mults, words, n_streams);
//! lanemat_random_gaussian(mults, words, n_streams, buf, len);
//! LanematLaunch launch = { {16, 1, 1}, {256, 1, 1} };
//! lanemat_apply_sigmoid(launch, buf, buf, len);
//! ```

#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::too_many_arguments)]

use crate::kernels;
use crate::ops::{BinaryOp, BroadcastOp, ColumnReduceOp, CompareOp, UnaryOp, VectorAxis};
use crate::runtime::{Dim3, LaunchConfig};

/// Kernel ran
pub const LANEMAT_OK: i32 = 0;
/// A required buffer pointer was null
pub const LANEMAT_ERR_NULL_POINTER: i32 = 1;
/// The launch geometry has no lanes, or a row extent is zero
pub const LANEMAT_ERR_INVALID_LAUNCH: i32 = 2;

/// Launch geometry as passed across the C boundary
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LanematLaunch {
    /// Blocks along each axis
    pub grid: Dim3,
    /// Threads per block along each axis
    pub block: Dim3,
}

impl LanematLaunch {
    fn config(self) -> Option<LaunchConfig> {
        let cfg = LaunchConfig::new(self.grid, self.block);
        cfg.is_runnable().then_some(cfg)
    }
}

macro_rules! require {
    ($($ptr:expr),+ $(,)?) => {
        if $($ptr.is_null())||+ {
            return LANEMAT_ERR_NULL_POINTER;
        }
    };
}

macro_rules! launch_or_fail {
    ($launch:expr) => {
        match $launch.config() {
            Some(cfg) => cfg,
            None => return LANEMAT_ERR_INVALID_LAUNCH,
        }
    };
}

// ============================================================================
// Random
// ============================================================================

/// Seed `num_streams` generator words from `seed` and run the burn-in
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_seed_random(
    seed: u32,
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
) -> i32 {
    require!(mults, words);
    kernels::seed_random_kernel(seed, mults, words, num_streams);
    LANEMAT_OK
}

/// Fill `out[numel]` with uniform samples in (0, 1]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_random_uniform(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    out: *mut f32,
    numel: usize,
) -> i32 {
    require!(mults, words, out);
    kernels::random_uniform_kernel(mults, words, num_streams, out, numel);
    LANEMAT_OK
}

/// Fill `out[numel]` with standard normal samples
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_random_gaussian(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    out: *mut f32,
    numel: usize,
) -> i32 {
    require!(mults, words, out);
    kernels::random_gaussian_kernel(mults, words, num_streams, out, numel);
    LANEMAT_OK
}

/// `out[i] = mat[i] + stddev * N(0, 1)`; `out` may equal `mat`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_add_gaussian_noise(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    mat: *const f32,
    out: *mut f32,
    numel: usize,
    stddev: f32,
) -> i32 {
    require!(mults, words, mat, out);
    kernels::add_gaussian_noise_kernel(mults, words, num_streams, mat, out, numel, stddev);
    LANEMAT_OK
}

// ============================================================================
// Element-wise
// ============================================================================

macro_rules! ffi_unary {
    ($($name:ident => $op:expr),+ $(,)?) => {$(
        #[doc = concat!("`out[i] = ", stringify!($op), "(a[i])`")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            launch: LanematLaunch,
            a: *const f32,
            out: *mut f32,
            len: usize,
        ) -> i32 {
            require!(a, out);
            let cfg = launch_or_fail!(launch);
            kernels::unary_op_kernel(&cfg, $op, a, out, len);
            LANEMAT_OK
        }
    )+};
}

ffi_unary! {
    lanemat_apply_log => UnaryOp::Log,
    lanemat_apply_exp => UnaryOp::Exp,
    lanemat_apply_sqrt => UnaryOp::Sqrt,
    lanemat_reciprocal => UnaryOp::Recip,
    lanemat_apply_sigmoid => UnaryOp::Sigmoid,
    lanemat_apply_sign => UnaryOp::Sign,
    lanemat_apply_tanh => UnaryOp::Tanh,
    lanemat_apply_abs => UnaryOp::Abs,
    lanemat_apply_log_1_plus_exp => UnaryOp::Log1PlusExp,
}

macro_rules! ffi_binary {
    ($($name:ident => $op:expr),+ $(,)?) => {$(
        #[doc = concat!("`out[i] = ", stringify!($op), "(a[i], b[i])`")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            launch: LanematLaunch,
            a: *const f32,
            b: *const f32,
            out: *mut f32,
            len: usize,
        ) -> i32 {
            require!(a, b, out);
            let cfg = launch_or_fail!(launch);
            kernels::binary_op_kernel(&cfg, $op, a, b, out, len);
            LANEMAT_OK
        }
    )+};
}

ffi_binary! {
    lanemat_add_elementwise => BinaryOp::Add,
    lanemat_subtract_elementwise => BinaryOp::Sub,
    lanemat_mult_elementwise => BinaryOp::Mul,
    lanemat_divide_elementwise => BinaryOp::Div,
    lanemat_pow_matrix => BinaryOp::Pow,
    lanemat_minimum => BinaryOp::Min,
    lanemat_maximum => BinaryOp::Max,
}

macro_rules! ffi_scalar {
    ($($name:ident => $op:expr),+ $(,)?) => {$(
        #[doc = concat!("`out[i] = ", stringify!($op), "(a[i], scalar)`")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            launch: LanematLaunch,
            a: *const f32,
            scalar: f32,
            out: *mut f32,
            len: usize,
        ) -> i32 {
            require!(a, out);
            let cfg = launch_or_fail!(launch);
            kernels::scalar_op_kernel(&cfg, $op, a, scalar, out, len);
            LANEMAT_OK
        }
    )+};
}

ffi_scalar! {
    lanemat_add_scalar => BinaryOp::Add,
    lanemat_sub_scalar => BinaryOp::Sub,
    lanemat_mult_by_scalar => BinaryOp::Mul,
    lanemat_divide_by_scalar => BinaryOp::Div,
    lanemat_apply_pow => BinaryOp::Pow,
    lanemat_minimum_scalar => BinaryOp::Min,
    lanemat_maximum_scalar => BinaryOp::Max,
}

/// `out[i] = value`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_assign_scalar(
    launch: LanematLaunch,
    out: *mut f32,
    value: f32,
    len: usize,
) -> i32 {
    require!(out);
    let cfg = launch_or_fail!(launch);
    kernels::assign_scalar_kernel(&cfg, out, value, len);
    LANEMAT_OK
}

macro_rules! ffi_compare {
    ($($name:ident, $scalar_name:ident => $op:expr),+ $(,)?) => {$(
        #[doc = concat!("`out[i] = ", stringify!($op), "(a[i], b[i]) ? 1 : 0`")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            launch: LanematLaunch,
            a: *const f32,
            b: *const f32,
            out: *mut f32,
            len: usize,
        ) -> i32 {
            require!(a, b, out);
            let cfg = launch_or_fail!(launch);
            kernels::compare_op_kernel(&cfg, $op, a, b, out, len);
            LANEMAT_OK
        }

        #[doc = concat!("`out[i] = ", stringify!($op), "(a[i], scalar) ? 1 : 0`")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $scalar_name(
            launch: LanematLaunch,
            a: *const f32,
            scalar: f32,
            out: *mut f32,
            len: usize,
        ) -> i32 {
            require!(a, out);
            let cfg = launch_or_fail!(launch);
            kernels::compare_scalar_kernel(&cfg, $op, a, scalar, out, len);
            LANEMAT_OK
        }
    )+};
}

ffi_compare! {
    lanemat_less_than, lanemat_less_than_scalar => CompareOp::Lt,
    lanemat_greater_than, lanemat_greater_than_scalar => CompareOp::Gt,
    lanemat_equals, lanemat_equals_scalar => CompareOp::Eq,
}

/// Shared body of the broadcast entry points
unsafe fn broadcast(
    launch: LanematLaunch,
    op: BroadcastOp,
    axis: VectorAxis,
    mat: *const f32,
    vec: *const f32,
    out: *mut f32,
    width: usize,
    height: usize,
) -> i32 {
    require!(mat, vec, out);
    let cfg = launch_or_fail!(launch);
    kernels::broadcast_vector_kernel(&cfg, op, axis, mat, vec, out, width, height);
    LANEMAT_OK
}

macro_rules! ffi_broadcast {
    ($($name:ident => $op:expr, $axis:expr),+ $(,)?) => {$(
        #[doc = concat!("`out = ", stringify!($op), "` with a ", stringify!($axis), " vector")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            launch: LanematLaunch,
            mat: *const f32,
            vec: *const f32,
            out: *mut f32,
            width: usize,
            height: usize,
        ) -> i32 {
            broadcast(launch, $op, $axis, mat, vec, out, width, height)
        }
    )+};
}

ffi_broadcast! {
    lanemat_add_col_vector => BroadcastOp::Add, VectorAxis::Column,
    lanemat_add_row_vector => BroadcastOp::Add, VectorAxis::Row,
    lanemat_mult_by_col_vector => BroadcastOp::Mul, VectorAxis::Column,
    lanemat_mult_by_row_vector => BroadcastOp::Mul, VectorAxis::Row,
}

/// `out = mat + mult * vec[i % height]`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_add_col_mult(
    launch: LanematLaunch,
    mat: *const f32,
    vec: *const f32,
    out: *mut f32,
    mult: f32,
    width: usize,
    height: usize,
) -> i32 {
    let op = BroadcastOp::AddMult(mult);
    broadcast(launch, op, VectorAxis::Column, mat, vec, out, width, height)
}

/// `out = mat + mult * vec[i / height]`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_add_row_mult(
    launch: LanematLaunch,
    mat: *const f32,
    vec: *const f32,
    out: *mut f32,
    mult: f32,
    width: usize,
    height: usize,
) -> i32 {
    let op = BroadcastOp::AddMult(mult);
    broadcast(launch, op, VectorAxis::Row, mat, vec, out, width, height)
}

// ============================================================================
// Reductions
// ============================================================================

macro_rules! ffi_columnwise {
    ($($name:ident => $op:expr),+ $(,)?) => {$(
        #[doc = concat!("`out[c] = ", stringify!($op), "` over column `c`")]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(
            launch: LanematLaunch,
            mat: *const f32,
            out: *mut f32,
            width: usize,
            height: usize,
        ) -> i32 {
            require!(mat, out);
            let cfg = launch_or_fail!(launch);
            kernels::columnwise_reduce_kernel(&cfg, $op, mat, out, width, height);
            LANEMAT_OK
        }
    )+};
}

ffi_columnwise! {
    lanemat_columnwise_max => ColumnReduceOp::Max,
    lanemat_columnwise_min => ColumnReduceOp::Min,
    lanemat_columnwise_sum => ColumnReduceOp::Sum,
    lanemat_columnwise_argmax => ColumnReduceOp::Argmax,
}

/// Row softmax of a row-major buffer, `width` entries per row
///
/// `width == 0` returns [`LANEMAT_ERR_INVALID_LAUNCH`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_softmax(
    launch: LanematLaunch,
    a: *const f32,
    out: *mut f32,
    width: usize,
    len: usize,
) -> i32 {
    require!(a, out);
    let cfg = launch_or_fail!(launch);
    if width == 0 {
        return LANEMAT_ERR_INVALID_LAUNCH;
    }
    kernels::softmax_kernel(&cfg, a, out, width, len);
    LANEMAT_OK
}

// ============================================================================
// Layout
// ============================================================================

/// Transpose a `height x width` matrix into `out`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_transpose(
    launch: LanematLaunch,
    a: *const f32,
    out: *mut f32,
    height: usize,
    width: usize,
) -> i32 {
    require!(a, out);
    let cfg = launch_or_fail!(launch);
    kernels::transpose_kernel(&cfg, a, out, height, width);
    LANEMAT_OK
}

/// Copy rows `[start, end)` of `source` into `target`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_get_row_slice(
    launch: LanematLaunch,
    source: *const f32,
    target: *mut f32,
    start: usize,
    end: usize,
    width: usize,
    height: usize,
) -> i32 {
    require!(source, target);
    let cfg = launch_or_fail!(launch);
    kernels::get_row_slice_kernel(&cfg, source, target, start, end, width, height);
    LANEMAT_OK
}

/// Write `source` into rows `[start, end)` of `target`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_set_row_slice(
    launch: LanematLaunch,
    source: *const f32,
    target: *mut f32,
    start: usize,
    end: usize,
    width: usize,
    height: usize,
) -> i32 {
    require!(source, target);
    let cfg = launch_or_fail!(launch);
    kernels::set_row_slice_kernel(&cfg, source, target, start, end, width, height);
    LANEMAT_OK
}

/// Gather rows `indices[0..num_indices]` of `source` into `target`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_select_rows(
    launch: LanematLaunch,
    source: *const f32,
    target: *mut f32,
    indices: *const f32,
    num_indices: usize,
    width: usize,
    height: usize,
) -> i32 {
    require!(source, target, indices);
    let cfg = launch_or_fail!(launch);
    kernels::select_rows_kernel(&cfg, source, target, indices, num_indices, width, height);
    LANEMAT_OK
}

/// Scatter the rows of `source` to rows `indices[0..num_indices]` of `target`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_set_selected_rows(
    launch: LanematLaunch,
    source: *const f32,
    target: *mut f32,
    indices: *const f32,
    num_indices: usize,
    width: usize,
    height: usize,
) -> i32 {
    require!(source, target, indices);
    let cfg = launch_or_fail!(launch);
    kernels::set_selected_rows_kernel(&cfg, source, target, indices, num_indices, width, height);
    LANEMAT_OK
}

// ============================================================================
// Sparse (float-encoded indices)
// ============================================================================

/// `out = alpha * (S . dense) + beta * out` with `S` in CSR form
///
/// `rows` is the sparse row count (`ptr` holds `rows + 1` offsets).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_sparse_dense_dot(
    launch: LanematLaunch,
    data: *const f32,
    indices: *const f32,
    ptr: *const f32,
    rows: usize,
    dense: *const f32,
    k: usize,
    n: usize,
    out: *mut f32,
    alpha: f32,
    beta: f32,
) -> i32 {
    require!(data, indices, ptr, dense, out);
    let cfg = launch_or_fail!(launch);
    kernels::sparse_dense_dot_kernel(&cfg, data, indices, ptr, rows, dense, k, n, out, alpha, beta);
    LANEMAT_OK
}

/// `out[r, c] = dense[r, c] * S[r, c]` at the stored nonzeros of `S`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lanemat_sparse_dense_elementwise_mul(
    launch: LanematLaunch,
    data: *const f32,
    indices: *const f32,
    ptr: *const f32,
    rows: usize,
    dense: *const f32,
    out: *mut f32,
) -> i32 {
    require!(data, indices, ptr, dense, out);
    let cfg = launch_or_fail!(launch);
    kernels::sparse_dense_elementwise_mul_kernel(&cfg, data, indices, ptr, rows, dense, out);
    LANEMAT_OK
}
