//! Matrix-vector broadcast kernels
//!
//! Matrices are `height x width`, column-major. A column vector has
//! `height` entries and is read at `i % height`; a row vector has `width`
//! entries and is read at `i / height`. Vector length is a caller
//! precondition, not checked here.

use crate::ops::{BroadcastOp, VectorAxis};
use crate::runtime::launch::{LaunchConfig, for_each_index};

/// `out[i] = op(mat[i], vec[axis.vector_index(i, height)])`
///
/// # Safety
/// - `mat` and `out` must be valid pointers to `width * height` elements
/// - `vec` must be valid for `height` (column) or `width` (row) elements
/// - `height` must be non-zero when `width * height > 0`
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn broadcast_vector_kernel(
    cfg: &LaunchConfig,
    op: BroadcastOp,
    axis: VectorAxis,
    mat: *const f32,
    vec: *const f32,
    out: *mut f32,
    width: usize,
    height: usize,
) {
    let mat_addr = mat as usize;
    let vec_addr = vec as usize;
    let out_addr = out as usize;
    for_each_index(cfg, width * height, |i| unsafe {
        let m = *(mat_addr as *const f32).add(i);
        let v = *(vec_addr as *const f32).add(axis.vector_index(i, height));
        *(out_addr as *mut f32).add(i) = op.apply(m, v);
    });
}
