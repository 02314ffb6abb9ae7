//! Comparison kernels
//!
//! Results are 1.0 for true and 0.0 for false, stored as f32.

use crate::ops::CompareOp;
use crate::runtime::launch::{LaunchConfig, for_each_index};

/// `out[i] = (a[i] op b[i]) ? 1 : 0`
///
/// # Safety
/// - `a`, `b`, and `out` must be valid pointers to `len` elements
#[inline]
pub unsafe fn compare_op_kernel(
    cfg: &LaunchConfig,
    op: CompareOp,
    a: *const f32,
    b: *const f32,
    out: *mut f32,
    len: usize,
) {
    let a_addr = a as usize;
    let b_addr = b as usize;
    let out_addr = out as usize;
    for_each_index(cfg, len, |i| unsafe {
        let x = *(a_addr as *const f32).add(i);
        let y = *(b_addr as *const f32).add(i);
        *(out_addr as *mut f32).add(i) = op.apply(x, y);
    });
}

/// `out[i] = (a[i] op scalar) ? 1 : 0`
///
/// # Safety
/// - `a` and `out` must be valid pointers to `len` elements
#[inline]
pub unsafe fn compare_scalar_kernel(
    cfg: &LaunchConfig,
    op: CompareOp,
    a: *const f32,
    scalar: f32,
    out: *mut f32,
    len: usize,
) {
    let a_addr = a as usize;
    let out_addr = out as usize;
    for_each_index(cfg, len, |i| unsafe {
        let x = *(a_addr as *const f32).add(i);
        *(out_addr as *mut f32).add(i) = op.apply(x, scalar);
    });
}
