//! Unary element-wise kernels

use crate::ops::UnaryOp;
use crate::runtime::launch::{LaunchConfig, for_each_index};

/// `out[i] = op(a[i])` over a grid-stride loop
///
/// # Safety
/// - `a` and `out` must be valid pointers to `len` elements
/// - `out` may alias `a`; it must not partially overlap it
#[inline]
pub unsafe fn unary_op_kernel(
    cfg: &LaunchConfig,
    op: UnaryOp,
    a: *const f32,
    out: *mut f32,
    len: usize,
) {
    let a_addr = a as usize;
    let out_addr = out as usize;
    for_each_index(cfg, len, |i| unsafe {
        let x = *(a_addr as *const f32).add(i);
        *(out_addr as *mut f32).add(i) = op.apply(x);
    });
}
