//! Binary element-wise kernels (matching-shape operands)

use crate::ops::BinaryOp;
use crate::runtime::launch::{LaunchConfig, for_each_index};

/// `out[i] = op(a[i], b[i])` over a grid-stride loop
///
/// # Safety
/// - `a`, `b`, and `out` must be valid pointers to `len` elements
/// - `out` must not overlap with `a` or `b` unless they are the same pointer
#[inline]
pub unsafe fn binary_op_kernel(
    cfg: &LaunchConfig,
    op: BinaryOp,
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
