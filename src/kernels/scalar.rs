//! Scalar-operand kernels and constant fill

use crate::ops::BinaryOp;
use crate::runtime::launch::{LaunchConfig, for_each_index};

/// `out[i] = op(a[i], scalar)` over a grid-stride loop
///
/// `BinaryOp::Pow` gives `pow(x, p)`; `Div` gives `x / alpha`.
///
/// # Safety
/// - `a` and `out` must be valid pointers to `len` elements
/// - `out` may alias `a`
#[inline]
pub unsafe fn scalar_op_kernel(
    cfg: &LaunchConfig,
    op: BinaryOp,
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

/// Fill `out` with `value`
///
/// # Safety
/// - `out` must be a valid pointer to `len` elements
#[inline]
pub unsafe fn assign_scalar_kernel(cfg: &LaunchConfig, out: *mut f32, value: f32, len: usize) {
    let out_addr = out as usize;
    for_each_index(cfg, len, |i| unsafe {
        *(out_addr as *mut f32).add(i) = value;
    });
}
