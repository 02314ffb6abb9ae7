//! Columnwise reductions and row softmax
//!
//! # Columnwise reductions
//!
//! One block of `REDUCE_GROUP_SIZE` (32) lanes per column of a column-major
//! `height x width` matrix:
//!
//! 1. lane `t` scans rows `t, t + 32, ...` and stores its partial in a
//!    32-slot scratch
//! 2. barrier
//! 3. lane 0 folds the 32 partials into the column result
//!
//! Blocks beyond the grid wrap around, so any grid size covers all columns.
//!
//! # Softmax
//!
//! Row-major over `rows = len / width`: each lane owns whole rows and runs
//! max, exp(x - max), sum and normalize passes in order.

use crate::ops::ColumnReduceOp;
use crate::runtime::launch::{LaunchConfig, REDUCE_GROUP_SIZE, for_each_block, for_each_index};

const GROUP: usize = REDUCE_GROUP_SIZE as usize;

/// Running value of one lane: the value and, for arg-reductions, its row
#[derive(Copy, Clone, Debug)]
struct Partial {
    value: f32,
    row: usize,
}

impl ColumnReduceOp {
    #[inline(always)]
    fn identity(self) -> Partial {
        let value = match self {
            ColumnReduceOp::Max | ColumnReduceOp::Argmax => f32::NEG_INFINITY,
            ColumnReduceOp::Min => f32::INFINITY,
            ColumnReduceOp::Sum => 0.0,
        };
        Partial { value, row: 0 }
    }

    /// Fold `next` into `acc`; ties keep the lower row
    #[inline(always)]
    fn combine(self, acc: Partial, next: Partial) -> Partial {
        match self {
            ColumnReduceOp::Sum => Partial {
                value: acc.value + next.value,
                row: 0,
            },
            ColumnReduceOp::Max | ColumnReduceOp::Argmax => {
                if next.value > acc.value || (next.value == acc.value && next.row < acc.row) {
                    next
                } else {
                    acc
                }
            }
            ColumnReduceOp::Min => {
                if next.value < acc.value {
                    next
                } else {
                    acc
                }
            }
        }
    }

    #[inline(always)]
    fn finish(self, p: Partial) -> f32 {
        match self {
            ColumnReduceOp::Argmax => p.row as f32,
            _ => p.value,
        }
    }
}

/// `out[c] = reduce(mat[c*height .. (c+1)*height])` for every column `c`
///
/// Group size is `min(cfg.block_dim.x, 32)`; launch with
/// [`crate::runtime::launch::columnwise_launch_config`].
///
/// # Safety
/// - `mat` must be a valid pointer to `width * height` elements
/// - `out` must be a valid pointer to `width` elements
pub unsafe fn columnwise_reduce_kernel(
    cfg: &LaunchConfig,
    op: ColumnReduceOp,
    mat: *const f32,
    out: *mut f32,
    width: usize,
    height: usize,
) {
    let mat_addr = mat as usize;
    let out_addr = out as usize;
    let group = (cfg.block_dim.x as usize).clamp(1, GROUP);
    let grid_x = cfg.grid_dim.x as usize;

    for_each_block(cfg, |(bx, by, bz)| {
        // only the first row/plane of a 3-D grid participates
        if by != 0 || bz != 0 {
            return;
        }
        let mat = mat_addr as *const f32;
        let out = out_addr as *mut f32;

        let mut col = bx as usize;
        while col < width {
            let column = unsafe { std::slice::from_raw_parts(mat.add(col * height), height) };

            // phase 1: strided partials into shared scratch
            let mut scratch = [op.identity(); GROUP];
            for (t, slot) in scratch.iter_mut().enumerate().take(group) {
                let mut acc = op.identity();
                let mut i = t;
                while i < height {
                    acc = op.combine(acc, Partial { value: column[i], row: i });
                    i += group;
                }
                *slot = acc;
            }

            // barrier, then lane 0 folds the group
            let total = scratch[..group]
                .iter()
                .fold(op.identity(), |acc, &p| op.combine(acc, p));
            unsafe { *out.add(col) = op.finish(total) };

            col += grid_x;
        }
    });
}

/// Row softmax of a row-major buffer with `width` entries per row
///
/// # Safety
/// - `a` and `out` must be valid pointers to `len` elements
/// - `width` must be non-zero; `len` must be a multiple of `width`
/// - `out` must not overlap `a`
pub unsafe fn softmax_kernel(cfg: &LaunchConfig, a: *const f32, out: *mut f32, width: usize, len: usize) {
    let a_addr = a as usize;
    let out_addr = out as usize;
    let rows = len / width;

    for_each_index(cfg, rows, |row| unsafe {
        let src = std::slice::from_raw_parts((a_addr as *const f32).add(row * width), width);
        let dst = std::slice::from_raw_parts_mut((out_addr as *mut f32).add(row * width), width);

        let mut max = f32::NEG_INFINITY;
        for &x in src {
            if x > max {
                max = x;
            }
        }
        // every entry is -inf: the limit of equal logits
        if max == f32::NEG_INFINITY {
            dst.fill(1.0 / width as f32);
            return;
        }
        for (d, &x) in dst.iter_mut().zip(src) {
            *d = (x - max).exp();
        }
        let mut sum = 0.0f32;
        for &d in dst.iter() {
            sum += d;
        }
        for d in dst.iter_mut() {
            *d /= sum;
        }
    });
}
