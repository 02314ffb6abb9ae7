//! Sparse (CSR) x dense kernels
//!
//! Dense operands are column-major. Row count is `ptr.len() - 1` for both
//! kernels; `ptr[rows]` must be readable. Column indices are trusted.

use crate::runtime::launch::{LaunchConfig, block_threads, for_each_block, for_each_index};
use crate::sparse::CsrIndex;

/// `out = alpha * (S . D) + beta * out`
///
/// `S` is `rows x k` in CSR form, `D` is `k x n` and `out` is `rows x n`.
/// Lanes cover (sparse row, dense column) pairs on a 2-D grid and wrap
/// around both axes when the grid is smaller than the problem. With
/// `beta == 0` the previous contents of `out` are never read.
///
/// # Safety
/// - `data` and `indices` must be valid for `ptr[rows]` elements
/// - `ptr` must be valid for `rows + 1` elements
/// - `dense` must be valid for `k * n` elements, every column index `< k`
/// - `out` must be valid for `rows * n` elements and not overlap the inputs
#[allow(clippy::too_many_arguments)]
pub unsafe fn sparse_dense_dot_kernel<I: CsrIndex>(
    cfg: &LaunchConfig,
    data: *const f32,
    indices: *const I,
    ptr: *const I,
    rows: usize,
    dense: *const f32,
    k: usize,
    n: usize,
    out: *mut f32,
    alpha: f32,
    beta: f32,
) {
    let data_addr = data as usize;
    let indices_addr = indices as usize;
    let ptr_addr = ptr as usize;
    let dense_addr = dense as usize;
    let out_addr = out as usize;

    let block_dim = cfg.block_dim;
    let stride_x = cfg.grid_dim.x as usize * block_dim.x as usize;
    let stride_y = cfg.grid_dim.y as usize * block_dim.y as usize;

    for_each_block(cfg, |block| {
        let data = data_addr as *const f32;
        let indices = indices_addr as *const I;
        let ptr = ptr_addr as *const I;
        let dense = dense_addr as *const f32;
        let out = out_addr as *mut f32;

        for t in block_threads(block, block_dim) {
            if t.block.2 != 0 || t.thread.2 != 0 {
                continue;
            }
            let mut row = t.global_x(&block_dim);
            while row < rows {
                let (start, end) = unsafe { ((*ptr.add(row)).to_index(), (*ptr.add(row + 1)).to_index()) };
                let mut col = t.global_y(&block_dim);
                while col < n {
                    let mut sum = 0.0f32;
                    for nz in start..end {
                        unsafe {
                            let c = (*indices.add(nz)).to_index();
                            sum += *data.add(nz) * *dense.add(col * k + c);
                        }
                    }
                    let pos = col * rows + row;
                    unsafe {
                        let prev = if beta == 0.0 { 0.0 } else { beta * *out.add(pos) };
                        *out.add(pos) = alpha * sum + prev;
                    }
                    col += stride_y;
                }
                row += stride_x;
            }
        }
    });
}

/// `out[r, c] = dense[r, c] * S[r, c]` for every stored nonzero `(r, c)`
///
/// `S`, `dense` and `out` are all `rows x cols`; positions not stored in
/// `S` are left untouched in `out`. One lane per sparse row, grid-stride.
///
/// # Safety
/// - `data` and `indices` must be valid for `ptr[rows]` elements
/// - `ptr` must be valid for `rows + 1` elements
/// - `dense` and `out` must be valid for `rows * cols` elements, every
///   column index `< cols`
/// - `out` may alias `dense`
pub unsafe fn sparse_dense_elementwise_mul_kernel<I: CsrIndex>(
    cfg: &LaunchConfig,
    data: *const f32,
    indices: *const I,
    ptr: *const I,
    rows: usize,
    dense: *const f32,
    out: *mut f32,
) {
    let data_addr = data as usize;
    let indices_addr = indices as usize;
    let ptr_addr = ptr as usize;
    let dense_addr = dense as usize;
    let out_addr = out as usize;

    for_each_index(cfg, rows, |row| unsafe {
        let ptr = ptr_addr as *const I;
        let start = (*ptr.add(row)).to_index();
        let end = (*ptr.add(row + 1)).to_index();
        for nz in start..end {
            let c = (*(indices_addr as *const I).add(nz)).to_index();
            let pos = c * rows + row;
            let v = *(data_addr as *const f32).add(nz);
            *(out_addr as *mut f32).add(pos) = *(dense_addr as *const f32).add(pos) * v;
        }
    });
}
