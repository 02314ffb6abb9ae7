//! Row-range and row-gather copies on column-major matrices
//!
//! A row slice `[start, end)` of a `height x width` matrix is itself a valid
//! column-major `(end - start) x width` matrix, so every column is a
//! separate strided copy.

use crate::runtime::launch::{LaunchConfig, ROW_SLICE_TILE, for_each_block, for_each_index};

const CHUNK: usize = ROW_SLICE_TILE as usize;

/// Shared body of the get/set row-slice kernels
///
/// Block `(bx, by)` lane `t` handles slice row `bx*32 + t` for columns
/// `by*32 .. by*32 + 32`. `copy(slice_row, col)` performs the element move.
#[inline]
fn row_slice_blocks<F>(cfg: &LaunchConfig, slice_rows: usize, width: usize, copy: F)
where
    F: Fn(usize, usize) + Sync + Send,
{
    let lanes = cfg.block_dim.x as usize;
    let grid_x = cfg.grid_dim.x as usize;
    let grid_y = cfg.grid_dim.y as usize;

    for_each_block(cfg, |(bx, by, _)| {
        let mut col_block = by as usize;
        while col_block * CHUNK < width {
            let start_col = col_block * CHUNK;
            let end_col = (start_col + CHUNK).min(width);
            let mut row_block = bx as usize;
            while row_block * lanes < slice_rows {
                for t in 0..lanes {
                    let row = row_block * lanes + t;
                    if row < slice_rows {
                        for col in start_col..end_col {
                            copy(row, col);
                        }
                    }
                }
                row_block += grid_x;
            }
            col_block += grid_y;
        }
    });
}

/// Copy rows `[start, end)` of `source` into `target` (`(end-start) x width`)
///
/// # Safety
/// - `source` must be valid for `width * height` elements
/// - `target` must be valid for `width * (end - start)` elements
/// - `start <= end <= height`
pub unsafe fn get_row_slice_kernel(
    cfg: &LaunchConfig,
    source: *const f32,
    target: *mut f32,
    start: usize,
    end: usize,
    width: usize,
    height: usize,
) {
    let src_addr = source as usize;
    let dst_addr = target as usize;
    let slice_rows = end - start;
    row_slice_blocks(cfg, slice_rows, width, |row, col| unsafe {
        let v = *(src_addr as *const f32).add(col * height + start + row);
        *(dst_addr as *mut f32).add(col * slice_rows + row) = v;
    });
}

/// Write `source` (`(end-start) x width`) into rows `[start, end)` of `target`
///
/// Other rows of `target` are untouched.
///
/// # Safety
/// - `source` must be valid for `width * (end - start)` elements
/// - `target` must be valid for `width * height` elements
/// - `start <= end <= height`
pub unsafe fn set_row_slice_kernel(
    cfg: &LaunchConfig,
    source: *const f32,
    target: *mut f32,
    start: usize,
    end: usize,
    width: usize,
    height: usize,
) {
    let src_addr = source as usize;
    let dst_addr = target as usize;
    let slice_rows = end - start;
    row_slice_blocks(cfg, slice_rows, width, |row, col| unsafe {
        let v = *(src_addr as *const f32).add(col * slice_rows + row);
        *(dst_addr as *mut f32).add(col * height + start + row) = v;
    });
}

/// Decode a float-encoded row index; `None` when it is not a valid row
#[inline(always)]
fn decode_row(idx: f32, height: usize) -> Option<usize> {
    if idx >= 0.0 && (idx as usize) < height {
        Some(idx as usize)
    } else {
        None
    }
}

/// Gather rows: `target` row `j` = `source` row `indices[j]`
///
/// `target` is `num_indices x width`; an invalid index fills its row with NaN.
///
/// # Safety
/// - `source` must be valid for `width * height` elements
/// - `target` must be valid for `width * num_indices` elements
/// - `indices` must be valid for `num_indices` elements
pub unsafe fn select_rows_kernel(
    cfg: &LaunchConfig,
    source: *const f32,
    target: *mut f32,
    indices: *const f32,
    num_indices: usize,
    width: usize,
    height: usize,
) {
    let src_addr = source as usize;
    let dst_addr = target as usize;
    let idx_addr = indices as usize;
    for_each_index(cfg, num_indices * width, |i| unsafe {
        let (j, col) = (i % num_indices, i / num_indices);
        let v = match decode_row(*(idx_addr as *const f32).add(j), height) {
            Some(row) => *(src_addr as *const f32).add(col * height + row),
            None => f32::NAN,
        };
        *(dst_addr as *mut f32).add(i) = v;
    });
}

/// Scatter rows: `target` row `indices[j]` = `source` row `j`
///
/// Invalid indices are skipped. Duplicate indices race; the surviving row
/// is unspecified.
///
/// # Safety
/// - `source` must be valid for `width * num_indices` elements
/// - `target` must be valid for `width * height` elements
/// - `indices` must be valid for `num_indices` elements
pub unsafe fn set_selected_rows_kernel(
    cfg: &LaunchConfig,
    source: *const f32,
    target: *mut f32,
    indices: *const f32,
    num_indices: usize,
    width: usize,
    height: usize,
) {
    let src_addr = source as usize;
    let dst_addr = target as usize;
    let idx_addr = indices as usize;
    for_each_index(cfg, num_indices * width, |i| unsafe {
        let (j, col) = (i % num_indices, i / num_indices);
        if let Some(row) = decode_row(*(idx_addr as *const f32).add(j), height) {
            *(dst_addr as *mut f32).add(col * height + row) = *(src_addr as *const f32).add(i);
        }
    });
}
