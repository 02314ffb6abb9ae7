//! Tiled transpose through a padded staging tile
//!
//! Each block stages one `COPY_BLOCK_SIZE x COPY_BLOCK_SIZE` tile of the
//! input, then writes it back at swapped coordinates. The tile row stride is
//! `COPY_BLOCK_SIZE + 1` so that reading a tile column touches a different
//! bank per lane. Edge tiles bounds-check every load and store on its own.

use crate::runtime::launch::{COPY_BLOCK_SIZE, LaunchConfig, block_threads, for_each_block};

const TILE: usize = COPY_BLOCK_SIZE as usize;

/// Transpose a `height x width` column-major matrix into `out`
/// (`width x height`, column-major)
///
/// Launch with [`crate::runtime::launch::transpose_launch_config`]: block
/// `(bx, by)` owns input rows `bx*16..` and columns `by*16..`, block shape
/// 16x16.
///
/// # Safety
/// - `a` and `out` must be valid pointers to `width * height` elements
/// - `out` must not overlap `a`
pub unsafe fn transpose_kernel(
    cfg: &LaunchConfig,
    a: *const f32,
    out: *mut f32,
    height: usize,
    width: usize,
) {
    let a_addr = a as usize;
    let out_addr = out as usize;
    let block_dim = cfg.block_dim;

    for_each_block(cfg, |block| {
        let a = a_addr as *const f32;
        let out = out_addr as *mut f32;
        let row0 = block.0 as usize * TILE;
        let col0 = block.1 as usize * TILE;
        let mut tile = [[0.0f32; TILE + 1]; TILE];

        // load: tile[ty][tx] = a(row0 + tx, col0 + ty)
        for t in block_threads(block, block_dim) {
            let (tx, ty) = (t.thread.0 as usize, t.thread.1 as usize);
            if tx >= TILE || ty >= TILE {
                continue;
            }
            let (r, c) = (row0 + tx, col0 + ty);
            if r < height && c < width {
                tile[ty][tx] = unsafe { *a.add(c * height + r) };
            }
        }

        // barrier; store: out(col0 + tx, row0 + ty) = tile[tx][ty]
        for t in block_threads(block, block_dim) {
            let (tx, ty) = (t.thread.0 as usize, t.thread.1 as usize);
            if tx >= TILE || ty >= TILE {
                continue;
            }
            let (c, r) = (col0 + tx, row0 + ty);
            if c < width && r < height {
                unsafe { *out.add(r * width + c) = tile[tx][ty] };
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::launch::transpose_launch_config;

    fn transpose(a: &[f32], height: usize, width: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; a.len()];
        let cfg = transpose_launch_config(height, width);
        unsafe { transpose_kernel(&cfg, a.as_ptr(), out.as_mut_ptr(), height, width) };
        out
    }

    #[test]
    fn test_transpose_2x3() {
        // a = [[1, 2, 3], [4, 5, 6]] column-major
        let a = [1.0f32, 4.0, 2.0, 5.0, 3.0, 6.0];
        // a^T = [[1, 4], [2, 5], [3, 6]] column-major
        assert_eq!(transpose(&a, 2, 3), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_transpose_non_tile_aligned() {
        let (h, w) = (37, 53);
        let a: Vec<f32> = (0..h * w).map(|i| i as f32).collect();
        let t = transpose(&a, h, w);
        for r in 0..h {
            for c in 0..w {
                assert_eq!(t[r * w + c], a[c * h + r]);
            }
        }
        assert_eq!(transpose(&t, w, h), a);
    }

    #[test]
    fn test_transpose_vector() {
        let a = [1.0f32, 2.0, 3.0];
        assert_eq!(transpose(&a, 3, 1), a);
        assert_eq!(transpose(&a, 1, 3), a);
    }
}
