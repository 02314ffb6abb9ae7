//! Checked kernel dispatch
//!
//! [`KernelClient`] is the host-side dispatcher: it validates extents, picks
//! a launch geometry for each kernel, applies the parallelism settings and
//! owns the process-wide random stream bank.

use super::launch::{
    LaunchConfig, columnwise_launch_config, elementwise_launch_config, row_slice_launch_config,
    rows_launch_config, sparse_dot_launch_config, transpose_launch_config,
};
use super::parallelism::ParallelismConfig;
use crate::error::{Error, Result};
use crate::kernels;
use crate::ops::{BinaryOp, BroadcastOp, ColumnReduceOp, CompareOp, UnaryOp, VectorAxis};
use crate::random::StreamBank;
use crate::sparse::{CsrIndex, CsrMatrix};
use log::debug;
use parking_lot::Mutex;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Host dispatcher for the lanemat kernels
///
/// ```rust,ignore
/// let client = KernelClient::new().with_parallelism(ParallelismConfig::new(Some(4), None))?;
/// client.init_random(generate_multipliers(1024), 42)?;
/// client.fill_with_randn(&mut weights)?;
/// client.broadcast(BroadcastOp::Add, VectorAxis::Column, &weights, &bias, &mut out, h, w)?;
/// ```
#[derive(Debug, Default)]
pub struct KernelClient {
    parallelism: ParallelismConfig,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
    rng: Mutex<Option<StreamBank>>,
}

/// `got` must equal `expected`; shorter buffers report which argument ran out
fn check_len(arg: &'static str, got: usize, expected: usize) -> Result<()> {
    if got < expected {
        Err(Error::buffer_too_small(arg, expected, got))
    } else if got > expected {
        Err(Error::shape_mismatch(&[expected], &[got]))
    } else {
        Ok(())
    }
}

fn check_matrix(arg: &'static str, got: usize, height: usize, width: usize) -> Result<()> {
    let required = height
        .checked_mul(width)
        .ok_or_else(|| Error::invalid_argument(arg, format!("{height}x{width} overflows usize")))?;
    check_len(arg, got, required)
}

fn check_row_range(start: usize, end: usize, height: usize) -> Result<()> {
    if start > end || end > height {
        return Err(Error::invalid_argument(
            "end",
            format!("row range {start}..{end} is not within 0..{height}"),
        ));
    }
    Ok(())
}

impl KernelClient {
    /// Create a client on the global rayon pool with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client configured from `LANEMAT_NUM_THREADS` / `LANEMAT_CHUNK_SIZE`
    pub fn from_env() -> Result<Self> {
        Self::new().with_parallelism(ParallelismConfig::from_env())
    }

    /// Apply a parallelism configuration
    ///
    /// Builds a dedicated thread pool when `num_threads` is set.
    pub fn with_parallelism(mut self, config: ParallelismConfig) -> Result<Self> {
        #[cfg(feature = "rayon")]
        {
            self.pool = match config.num_threads {
                Some(n) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(n)
                        .thread_name(|i| format!("lanemat-{i}"))
                        .build()
                        .map_err(|e| Error::Internal(format!("failed to build thread pool: {e}")))?;
                    log::info!("built lanemat thread pool with {n} worker(s)");
                    Some(Arc::new(pool))
                }
                None => None,
            };
        }
        self.parallelism = config;
        Ok(self)
    }

    /// Current parallelism configuration
    pub fn parallelism(&self) -> ParallelismConfig {
        self.parallelism
    }

    /// Minimum number of blocks per rayon task
    #[inline]
    pub fn rayon_min_len(&self) -> usize {
        self.parallelism.min_len()
    }

    /// Run `f` inside this client's thread pool (if any)
    pub fn install_parallelism<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        #[cfg(feature = "rayon")]
        if let Some(pool) = &self.pool {
            return pool.install(f);
        }
        f()
    }

    fn launch<F>(&self, name: &str, cfg: LaunchConfig, extents: &[usize], kernel: F) -> Result<()>
    where
        F: FnOnce(&LaunchConfig) + Send,
    {
        if !cfg.is_runnable() {
            return Err(Error::InvalidLaunch {
                reason: format!("{name}: launch has no lanes ({cfg:?})"),
            });
        }
        let cfg = cfg.with_min_blocks_per_task(self.rayon_min_len());
        debug!(
            "launch {name}: grid={:?} block={:?} extents={extents:?}",
            cfg.grid_dim, cfg.block_dim
        );
        self.install_parallelism(|| kernel(&cfg));
        Ok(())
    }

    // ========================================================================
    // Random stream bank
    // ========================================================================

    /// Install a stream bank built from `mults` and seed it
    ///
    /// Replaces any previous bank.
    pub fn init_random(&self, mults: Vec<u32>, seed: u32) -> Result<()> {
        let mut bank = StreamBank::new(mults)?;
        self.install_parallelism(|| bank.seed(seed));
        *self.rng.lock() = Some(bank);
        Ok(())
    }

    /// Install an existing (possibly restored) stream bank as-is
    pub fn set_stream_bank(&self, bank: StreamBank) {
        *self.rng.lock() = Some(bank);
    }

    /// Reseed the installed stream bank
    pub fn seed_random(&self, seed: u32) -> Result<()> {
        let mut guard = self.rng.lock();
        let bank = guard.as_mut().ok_or(Error::RandomNotInitialized)?;
        self.install_parallelism(|| bank.seed(seed));
        Ok(())
    }

    /// Copy of the installed stream bank, for recording replay state
    pub fn stream_bank_snapshot(&self) -> Option<StreamBank> {
        self.rng.lock().clone()
    }

    /// Fill `out` with uniform samples in (0, 1]
    pub fn fill_with_rand(&self, out: &mut [f32]) -> Result<()> {
        let mut guard = self.rng.lock();
        let bank = guard.as_mut().ok_or(Error::RandomNotInitialized)?;
        debug!("launch random_uniform: streams={} numel={}", bank.len(), out.len());
        self.install_parallelism(|| bank.sample_uniform(out))
    }

    /// Fill `out` with standard normal samples
    pub fn fill_with_randn(&self, out: &mut [f32]) -> Result<()> {
        let mut guard = self.rng.lock();
        let bank = guard.as_mut().ok_or(Error::RandomNotInitialized)?;
        debug!("launch random_gaussian: streams={} numel={}", bank.len(), out.len());
        self.install_parallelism(|| bank.sample_gaussian(out))
    }

    /// `out = mat + stddev * N(0, 1)`
    pub fn add_gaussian_noise(&self, mat: &[f32], out: &mut [f32], stddev: f32) -> Result<()> {
        check_len("out", out.len(), mat.len())?;
        let mut guard = self.rng.lock();
        let bank = guard.as_mut().ok_or(Error::RandomNotInitialized)?;
        debug!("launch add_gaussian_noise: streams={} numel={}", bank.len(), out.len());
        self.install_parallelism(|| bank.add_gaussian_noise(mat, out, stddev))
    }

    // ========================================================================
    // Element-wise
    // ========================================================================

    /// `out[i] = op(a[i])`
    pub fn apply_unary(&self, op: UnaryOp, a: &[f32], out: &mut [f32]) -> Result<()> {
        check_len("out", out.len(), a.len())?;
        let len = a.len();
        self.launch(op.name(), elementwise_launch_config(len), &[len], |cfg| unsafe {
            kernels::unary_op_kernel(cfg, op, a.as_ptr(), out.as_mut_ptr(), len);
        })
    }

    /// `out[i] = op(a[i], b[i])`
    pub fn binary(&self, op: BinaryOp, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_len("b", b.len(), a.len())?;
        check_len("out", out.len(), a.len())?;
        let len = a.len();
        self.launch(op.name(), elementwise_launch_config(len), &[len], |cfg| unsafe {
            kernels::binary_op_kernel(cfg, op, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), len);
        })
    }

    /// `out[i] = op(a[i], scalar)`; `BinaryOp::Pow` gives `pow(x, p)`
    pub fn scalar(&self, op: BinaryOp, a: &[f32], scalar: f32, out: &mut [f32]) -> Result<()> {
        check_len("out", out.len(), a.len())?;
        let len = a.len();
        self.launch(op.name(), elementwise_launch_config(len), &[len], |cfg| unsafe {
            kernels::scalar_op_kernel(cfg, op, a.as_ptr(), scalar, out.as_mut_ptr(), len);
        })
    }

    /// `out[i] = value`
    pub fn assign_scalar(&self, out: &mut [f32], value: f32) -> Result<()> {
        let len = out.len();
        self.launch("assign_scalar", elementwise_launch_config(len), &[len], |cfg| unsafe {
            kernels::assign_scalar_kernel(cfg, out.as_mut_ptr(), value, len);
        })
    }

    /// `out[i] = op(a[i], b[i]) ? 1 : 0`
    pub fn compare(&self, op: CompareOp, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_len("b", b.len(), a.len())?;
        check_len("out", out.len(), a.len())?;
        let len = a.len();
        self.launch(op.name(), elementwise_launch_config(len), &[len], |cfg| unsafe {
            kernels::compare_op_kernel(cfg, op, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), len);
        })
    }

    /// `out[i] = op(a[i], scalar) ? 1 : 0`
    pub fn compare_scalar(&self, op: CompareOp, a: &[f32], scalar: f32, out: &mut [f32]) -> Result<()> {
        check_len("out", out.len(), a.len())?;
        let len = a.len();
        self.launch(op.name(), elementwise_launch_config(len), &[len], |cfg| unsafe {
            kernels::compare_scalar_kernel(cfg, op, a.as_ptr(), scalar, out.as_mut_ptr(), len);
        })
    }

    /// Combine a `height x width` matrix with a row or column vector
    ///
    /// The vector must hold `height` entries for [`VectorAxis::Column`] and
    /// `width` entries for [`VectorAxis::Row`].
    #[allow(clippy::too_many_arguments)]
    pub fn broadcast(
        &self,
        op: BroadcastOp,
        axis: VectorAxis,
        mat: &[f32],
        vec: &[f32],
        out: &mut [f32],
        height: usize,
        width: usize,
    ) -> Result<()> {
        check_matrix("mat", mat.len(), height, width)?;
        check_len("vec", vec.len(), axis.vector_len(height, width))?;
        check_len("out", out.len(), mat.len())?;
        let len = mat.len();
        self.launch(op.name(axis), elementwise_launch_config(len), &[height, width], |cfg| unsafe {
            kernels::broadcast_vector_kernel(
                cfg,
                op,
                axis,
                mat.as_ptr(),
                vec.as_ptr(),
                out.as_mut_ptr(),
                width,
                height,
            );
        })
    }

    // ========================================================================
    // Reductions
    // ========================================================================

    /// Reduce every column of a `height x width` matrix into `out[width]`
    pub fn columnwise(
        &self,
        op: ColumnReduceOp,
        mat: &[f32],
        out: &mut [f32],
        height: usize,
        width: usize,
    ) -> Result<()> {
        check_matrix("mat", mat.len(), height, width)?;
        check_len("out", out.len(), width)?;
        if height == 0 && width > 0 {
            return Err(Error::invalid_argument("height", "cannot reduce empty columns"));
        }
        self.launch(op.name(), columnwise_launch_config(width), &[height, width], |cfg| unsafe {
            kernels::columnwise_reduce_kernel(cfg, op, mat.as_ptr(), out.as_mut_ptr(), width, height);
        })
    }

    /// Softmax over each row of a row-major buffer with `width` entries per row
    pub fn softmax(&self, a: &[f32], out: &mut [f32], width: usize) -> Result<()> {
        if width == 0 {
            return Err(Error::invalid_argument("width", "must be non-zero"));
        }
        if a.len() % width != 0 {
            return Err(Error::invalid_argument(
                "width",
                format!("{} elements do not split into rows of {width}", a.len()),
            ));
        }
        check_len("out", out.len(), a.len())?;
        let len = a.len();
        let rows = len / width;
        self.launch("softmax", rows_launch_config(rows), &[rows, width], |cfg| unsafe {
            kernels::softmax_kernel(cfg, a.as_ptr(), out.as_mut_ptr(), width, len);
        })
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Transpose a `height x width` matrix into `out` (`width x height`)
    pub fn transpose(&self, a: &[f32], out: &mut [f32], height: usize, width: usize) -> Result<()> {
        check_matrix("a", a.len(), height, width)?;
        check_len("out", out.len(), a.len())?;
        self.launch(
            "transpose",
            transpose_launch_config(height, width),
            &[height, width],
            |cfg| unsafe {
                kernels::transpose_kernel(cfg, a.as_ptr(), out.as_mut_ptr(), height, width);
            },
        )
    }

    /// Copy rows `[start, end)` of `source` into `target` (`(end-start) x width`)
    pub fn get_row_slice(
        &self,
        source: &[f32],
        target: &mut [f32],
        start: usize,
        end: usize,
        height: usize,
        width: usize,
    ) -> Result<()> {
        check_matrix("source", source.len(), height, width)?;
        check_row_range(start, end, height)?;
        check_matrix("target", target.len(), end - start, width)?;
        self.launch(
            "get_row_slice",
            row_slice_launch_config(end - start, width),
            &[start, end, height, width],
            |cfg| unsafe {
                kernels::get_row_slice_kernel(
                    cfg,
                    source.as_ptr(),
                    target.as_mut_ptr(),
                    start,
                    end,
                    width,
                    height,
                );
            },
        )
    }

    /// Write `source` (`(end-start) x width`) into rows `[start, end)` of `target`
    pub fn set_row_slice(
        &self,
        source: &[f32],
        target: &mut [f32],
        start: usize,
        end: usize,
        height: usize,
        width: usize,
    ) -> Result<()> {
        check_matrix("target", target.len(), height, width)?;
        check_row_range(start, end, height)?;
        check_matrix("source", source.len(), end - start, width)?;
        self.launch(
            "set_row_slice",
            row_slice_launch_config(end - start, width),
            &[start, end, height, width],
            |cfg| unsafe {
                kernels::set_row_slice_kernel(
                    cfg,
                    source.as_ptr(),
                    target.as_mut_ptr(),
                    start,
                    end,
                    width,
                    height,
                );
            },
        )
    }

    /// Gather rows `indices` of `source` into `target` (`indices.len() x width`)
    ///
    /// Rows for out-of-range indices are filled with NaN.
    pub fn select_rows(
        &self,
        source: &[f32],
        target: &mut [f32],
        indices: &[f32],
        height: usize,
        width: usize,
    ) -> Result<()> {
        check_matrix("source", source.len(), height, width)?;
        check_matrix("target", target.len(), indices.len(), width)?;
        let n = indices.len();
        self.launch(
            "select_rows",
            elementwise_launch_config(n * width),
            &[n, height, width],
            |cfg| unsafe {
                kernels::select_rows_kernel(
                    cfg,
                    source.as_ptr(),
                    target.as_mut_ptr(),
                    indices.as_ptr(),
                    n,
                    width,
                    height,
                );
            },
        )
    }

    /// Scatter the rows of `source` to rows `indices` of `target`
    ///
    /// Out-of-range indices are skipped.
    pub fn set_selected_rows(
        &self,
        source: &[f32],
        target: &mut [f32],
        indices: &[f32],
        height: usize,
        width: usize,
    ) -> Result<()> {
        check_matrix("target", target.len(), height, width)?;
        check_matrix("source", source.len(), indices.len(), width)?;
        let n = indices.len();
        self.launch(
            "set_selected_rows",
            elementwise_launch_config(n * width),
            &[n, height, width],
            |cfg| unsafe {
                kernels::set_selected_rows_kernel(
                    cfg,
                    source.as_ptr(),
                    target.as_mut_ptr(),
                    indices.as_ptr(),
                    n,
                    width,
                    height,
                );
            },
        )
    }

    // ========================================================================
    // Sparse
    // ========================================================================

    /// `out = alpha * (S . dense) + beta * out`
    ///
    /// `dense` is `S.cols() x n` and `out` is `S.rows() x n`, column-major.
    pub fn sparse_dot<I: CsrIndex>(
        &self,
        sparse: &CsrMatrix<'_, I>,
        dense: &[f32],
        n: usize,
        out: &mut [f32],
        alpha: f32,
        beta: f32,
    ) -> Result<()> {
        let (rows, k) = (sparse.rows(), sparse.cols());
        check_matrix("dense", dense.len(), k, n)?;
        check_matrix("out", out.len(), rows, n)?;
        self.launch(
            "sparse_dense_dot",
            sparse_dot_launch_config(rows, n),
            &[rows, k, n, sparse.nnz()],
            |cfg| unsafe {
                kernels::sparse_dense_dot_kernel(
                    cfg,
                    sparse.data().as_ptr(),
                    sparse.indices().as_ptr(),
                    sparse.ptr().as_ptr(),
                    rows,
                    dense.as_ptr(),
                    k,
                    n,
                    out.as_mut_ptr(),
                    alpha,
                    beta,
                );
            },
        )
    }

    /// `out[r, c] = dense[r, c] * S[r, c]` for every stored nonzero of `S`
    ///
    /// Positions without a stored nonzero keep their previous `out` value.
    pub fn sparse_elementwise_mul<I: CsrIndex>(
        &self,
        sparse: &CsrMatrix<'_, I>,
        dense: &[f32],
        out: &mut [f32],
    ) -> Result<()> {
        let (rows, cols) = (sparse.rows(), sparse.cols());
        check_matrix("dense", dense.len(), rows, cols)?;
        check_len("out", out.len(), dense.len())?;
        self.launch(
            "sparse_dense_elementwise_mul",
            rows_launch_config(rows),
            &[rows, cols, sparse.nnz()],
            |cfg| unsafe {
                kernels::sparse_dense_elementwise_mul_kernel(
                    cfg,
                    sparse.data().as_ptr(),
                    sparse.indices().as_ptr(),
                    sparse.ptr().as_ptr(),
                    rows,
                    dense.as_ptr(),
                    out.as_mut_ptr(),
                );
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::generate_multipliers;

    #[test]
    fn test_from_env_reads_parallelism() {
        let client = KernelClient::from_env().unwrap();
        assert_eq!(client.parallelism(), ParallelismConfig::from_env());
        assert_eq!(client.rayon_min_len(), ParallelismConfig::from_env().min_len());
    }

    #[test]
    fn test_buffer_checks() {
        let client = KernelClient::new();
        let a = [1.0f32; 4];
        let mut short = [0.0f32; 3];
        assert!(matches!(
            client.apply_unary(UnaryOp::Exp, &a, &mut short),
            Err(Error::BufferTooSmall { arg: "out", required: 4, got: 3 })
        ));
        let mut long = [0.0f32; 5];
        assert!(matches!(
            client.binary(BinaryOp::Add, &a, &a, &mut long),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_broadcast_vector_length_checked() {
        let client = KernelClient::new();
        let mat = [0.0f32; 6];
        let mut out = [0.0f32; 6];
        // column vectors need `height` entries
        let err = client
            .broadcast(BroadcastOp::Add, VectorAxis::Column, &mat, &[1.0, 2.0], &mut out, 3, 2)
            .unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { arg: "vec", .. }));
        client
            .broadcast(BroadcastOp::Add, VectorAxis::Row, &mat, &[1.0, 2.0], &mut out, 3, 2)
            .unwrap();
        assert_eq!(out, [1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_row_range_checked() {
        let client = KernelClient::new();
        let src = [0.0f32; 8];
        let mut dst = [0.0f32; 4];
        assert!(matches!(
            client.get_row_slice(&src, &mut dst, 3, 5, 4, 2),
            Err(Error::InvalidArgument { arg: "end", .. })
        ));
    }

    #[test]
    fn test_softmax_rejects_ragged_rows() {
        let client = KernelClient::new();
        let mut out = [0.0f32; 5];
        assert!(client.softmax(&[0.0; 5], &mut out, 2).is_err());
        assert!(client.softmax(&[0.0; 5], &mut out, 0).is_err());
    }

    #[test]
    fn test_random_requires_init() {
        let client = KernelClient::new();
        let mut out = [0.0f32; 4];
        assert!(matches!(client.fill_with_rand(&mut out), Err(Error::RandomNotInitialized)));
        assert!(matches!(client.seed_random(1), Err(Error::RandomNotInitialized)));

        client.init_random(generate_multipliers(8), 1).unwrap();
        client.fill_with_rand(&mut out).unwrap();
        assert!(out.iter().all(|&x| x > 0.0 && x <= 1.0));
        assert_eq!(client.stream_bank_snapshot().map(|b| b.len()), Some(8));
    }

    #[test]
    fn test_dedicated_pool() {
        let client = KernelClient::new()
            .with_parallelism(ParallelismConfig::new(Some(2), Some(4)))
            .unwrap();
        assert_eq!(client.rayon_min_len(), 4);
        let a: Vec<f32> = (0..10_000).map(|i| i as f32).collect();
        let mut out = vec![0.0f32; a.len()];
        client.scalar(BinaryOp::Mul, &a, 2.0, &mut out).unwrap();
        assert!(out.iter().enumerate().all(|(i, &v)| v == 2.0 * i as f32));
    }
}
