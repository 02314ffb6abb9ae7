//! Core CSR implementation: borrowed view, owned buffers, validation

use crate::error::{Error, Result};
use crate::sparse::CsrIndex;

/// Borrowed compressed-row matrix with validated structure
///
/// `rows = ptr.len() - 1`; row `r` holds nonzeros `ptr[r]..ptr[r + 1]` of
/// `data`/`indices`, and `indices[k]` is the column of nonzero `k`.
#[derive(Debug, Clone, Copy)]
pub struct CsrMatrix<'a, I: CsrIndex = f32> {
    data: &'a [f32],
    indices: &'a [I],
    ptr: &'a [I],
    cols: usize,
}

impl<'a, I: CsrIndex> CsrMatrix<'a, I> {
    /// Wrap CSR arrays after checking every structural invariant
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `ptr` is empty, does not start at 0, decreases, or does not end at `nnz`
    /// - `indices` and `data` have different lengths
    /// - any index is not a valid offset, or a column is `>= cols`
    pub fn new(data: &'a [f32], indices: &'a [I], ptr: &'a [I], cols: usize) -> Result<Self> {
        let nnz = data.len();

        if indices.len() != nnz {
            return Err(Error::shape_mismatch(&[nnz], &[indices.len()]));
        }

        let offsets = ptr
            .iter()
            .map(|p| {
                p.checked_index()
                    .ok_or_else(|| Error::invalid_sparse(format!("row offset {p:?} is not an offset")))
            })
            .collect::<Result<Vec<usize>>>()?;

        match (offsets.first(), offsets.last()) {
            (None, _) => {
                return Err(Error::invalid_sparse("ptr must hold at least one offset"));
            }
            (Some(&first), _) if first != 0 => {
                return Err(Error::invalid_sparse(format!("ptr[0] is {first}, expected 0")));
            }
            (_, Some(&last)) if last != nnz => {
                return Err(Error::invalid_sparse(format!(
                    "ptr ends at {last} but there are {nnz} nonzeros"
                )));
            }
            _ => {}
        }

        if let Some(r) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::invalid_sparse(format!("ptr decreases at row {r}")));
        }

        for (k, idx) in indices.iter().enumerate() {
            match idx.checked_index() {
                Some(c) if c < cols => {}
                _ => {
                    return Err(Error::invalid_sparse(format!(
                        "column index {idx:?} at nonzero {k} is outside 0..{cols}"
                    )));
                }
            }
        }

        Ok(Self {
            data,
            indices,
            ptr,
            cols,
        })
    }

    /// Number of rows (`ptr.len() - 1`)
    #[inline]
    pub fn rows(&self) -> usize {
        self.ptr.len() - 1
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored nonzeros
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Nonzero values
    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Column index per nonzero
    pub fn indices(&self) -> &'a [I] {
        self.indices
    }

    /// Row offsets (`rows + 1` entries)
    pub fn ptr(&self) -> &'a [I] {
        self.ptr
    }

    /// `(column, value)` pairs of row `r`
    pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, f32)> + 'a {
        let (start, end) = (self.ptr[r].to_index(), self.ptr[r + 1].to_index());
        let indices = self.indices;
        let data = self.data;
        (start..end).map(move |k| (indices[k].to_index(), data[k]))
    }

    /// Expand into a dense column-major `rows x cols` buffer
    pub fn to_dense(&self) -> Vec<f32> {
        let rows = self.rows();
        let mut dense = vec![0.0f32; rows * self.cols];
        for r in 0..rows {
            for (c, v) in self.row(r) {
                dense[c * rows + r] += v;
            }
        }
        dense
    }
}

/// Owned CSR arrays
#[derive(Debug, Clone, PartialEq)]
pub struct CsrData<I: CsrIndex = f32> {
    /// Nonzero values
    pub data: Vec<f32>,
    /// Column index per nonzero
    pub indices: Vec<I>,
    /// Row offsets
    pub ptr: Vec<I>,
    /// Number of columns
    pub cols: usize,
}

impl<I: CsrIndex> CsrData<I> {
    /// Compress the nonzeros of a column-major `height x width` matrix
    pub fn from_dense(dense: &[f32], height: usize, width: usize) -> Self {
        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut ptr = Vec::with_capacity(height + 1);
        ptr.push(I::from_index(0));
        for r in 0..height {
            for c in 0..width {
                let v = dense[c * height + r];
                if v != 0.0 {
                    data.push(v);
                    indices.push(I::from_index(c));
                }
            }
            ptr.push(I::from_index(data.len()));
        }
        Self {
            data,
            indices,
            ptr,
            cols: width,
        }
    }

    /// Validated borrowed view
    pub fn view(&self) -> Result<CsrMatrix<'_, I>> {
        CsrMatrix::new(&self.data, &self.indices, &self.ptr, self.cols)
    }
}
