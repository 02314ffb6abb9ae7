//! Compressed-row sparse matrices
//!
//! Three parallel arrays describe a CSR matrix:
//!
//! - `data`: nonzero values
//! - `indices`: column of each nonzero
//! - `ptr`: `rows + 1` row offsets into `data`/`indices`
//!
//! Index arrays may be float-encoded (`f32`) or any integer type
//! implementing [`CsrIndex`]. The raw kernels in [`crate::kernels::sparse`]
//! trust the structure; [`CsrMatrix::new`] checks it.

mod csr;
mod index;

pub use csr::{CsrData, CsrMatrix};
pub use index::CsrIndex;
