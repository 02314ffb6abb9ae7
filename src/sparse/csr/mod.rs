//! CSR (Compressed Sparse Row) format

mod matrix;

pub use matrix::{CsrData, CsrMatrix};
