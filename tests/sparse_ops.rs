//! Integration tests for CSR x dense kernels

mod common;

use common::{assert_allclose_f32, create_client, random_vec};
use lanemat::error::Error;
use lanemat::kernels::sparse_dense_dot_kernel;
use lanemat::runtime::LaunchConfig;
use lanemat::sparse::{CsrData, CsrMatrix};

/// Dense reference: `S (rows x k) . D (k x n)`, all column-major
fn reference_dot(s: &[f32], d: &[f32], rows: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; rows * n];
    for col in 0..n {
        for r in 0..rows {
            out[col * rows + r] = (0..k).map(|c| s[c * rows + r] * d[col * k + c]).sum();
        }
    }
    out
}

/// Dense column-major matrix with roughly one nonzero in four
fn sparse_dense_matrix(rows: usize, cols: usize, seed: u64) -> Vec<f32> {
    let values = random_vec(rows * cols, -1.0, 1.0, seed);
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| if (i * 7 + 3) % 4 == 0 { v } else { 0.0 })
        .collect()
}

#[test]
fn test_single_row_dot() {
    let client = create_client();
    let s = CsrMatrix::new(&[1.0, 2.0], &[0.0f32, 2.0], &[0.0f32, 2.0], 3).unwrap();
    // dense is 3x1
    let dense = [5.0f32, 6.0, 7.0];
    let mut out = [0.0f32; 1];
    client.sparse_dot(&s, &dense, 1, &mut out, 1.0, 0.0).unwrap();
    assert_eq!(out, [19.0]);
}

#[test]
fn test_dot_matches_dense_reference() {
    let client = create_client();
    let (rows, k, n) = (57, 23, 19);
    let s_dense = sparse_dense_matrix(rows, k, 1);
    let csr = CsrData::<i32>::from_dense(&s_dense, rows, k);
    let s = csr.view().unwrap();
    let d = random_vec(k * n, -1.0, 1.0, 2);

    let mut out = vec![f32::NAN; rows * n];
    client.sparse_dot(&s, &d, n, &mut out, 1.0, 0.0).unwrap();
    assert_allclose_f32(&out, &reference_dot(&s_dense, &d, rows, k, n), 1e-5, 1e-5, "csr dot");
}

#[test]
fn test_dot_alpha_beta() {
    let client = create_client();
    let (rows, k, n) = (10, 6, 4);
    let s_dense = sparse_dense_matrix(rows, k, 3);
    let csr = CsrData::<f32>::from_dense(&s_dense, rows, k);
    let d = random_vec(k * n, -1.0, 1.0, 4);
    let prev = random_vec(rows * n, -1.0, 1.0, 5);

    let mut out = prev.clone();
    client.sparse_dot(&csr.view().unwrap(), &d, n, &mut out, 2.0, -0.5).unwrap();

    let product = reference_dot(&s_dense, &d, rows, k, n);
    let expected: Vec<f32> = product.iter().zip(&prev).map(|(p, o)| 2.0 * p - 0.5 * o).collect();
    assert_allclose_f32(&out, &expected, 1e-5, 1e-5, "alpha/beta");
}

#[test]
fn test_dot_small_grid_wraps_rows_and_columns() {
    let (rows, k, n) = (70, 9, 33);
    let s_dense = sparse_dense_matrix(rows, k, 6);
    let csr = CsrData::<u32>::from_dense(&s_dense, rows, k);
    let d = random_vec(k * n, -1.0, 1.0, 7);
    let expected = reference_dot(&s_dense, &d, rows, k, n);

    let mut out = vec![0.0f32; rows * n];
    let cfg = LaunchConfig::new((2, 1, 1), (4, 3, 1));
    unsafe {
        sparse_dense_dot_kernel(
            &cfg,
            csr.data.as_ptr(),
            csr.indices.as_ptr(),
            csr.ptr.as_ptr(),
            rows,
            d.as_ptr(),
            k,
            n,
            out.as_mut_ptr(),
            1.0,
            0.0,
        );
    }
    assert_allclose_f32(&out, &expected, 1e-5, 1e-5, "wrapped grid");
}

#[test]
fn test_empty_rows() {
    let client = create_client();
    // 3x2 with an empty middle row
    let s = CsrMatrix::new(&[4.0, 1.0], &[1i64, 0], &[0i64, 1, 1, 2], 2).unwrap();
    let dense = [1.0f32, 2.0];
    let mut out = [9.0f32; 3];
    client.sparse_dot(&s, &dense, 1, &mut out, 1.0, 0.0).unwrap();
    assert_eq!(out, [8.0, 0.0, 1.0]);
}

#[test]
fn test_elementwise_mul_only_touches_nonzeros() {
    let client = create_client();
    let (rows, cols) = (31, 17);
    let s_dense = sparse_dense_matrix(rows, cols, 8);
    let csr = CsrData::<f32>::from_dense(&s_dense, rows, cols);
    let dense = random_vec(rows * cols, 1.0, 2.0, 9);

    let mut out = vec![-7.0f32; rows * cols];
    client
        .sparse_elementwise_mul(&csr.view().unwrap(), &dense, &mut out)
        .unwrap();

    for i in 0..rows * cols {
        if s_dense[i] != 0.0 {
            assert_eq!(out[i], dense[i] * s_dense[i], "index {i}");
        } else {
            assert_eq!(out[i], -7.0, "index {i} should be untouched");
        }
    }
}

#[test]
fn test_checked_layer_rejects_bad_extents() {
    let client = create_client();
    let s = CsrMatrix::new(&[1.0], &[0usize], &[0usize, 1], 2).unwrap();
    let mut out = [0.0f32; 1];
    // dense must be 2 x n
    let err = client.sparse_dot(&s, &[1.0, 2.0, 3.0], 1, &mut out, 1.0, 0.0).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));

    let bad = CsrMatrix::new(&[1.0], &[-1.0f32], &[0.0f32, 1.0], 2).unwrap_err();
    assert!(matches!(bad, Error::InvalidSparse { .. }));
}
