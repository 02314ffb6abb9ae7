//! Integration tests for the C entry points
#![cfg(feature = "ffi")]

mod common;

use common::{TEST_MULTS, reference_transpose};
use lanemat::ffi::*;
use lanemat::runtime::Dim3;
use lanemat::runtime::launch::{BLOCK_SIZE, COPY_BLOCK_SIZE};
use std::ptr;

fn linear(grid: u32, block: u32) -> LanematLaunch {
    LanematLaunch {
        grid: Dim3::linear(grid),
        block: Dim3::linear(block),
    }
}

#[test]
fn test_null_pointers_are_reported() {
    let a = [1.0f32; 4];
    let status = unsafe { lanemat_apply_exp(linear(1, 4), a.as_ptr(), ptr::null_mut(), 4) };
    assert_eq!(status, LANEMAT_ERR_NULL_POINTER);

    let mut words = [0u64; 4];
    let status = unsafe { lanemat_seed_random(1, ptr::null(), words.as_mut_ptr(), 4) };
    assert_eq!(status, LANEMAT_ERR_NULL_POINTER);
}

#[test]
fn test_empty_launch_is_rejected() {
    let a = [1.0f32; 4];
    let mut out = [0.0f32; 4];
    let status = unsafe { lanemat_apply_exp(linear(0, BLOCK_SIZE), a.as_ptr(), out.as_mut_ptr(), 4) };
    assert_eq!(status, LANEMAT_ERR_INVALID_LAUNCH);
    assert_eq!(out, [0.0; 4]);
}

#[test]
fn test_softmax_zero_width_is_rejected() {
    let a = [1.0f32, 2.0];
    let mut out = [7.0f32; 2];
    let status = unsafe { lanemat_softmax(linear(1, 2), a.as_ptr(), out.as_mut_ptr(), 0, 2) };
    assert_eq!(status, LANEMAT_ERR_INVALID_LAUNCH);
    assert_eq!(out, [7.0; 2]);

    let status = unsafe { lanemat_softmax(linear(1, 2), a.as_ptr(), out.as_mut_ptr(), 2, 2) };
    assert_eq!(status, LANEMAT_OK);
    assert!((out[0] + out[1] - 1.0).abs() < 1e-6);
}

#[test]
fn test_sign_and_scalar_entry_points() {
    let a = [-2.0f32, 0.0, 3.0];
    let mut out = [5.0f32; 3];
    unsafe {
        assert_eq!(lanemat_apply_sign(linear(1, 2), a.as_ptr(), out.as_mut_ptr(), 3), LANEMAT_OK);
        assert_eq!(out, [-1.0, 0.0, 1.0]);
        assert_eq!(
            lanemat_mult_by_scalar(linear(1, 1), a.as_ptr(), 2.0, out.as_mut_ptr(), 3),
            LANEMAT_OK
        );
        assert_eq!(out, [-4.0, 0.0, 6.0]);
        assert_eq!(
            lanemat_less_than_scalar(linear(2, 2), a.as_ptr(), 0.5, out.as_mut_ptr(), 3),
            LANEMAT_OK
        );
        assert_eq!(out, [1.0, 1.0, 0.0]);
    }
}

#[test]
fn test_add_col_vector_entry_point() {
    let mat = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let vec = [10.0f32, 20.0, 30.0];
    let mut out = [0.0f32; 6];
    let status = unsafe {
        lanemat_add_col_vector(linear(1, 4), mat.as_ptr(), vec.as_ptr(), out.as_mut_ptr(), 2, 3)
    };
    assert_eq!(status, LANEMAT_OK);
    assert_eq!(out, [11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
}

#[test]
fn test_random_entry_points_match_stream_bank() {
    let n = TEST_MULTS.len();
    let mut words = vec![0u64; n];
    let mut out = vec![0.0f32; 40];
    unsafe {
        assert_eq!(lanemat_seed_random(17, TEST_MULTS.as_ptr(), words.as_mut_ptr(), n), LANEMAT_OK);
        assert_eq!(
            lanemat_random_uniform(TEST_MULTS.as_ptr(), words.as_mut_ptr(), n, out.as_mut_ptr(), 40),
            LANEMAT_OK
        );
    }

    let mut bank = lanemat::random::StreamBank::new(TEST_MULTS.to_vec()).unwrap();
    bank.seed(17);
    let mut expected = vec![0.0f32; 40];
    bank.sample_uniform(&mut expected).unwrap();
    assert_eq!(out, expected);
    assert_eq!(words.as_slice(), bank.words());
}

#[test]
fn test_transpose_entry_point() {
    let (height, width) = (19, 5);
    let a: Vec<f32> = (0..height * width).map(|i| i as f32).collect();
    let mut out = vec![0.0f32; a.len()];
    let launch = LanematLaunch {
        grid: Dim3::planar(2, 1),
        block: Dim3::planar(COPY_BLOCK_SIZE, COPY_BLOCK_SIZE),
    };
    let status = unsafe { lanemat_transpose(launch, a.as_ptr(), out.as_mut_ptr(), height, width) };
    assert_eq!(status, LANEMAT_OK);
    assert_eq!(out, reference_transpose(&a, height, width));
}

#[test]
fn test_sparse_entry_point() {
    let data = [1.0f32, 2.0];
    let indices = [0.0f32, 2.0];
    let ptr_arr = [0.0f32, 2.0];
    let dense = [5.0f32, 6.0, 7.0];
    let mut out = [f32::NAN];
    let launch = LanematLaunch {
        grid: Dim3::planar(1, 1),
        block: Dim3::planar(16, 16),
    };
    let status = unsafe {
        lanemat_sparse_dense_dot(
            launch,
            data.as_ptr(),
            indices.as_ptr(),
            ptr_arr.as_ptr(),
            1,
            dense.as_ptr(),
            3,
            1,
            out.as_mut_ptr(),
            1.0,
            0.0,
        )
    };
    assert_eq!(status, LANEMAT_OK);
    assert_eq!(out, [19.0]);
}
