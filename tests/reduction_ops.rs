//! Integration tests for columnwise reductions and row softmax

mod common;

use common::{assert_allclose_f32, create_client, random_vec};
use lanemat::kernels::columnwise_reduce_kernel;
use lanemat::ops::ColumnReduceOp;
use lanemat::runtime::LaunchConfig;

fn reference_column<F>(mat: &[f32], height: usize, width: usize, f: F) -> Vec<f32>
where
    F: Fn(&[f32]) -> f32,
{
    (0..width).map(|c| f(&mat[c * height..(c + 1) * height])).collect()
}

// ============================================================================
// Columnwise
// ============================================================================

#[test]
fn test_columnwise_max_small() {
    let client = create_client();
    // height=3, width=2: columns [1, 7, 3] and [-4, -2, -9]
    let mat = [1.0f32, 7.0, 3.0, -4.0, -2.0, -9.0];
    let mut out = [0.0f32; 2];
    client.columnwise(ColumnReduceOp::Max, &mat, &mut out, 3, 2).unwrap();
    assert_eq!(out, [7.0, -2.0]);
}

#[test]
fn test_columnwise_tall_columns() {
    // height far above the 32-lane group
    let client = create_client();
    let (height, width) = (1000, 7);
    let mat = random_vec(height * width, -50.0, 50.0, 21);
    let mut out = vec![0.0f32; width];

    client.columnwise(ColumnReduceOp::Max, &mat, &mut out, height, width).unwrap();
    let expected = reference_column(&mat, height, width, |c| c.iter().copied().fold(f32::NEG_INFINITY, f32::max));
    assert_eq!(out, expected);

    client.columnwise(ColumnReduceOp::Min, &mat, &mut out, height, width).unwrap();
    let expected = reference_column(&mat, height, width, |c| c.iter().copied().fold(f32::INFINITY, f32::min));
    assert_eq!(out, expected);

    client.columnwise(ColumnReduceOp::Sum, &mat, &mut out, height, width).unwrap();
    let expected = reference_column(&mat, height, width, |c| c.iter().sum());
    assert_allclose_f32(&out, &expected, 1e-4, 1e-2, "sum_columnwise");
}

#[test]
fn test_columnwise_argmax_prefers_first() {
    let client = create_client();
    // column 0 has the max twice (rows 1 and 40), column 1 once at row 63
    let height = 64;
    let mut mat = vec![0.0f32; height * 2];
    mat[1] = 5.0;
    mat[40] = 5.0;
    mat[height + 63] = 2.0;
    let mut out = [0.0f32; 2];
    client.columnwise(ColumnReduceOp::Argmax, &mat, &mut out, height, 2).unwrap();
    assert_eq!(out, [1.0, 63.0]);
}

#[test]
fn test_columnwise_infinite_columns() {
    let client = create_client();
    let inf = f32::INFINITY;
    // height=3, width=2: column 0 all -inf, column 1 all +inf
    let mat = [-inf, -inf, -inf, inf, inf, inf];
    let mut out = [0.0f32; 2];

    client.columnwise(ColumnReduceOp::Max, &mat, &mut out, 3, 2).unwrap();
    assert_eq!(out, [-inf, inf]);

    client.columnwise(ColumnReduceOp::Min, &mat, &mut out, 3, 2).unwrap();
    assert_eq!(out, [-inf, inf]);

    client.columnwise(ColumnReduceOp::Argmax, &mat, &mut out, 3, 2).unwrap();
    assert_eq!(out, [0.0, 0.0]);
}

#[test]
fn test_columnwise_small_grid_wraps_columns() {
    let (height, width) = (50, 9);
    let mat = random_vec(height * width, -1.0, 1.0, 5);
    let expected = reference_column(&mat, height, width, |c| c.iter().copied().fold(f32::NEG_INFINITY, f32::max));

    // 2 blocks for 9 columns, and a group narrower than 32 lanes
    for cfg in [LaunchConfig::new((2, 1, 1), (32, 1, 1)), LaunchConfig::new((1, 1, 1), (5, 1, 1))] {
        let mut out = vec![0.0f32; width];
        unsafe {
            columnwise_reduce_kernel(&cfg, ColumnReduceOp::Max, mat.as_ptr(), out.as_mut_ptr(), width, height);
        }
        assert_eq!(out, expected, "{cfg:?}");
    }
}

// ============================================================================
// Softmax
// ============================================================================

#[test]
fn test_softmax_rows_sum_to_one() {
    let client = create_client();
    let width = 13;
    let a = random_vec(width * 40, -10.0, 10.0, 8);
    let mut out = vec![0.0f32; a.len()];
    client.softmax(&a, &mut out, width).unwrap();

    for row in out.chunks(width) {
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "row sum = {}", sum);
        assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}

#[test]
fn test_softmax_known_values() {
    let client = create_client();
    let a = [1.0f32, 2.0, 3.0, 0.0, 0.0, 0.0];
    let mut out = [0.0f32; 6];
    client.softmax(&a, &mut out, 3).unwrap();
    let third = 1.0 / 3.0;
    assert_allclose_f32(
        &out,
        &[0.090_030_57, 0.244_728_48, 0.665_240_94, third, third, third],
        1e-5,
        1e-7,
        "softmax",
    );
}

#[test]
fn test_softmax_shift_invariant_and_stable() {
    let client = create_client();
    let width = 8;
    let a = random_vec(width * 16, -5.0, 5.0, 31);
    let shifted: Vec<f32> = a.iter().map(|x| x + 1000.0).collect();

    let mut out = vec![0.0f32; a.len()];
    let mut out_shifted = vec![0.0f32; a.len()];
    client.softmax(&a, &mut out, width).unwrap();
    client.softmax(&shifted, &mut out_shifted, width).unwrap();

    // without the max subtraction exp(1000) overflows
    assert!(out_shifted.iter().all(|x| x.is_finite()));
    assert_allclose_f32(&out_shifted, &out, 1e-3, 1e-4, "shifted softmax");
}

#[test]
fn test_softmax_masked_rows() {
    let client = create_client();
    let inf = f32::INFINITY;
    // row 0 fully masked, row 1 partially masked
    let a = [-inf, -inf, -inf, -inf, 0.0, -inf, 0.0, -inf];
    let mut out = [9.0f32; 8];
    client.softmax(&a, &mut out, 4).unwrap();
    assert_eq!(out, [0.25, 0.25, 0.25, 0.25, 0.0, 0.5, 0.0, 0.5]);
}
