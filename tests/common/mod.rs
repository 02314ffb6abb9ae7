//! Common test utilities
#![allow(dead_code)]

use lanemat::runtime::KernelClient;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Multipliers known to pass the safe-multiplier test (from the top of the search)
pub const TEST_MULTS: [u32; 4] = [4294967118, 4294966893, 4294966830, 4294966284];

/// Create a client with logging captured by the test harness
pub fn create_client() -> KernelClient {
    let _ = env_logger::builder().is_test(true).try_init();
    KernelClient::new()
}

/// Create a client with an initialized stream bank
pub fn create_seeded_client(num_streams: usize, seed: u32) -> KernelClient {
    let client = create_client();
    let mults: Vec<u32> = TEST_MULTS.iter().copied().cycle().take(num_streams).collect();
    client.init_random(mults, seed).unwrap();
    client
}

/// Deterministic pseudo-random test data in `[lo, hi)`
pub fn random_vec(len: usize, lo: f32, hi: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(lo..hi)).collect()
}

/// Reference transpose of a column-major `height x width` matrix
pub fn reference_transpose(a: &[f32], height: usize, width: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; a.len()];
    for c in 0..width {
        for r in 0..height {
            out[r * width + c] = a[c * height + r];
        }
    }
    out
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}
