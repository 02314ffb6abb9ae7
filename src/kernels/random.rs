//! Multiply-with-carry random kernels
//!
//! Every lane owns one 64-bit generator word and one 32-bit multiplier. A
//! step is `word' = mult * low32(word) + high32(word)`; the low half of the
//! new word is the output. Lanes stride across the output by the bank width,
//! so `out[i]` and `out[i + num_streams]` come from the same lane.
//!
//! The lane geometry is the bank width: replaying a sequence needs the seed,
//! the multipliers *and* the number of streams.

use std::f32::consts::PI;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Generator steps taken after seeding, before any output is drawn
pub const NUM_RND_BURNIN: usize = 100;

/// 2^32 as f32, the uniform scale
const TWO_POW_32: f32 = 4_294_967_296.0;

/// One multiply-with-carry step
#[inline(always)]
pub fn mwc_step(word: u64, mult: u32) -> u64 {
    (mult as u64)
        .wrapping_mul(word & 0xFFFF_FFFF)
        .wrapping_add(word >> 32)
}

/// Map the low half of a generator word into (0, 1]
///
/// The `+ 1` keeps zero out of range (so `ln` never sees it); f32 rounding
/// of the largest words lands exactly on 1.0.
#[inline(always)]
pub fn word_to_uniform(word: u64) -> f32 {
    ((word as u32) as f32 + 1.0) / TWO_POW_32
}

/// Advance one lane and return its next uniform sample
#[inline(always)]
fn next_uniform(word: &mut u64, mult: u32) -> f32 {
    *word = mwc_step(*word, mult);
    word_to_uniform(*word)
}

/// Run `lane_fn(lane, mult, word)` for every stream, in parallel if enabled
///
/// # Safety
/// - `mults` and `words` must be valid for `num_streams` elements
#[inline]
unsafe fn for_each_stream<F>(mults: *const u32, words: *mut u64, num_streams: usize, lane_fn: F)
where
    F: Fn(usize, u32, &mut u64) + Sync + Send,
{
    let mults = std::slice::from_raw_parts(mults, num_streams);
    let words = std::slice::from_raw_parts_mut(words, num_streams);

    #[cfg(feature = "rayon")]
    {
        words
            .par_iter_mut()
            .zip(mults.par_iter())
            .enumerate()
            .for_each(|(lane, (word, &mult))| lane_fn(lane, mult, word));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (lane, (word, &mult)) in words.iter_mut().zip(mults.iter()).enumerate() {
            lane_fn(lane, mult, word);
        }
    }
}

/// Seed every stream: `word = (seed << 32) | 1`, then `NUM_RND_BURNIN` steps
///
/// # Safety
/// - `mults` and `words` must be valid pointers to `num_streams` elements
pub unsafe fn seed_random_kernel(seed: u32, mults: *const u32, words: *mut u64, num_streams: usize) {
    for_each_stream(mults, words, num_streams, |_, mult, word| {
        let mut w = ((seed as u64) << 32) | 1;
        for _ in 0..NUM_RND_BURNIN {
            w = mwc_step(w, mult);
        }
        *word = w;
    });
}

/// Fill `out` with uniform samples in (0, 1]
///
/// Lane `l` writes `out[l], out[l + num_streams], ...` and leaves its
/// advanced word in `words[l]`.
///
/// # Safety
/// - `mults` and `words` must be valid pointers to `num_streams` elements
/// - `out` must be a valid pointer to `numel` elements
pub unsafe fn random_uniform_kernel(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    out: *mut f32,
    numel: usize,
) {
    let out_addr = out as usize;
    for_each_stream(mults, words, num_streams, |lane, mult, word| {
        let out = out_addr as *mut f32;
        let mut w = *word;
        let mut i = lane;
        while i < numel {
            unsafe { *out.add(i) = next_uniform(&mut w, mult) };
            i += num_streams;
        }
        *word = w;
    });
}

/// Shared Box-Muller loop for the Gaussian kernels
///
/// Each lane handles index pairs `(i, i + num_streams)` with
/// `i = lane, lane + 2*num_streams, ...`. Two draws are consumed per pair
/// even when the sine partner falls past `numel` and is dropped.
#[inline]
unsafe fn gaussian_pairs<W>(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    numel: usize,
    write: W,
) where
    W: Fn(usize, f32) + Sync + Send,
{
    for_each_stream(mults, words, num_streams, |lane, mult, word| {
        let mut w = *word;
        let mut i = lane;
        while i < numel {
            let u1 = next_uniform(&mut w, mult);
            let u2 = next_uniform(&mut w, mult);
            let r = (-2.0 * u1.ln()).sqrt();
            let t = 2.0 * PI * u2;
            write(i, r * t.cos());
            if i + num_streams < numel {
                write(i + num_streams, r * t.sin());
            }
            i += 2 * num_streams;
        }
        *word = w;
    });
}

/// Fill `out` with standard normal samples (Box-Muller)
///
/// # Safety
/// - `mults` and `words` must be valid pointers to `num_streams` elements
/// - `out` must be a valid pointer to `numel` elements
pub unsafe fn random_gaussian_kernel(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    out: *mut f32,
    numel: usize,
) {
    let out_addr = out as usize;
    gaussian_pairs(mults, words, num_streams, numel, |i, z| unsafe {
        *(out_addr as *mut f32).add(i) = z;
    });
}

/// `out[i] = mat[i] + stddev * N(0, 1)`, with the same draw schedule as
/// [`random_gaussian_kernel`]
///
/// # Safety
/// - `mults` and `words` must be valid pointers to `num_streams` elements
/// - `mat` and `out` must be valid pointers to `numel` elements
/// - `out` may alias `mat` (each index is read once, then written)
pub unsafe fn add_gaussian_noise_kernel(
    mults: *const u32,
    words: *mut u64,
    num_streams: usize,
    mat: *const f32,
    out: *mut f32,
    numel: usize,
    stddev: f32,
) {
    let mat_addr = mat as usize;
    let out_addr = out as usize;
    gaussian_pairs(mults, words, num_streams, numel, |i, z| unsafe {
        let x = *(mat_addr as *const f32).add(i);
        *(out_addr as *mut f32).add(i) = x + stddev * z;
    });
}
