//! Lane-parallel random stream bank
//!
//! A [`StreamBank`] owns the two per-lane arrays the random kernels thread
//! through every call: the fixed multipliers and the mutable generator words.
//! Seeding is explicit; sampling continues the sequence left by the previous
//! call on the same bank.
//!
//! ```rust,ignore
//! let mut bank = StreamBank::new(load_multipliers("rnd_multipliers_32bit.txt")?)?;
//! bank.seed(42);
//! let mut noise = vec![0.0f32; 1024];
//! bank.sample_gaussian(&mut noise)?;
//! ```

mod multipliers;

pub use multipliers::{
    generate_multipliers, is_prime_u64, is_safe_multiplier, load_multipliers, parse_multipliers,
};

use crate::error::{Error, Result};
use crate::kernels::{
    add_gaussian_noise_kernel, random_gaussian_kernel, random_uniform_kernel, seed_random_kernel,
};
use log::info;
use std::path::Path;

pub use crate::kernels::random::NUM_RND_BURNIN;

/// Blocks in the default random launch
pub const NUM_RND_BLOCKS: usize = 96;

/// Threads per block in the default random launch
pub const NUM_RND_THREADS_PER_BLOCK: usize = 128;

/// Default bank width (lanes sampling in parallel)
pub const NUM_RND_STREAMS: usize = NUM_RND_BLOCKS * NUM_RND_THREADS_PER_BLOCK;

/// Per-lane generator state: multipliers plus 64-bit words
#[derive(Clone, Debug)]
pub struct StreamBank {
    mults: Vec<u32>,
    words: Vec<u64>,
    seeded: bool,
}

impl StreamBank {
    /// Create an unseeded bank with one lane per multiplier
    pub fn new(mults: Vec<u32>) -> Result<Self> {
        if mults.is_empty() {
            return Err(Error::invalid_argument(
                "mults",
                "stream bank needs at least one lane",
            ));
        }
        let words = vec![0u64; mults.len()];
        Ok(Self {
            mults,
            words,
            seeded: false,
        })
    }

    /// Load the multipliers from a text file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(load_multipliers(path)?)
    }

    /// Build a bank of `num_streams` freshly searched safe multipliers
    pub fn generated(num_streams: usize) -> Result<Self> {
        Self::new(generate_multipliers(num_streams))
    }

    /// Build a bank of [`NUM_RND_STREAMS`] generated multipliers
    ///
    /// The search at this width takes seconds; [`StreamBank::from_file`] is
    /// the fast path for a precomputed list.
    pub fn default_width() -> Result<Self> {
        Self::generated(NUM_RND_STREAMS)
    }

    /// Restore a bank from recorded multipliers and words
    ///
    /// The restored bank continues exactly where the recorded one stopped.
    pub fn from_parts(mults: Vec<u32>, words: Vec<u64>) -> Result<Self> {
        if words.len() != mults.len() {
            return Err(Error::shape_mismatch(&[mults.len()], &[words.len()]));
        }
        let mut bank = Self::new(mults)?;
        bank.words = words;
        bank.seeded = true;
        Ok(bank)
    }

    /// Number of lanes (streams)
    #[inline]
    pub fn len(&self) -> usize {
        self.mults.len()
    }

    /// Always false; a bank has at least one lane
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mults.is_empty()
    }

    /// Per-lane multipliers
    pub fn mults(&self) -> &[u32] {
        &self.mults
    }

    /// Current per-lane generator words
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Whether [`StreamBank::seed`] (or [`StreamBank::from_parts`]) ran
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Reset every lane from `seed` and run the burn-in
    pub fn seed(&mut self, seed: u32) {
        unsafe {
            seed_random_kernel(
                seed,
                self.mults.as_ptr(),
                self.words.as_mut_ptr(),
                self.len(),
            );
        }
        self.seeded = true;
        info!("seeded {} random stream(s) with seed {seed}", self.len());
    }

    fn ensure_seeded(&self) -> Result<()> {
        if self.seeded {
            Ok(())
        } else {
            Err(Error::RandomNotInitialized)
        }
    }

    /// Fill `out` with uniform samples in (0, 1]
    pub fn sample_uniform(&mut self, out: &mut [f32]) -> Result<()> {
        self.ensure_seeded()?;
        unsafe {
            random_uniform_kernel(
                self.mults.as_ptr(),
                self.words.as_mut_ptr(),
                self.len(),
                out.as_mut_ptr(),
                out.len(),
            );
        }
        Ok(())
    }

    /// Fill `out` with standard normal samples
    pub fn sample_gaussian(&mut self, out: &mut [f32]) -> Result<()> {
        self.ensure_seeded()?;
        unsafe {
            random_gaussian_kernel(
                self.mults.as_ptr(),
                self.words.as_mut_ptr(),
                self.len(),
                out.as_mut_ptr(),
                out.len(),
            );
        }
        Ok(())
    }

    /// `out[i] = mat[i] + stddev * N(0, 1)`
    pub fn add_gaussian_noise(&mut self, mat: &[f32], out: &mut [f32], stddev: f32) -> Result<()> {
        self.ensure_seeded()?;
        if mat.len() != out.len() {
            return Err(Error::shape_mismatch(&[mat.len()], &[out.len()]));
        }
        unsafe {
            add_gaussian_noise_kernel(
                self.mults.as_ptr(),
                self.words.as_mut_ptr(),
                self.len(),
                mat.as_ptr(),
                out.as_mut_ptr(),
                out.len(),
                stddev,
            );
        }
        Ok(())
    }

    /// In-place variant of [`StreamBank::add_gaussian_noise`]
    pub fn add_gaussian_noise_inplace(&mut self, mat: &mut [f32], stddev: f32) -> Result<()> {
        self.ensure_seeded()?;
        let ptr = mat.as_mut_ptr();
        unsafe {
            add_gaussian_noise_kernel(
                self.mults.as_ptr(),
                self.words.as_mut_ptr(),
                self.len(),
                ptr,
                ptr,
                mat.len(),
                stddev,
            );
        }
        Ok(())
    }
}
