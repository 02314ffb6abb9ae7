//! Multiply-with-carry multiplier provisioning
//!
//! A multiplier `a` gives a full-period generator when `p = a * 2^32 - 1`
//! is a safe prime, i.e. both `p` and `(p - 1) / 2` are prime. Banks are
//! normally loaded from a whitespace-separated text file; [`generate_multipliers`]
//! recomputes such a list from scratch.

use crate::error::{Error, Result};
use log::debug;
use std::path::Path;

const SMALL_PRIMES: [u64; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// Witness set that makes Miller-Rabin exact for every u64
const MR_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

#[inline(always)]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

/// Deterministic primality test for 64-bit integers
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &SMALL_PRIMES {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }

    let mut d = n - 1;
    let mut s = 0;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'witness: for &a in &MR_BASES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Whether `a` yields a safe-prime multiply-with-carry generator
pub fn is_safe_multiplier(a: u32) -> bool {
    let p = ((a as u64) << 32).wrapping_sub(1);
    a > 1 && is_prime_u64(p) && is_prime_u64(p / 2)
}

/// Search downward from `u32::MAX` for `count` safe multipliers
///
/// The result is sorted in descending order and is identical on every call.
pub fn generate_multipliers(count: usize) -> Vec<u32> {
    let mut found = Vec::with_capacity(count);
    let mut a = u32::MAX;
    while found.len() < count && a > 1 {
        if is_safe_multiplier(a) {
            found.push(a);
        }
        a -= 1;
    }
    debug!("generated {} multiplier(s), lowest {:?}", found.len(), found.last());
    found
}

/// Parse whitespace-separated decimal multipliers
pub fn parse_multipliers(text: &str) -> Result<Vec<u32>> {
    let mults = text
        .split_whitespace()
        .enumerate()
        .map(|(i, tok)| {
            tok.parse::<u32>().map_err(|e| {
                Error::invalid_argument("multipliers", format!("token {i} ({tok:?}): {e}"))
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    if mults.is_empty() {
        return Err(Error::invalid_argument("multipliers", "no multipliers found"));
    }
    Ok(mults)
}

/// Load a multiplier file
pub fn load_multipliers(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mults = parse_multipliers(&text)?;
    debug!("loaded {} multiplier(s) from {}", mults.len(), path.display());
    Ok(mults)
}
