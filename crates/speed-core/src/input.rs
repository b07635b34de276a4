//! Benchmark input buffers
//!
//! Inputs come from an injected [`RngCore`]. The generator only has to avoid
//! degenerate all-zero buffers that could hit special-cased fast paths; it is
//! not a security boundary. [`input_rng`] gives the default ChaCha8 stream.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{BenchError, Result};

/// Inputs smaller than this are allowed to come out all-zero
const DEGENERATE_CHECK_MIN: usize = 8;

/// Default input generator: seeded when reproducible runs are wanted
pub fn input_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Allocate a zeroed buffer of `size` bytes
///
/// Allocation failure is reported instead of aborting the process.
pub fn alloc_buffer(role: &'static str, size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| BenchError::Allocation { role, size })?;
    buf.resize(size, 0);
    Ok(buf)
}

/// Overwrite every byte of `buf` from `rng`
pub fn fill_random(rng: &mut dyn RngCore, role: &'static str, buf: &mut [u8]) -> Result<()> {
    rng.fill_bytes(buf);
    if buf.len() >= DEGENERATE_CHECK_MIN && buf.iter().all(|&b| b == 0) {
        return Err(BenchError::DegenerateInput {
            role,
            size: buf.len(),
        });
    }
    Ok(())
}

/// Allocate and fill a random input buffer
pub fn random_input(rng: &mut dyn RngCore, role: &'static str, size: usize) -> Result<Vec<u8>> {
    let mut buf = alloc_buffer(role, size)?;
    fill_random(rng, role, &mut buf)?;
    Ok(buf)
}

/// Fixed-size random input, for keys, nonces and salts
pub fn random_array<const N: usize>(rng: &mut dyn RngCore, role: &'static str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill_random(rng, role, &mut buf)?;
    Ok(buf)
}
