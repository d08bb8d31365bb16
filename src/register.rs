//! Derives `(index, rho)` from a hash and a precision, with the rarely
//! exercised rehash fallback for an all-zero tail.

use crate::hash::murmur_hash64a;

#[inline(always)]
fn clz64(x: u64) -> u32 {
    x.leading_zeros()
}

/// `index = H >> (64-b)` (high b bits), `rho` = 1-based position of the
/// leading 1-bit of the remaining `(64-b)`-bit tail, capped at `64-b+1`.
pub fn register_rule(hash: u64, b: u32) -> (u32, u8) {
    debug_assert!((4..=18).contains(&b));

    let window_bits = 64 - b;
    let index = (hash >> window_bits) as u32;
    let tail = hash << b;
    let cap = window_bits + 1;

    let rho = if tail != 0 {
        clz64(tail) + 1
    } else {
        rehash_fallback(hash, window_bits)
    };

    (index, rho.min(cap) as u8)
}

/// Only reached when the `(64-b)`-bit tail was entirely zero, which happens
/// with probability `2^-(64-b)`. Rehashes a deterministic function of the
/// original hash until a nonzero value is found or the safety counter
/// (`64-b` rounds) is exhausted, then folds the result into the rho
/// accumulator. Always terminates and returns a value in `[1, 64-b+1]`.
fn rehash_fallback(hash: u64, window_bits: u32) -> u32 {
    let cap = window_bits + 1;
    let mut rho = window_bits;
    let mut material = hash;

    for round in 1..=window_bits {
        material = murmur_hash64a(&material.to_le_bytes(), round as u64);
        if material != 0 {
            rho = rho.saturating_add(clz64(material) + 1);
            break;
        }
    }

    rho.min(cap)
}
