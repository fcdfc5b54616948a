//! FastKDF-BLAKE2s
//!
//! Two 256-byte rings: `A` is filled with the password and never changes,
//! `B` is filled with the salt and absorbs one PRF output per iteration.
//! The PRF output also picks the next ring offset, so both the key window
//! and the write position depend on the previous iteration.
//!
//! Each ring is stored with a tail copy of its head (`A`: 64 bytes for the
//! PRF input window, `B`: 32 bytes for the key window) so a window at any
//! offset is contiguous. Writes into either end of `B` are mirrored into
//! the other.

use crate::blake2s::prf;
use crate::blocks;
use crate::params::{
    KDF_BUF_SIZE, KDF_ITERATIONS, PASSWORD_LEN, POSTHASH_LEN, PREHASH_LEN, PRF_INPUT_SIZE,
    PRF_KEY_SIZE, PRF_OUTPUT_SIZE,
};

/// Repeat `src` over the ring and copy the head into the tail
fn fill_ring(ring: &mut [u8], src: &[u8]) {
    for chunk in ring[..KDF_BUF_SIZE].chunks_mut(src.len()) {
        chunk.copy_from_slice(&src[..chunk.len()]);
    }
    let tail = ring.len() - KDF_BUF_SIZE;
    ring.copy_within(..tail, KDF_BUF_SIZE);
}

/// Derive `output.len()` bytes (at most 256) from `password` and `salt`
///
/// Inputs longer than 256 bytes are truncated to 256. Output bytes past
/// 256 are left untouched.
///
/// # Panics
///
/// If `password` or `salt` is empty.
pub fn fastkdf(password: &[u8], salt: &[u8], output: &mut [u8]) {
    assert!(!password.is_empty(), "fastkdf: empty password");
    assert!(!salt.is_empty(), "fastkdf: empty salt");

    let password = &password[..password.len().min(KDF_BUF_SIZE)];
    let salt = &salt[..salt.len().min(KDF_BUF_SIZE)];

    let mut a = [0u8; KDF_BUF_SIZE + PRF_INPUT_SIZE];
    let mut b = [0u8; KDF_BUF_SIZE + PRF_KEY_SIZE];
    fill_ring(&mut a, password);
    fill_ring(&mut b, salt);

    let mut bufptr = 0usize;
    for _ in 0..KDF_ITERATIONS {
        let prf_output = prf(
            &b[bufptr..bufptr + PRF_KEY_SIZE],
            &a[bufptr..bufptr + PRF_INPUT_SIZE],
        );

        // Byte sum of the output, reduced to a ring offset
        bufptr = prf_output.iter().map(|&byte| byte as usize).sum::<usize>() & (KDF_BUF_SIZE - 1);

        blocks::xor(&mut b[bufptr..bufptr + PRF_OUTPUT_SIZE], &prf_output);

        // Head modified, tail updated
        if bufptr < PRF_KEY_SIZE {
            let len = PRF_OUTPUT_SIZE.min(PRF_KEY_SIZE - bufptr);
            b.copy_within(bufptr..bufptr + len, KDF_BUF_SIZE + bufptr);
        }

        // Tail modified, head updated
        if KDF_BUF_SIZE - bufptr < PRF_OUTPUT_SIZE {
            let len = PRF_OUTPUT_SIZE - (KDF_BUF_SIZE - bufptr);
            b.copy_within(KDF_BUF_SIZE..KDF_BUF_SIZE + len, 0);
        }
    }

    let output_len = output.len().min(KDF_BUF_SIZE);
    let head = KDF_BUF_SIZE - bufptr;

    if head >= output_len {
        blocks::xor(&mut b[bufptr..bufptr + output_len], &a[..output_len]);
        blocks::copy(&mut output[..output_len], &b[bufptr..bufptr + output_len]);
    } else {
        let wrapped = output_len - head;
        blocks::xor(&mut b[bufptr..KDF_BUF_SIZE], &a[..head]);
        blocks::xor(&mut b[..wrapped], &a[head..output_len]);
        blocks::copy(&mut output[..head], &b[bufptr..KDF_BUF_SIZE]);
        blocks::copy(&mut output[head..output_len], &b[..wrapped]);
    }

    blocks::erase(&mut a);
    blocks::erase(&mut b);
}

/// Pre-hash mode: 256 bytes keyed by the password itself
pub fn prehash(password: &[u8; PASSWORD_LEN]) -> [u8; PREHASH_LEN] {
    let mut out = [0u8; PREHASH_LEN];
    fastkdf(password, password, &mut out);
    out
}

/// Post-hash mode: the 32-byte digest salted with the mixed state
pub fn posthash(password: &[u8; PASSWORD_LEN], salt: &[u8]) -> [u8; POSTHASH_LEN] {
    let mut out = [0u8; POSTHASH_LEN];
    fastkdf(password, salt, &mut out);
    out
}
