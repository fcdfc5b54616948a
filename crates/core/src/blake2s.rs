//! BLAKE2s compression, incremental hashing and the FastKDF PRF
//!
//! The update path keeps a double-block buffer and only compresses when
//! more input arrives than the buffer can hold, so the final block is
//! always available for the finalisation flag.

use crate::blocks::{self, Block, block_from_le_bytes};
use crate::error::{Error, Result};
use crate::params::{BLOCK_WORDS, PRF_INPUT_SIZE, PRF_KEY_SIZE, PRF_OUTPUT_SIZE};

/// Compression block size in bytes
pub const BLOCKBYTES: usize = 64;

/// Maximum digest length
pub const OUTBYTES: usize = 32;

/// Maximum key length
pub const KEYBYTES: usize = 32;

const IV: [u32; 8] = [
    0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A, 0x510E527F, 0x9B05688C, 0x1F83D9AB, 0x5BE0CD19,
];

/// Parameter block word 0: digest length, key length, fanout, depth
const fn param_word(out_len: usize, key_len: usize) -> u32 {
    (out_len as u32) | ((key_len as u32) << 8) | (1 << 16) | (1 << 24)
}

/// IV with the FastKDF parameter block (32-byte digest and key) XOR'ed in
const IV_PRF: [u32; 8] = [
    IV[0] ^ param_word(PRF_OUTPUT_SIZE, PRF_KEY_SIZE),
    IV[1],
    IV[2],
    IV[3],
    IV[4],
    IV[5],
    IV[6],
    IV[7],
];

/// Message word schedule, one permutation per round
const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

const ROUNDS: usize = 10;

#[inline(always)]
fn g(v: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, x: u32, y: u32) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

/// Compress one message block into the chain value `h`
///
/// `counter` is the total byte count including this block; `last` sets
/// the finalisation flag `f0`.
pub fn compress(h: &mut [u32; 8], m: &Block, counter: u64, last: bool) {
    let mut v = [0u32; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= counter as u32;
    v[13] ^= (counter >> 32) as u32;
    if last {
        v[14] = !v[14];
    }

    for round in 0..ROUNDS {
        let s = &SIGMA[round % SIGMA.len()];
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// A finished BLAKE2s digest of 1 to 32 bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Digest {
    bytes: [u8; OUTBYTES],
    len: usize,
}

impl Digest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    // Never empty: the constructor rejects a zero output length
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Incremental BLAKE2s state
#[derive(Clone)]
pub struct Blake2s {
    h: [u32; 8],
    t: u64,
    buf: [u8; 2 * BLOCKBYTES],
    buflen: usize,
    out_len: usize,
}

impl Blake2s {
    /// Unkeyed hasher producing `out_len` bytes
    pub fn new(out_len: usize) -> Result<Self> {
        Self::new_keyed(&[], out_len)
    }

    /// Keyed hasher; a non-empty key is processed as the first block
    pub fn new_keyed(key: &[u8], out_len: usize) -> Result<Self> {
        if out_len == 0 || out_len > OUTBYTES {
            return Err(Error::InvalidDigestLength(out_len));
        }
        if key.len() > KEYBYTES {
            return Err(Error::InvalidKeyLength(key.len()));
        }

        let mut h = IV;
        h[0] ^= param_word(out_len, key.len());

        let mut state = Self {
            h,
            t: 0,
            buf: [0u8; 2 * BLOCKBYTES],
            buflen: 0,
            out_len,
        };

        if !key.is_empty() {
            let mut block = [0u8; BLOCKBYTES];
            block[..key.len()].copy_from_slice(key);
            state.update(&block);
            blocks::erase(&mut block);
        }

        Ok(state)
    }

    pub fn update(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            let left = self.buflen;
            let fill = 2 * BLOCKBYTES - left;

            if input.len() > fill {
                self.buf[left..].copy_from_slice(&input[..fill]);
                self.buflen += fill;
                self.t += BLOCKBYTES as u64;
                self.compress_head(false);
                // Shift the second block down
                self.buf.copy_within(BLOCKBYTES.., 0);
                self.buflen -= BLOCKBYTES;
                input = &input[fill..];
            } else {
                self.buf[left..left + input.len()].copy_from_slice(input);
                self.buflen += input.len();
                input = &[];
            }
        }
    }

    pub fn finalize(mut self) -> Digest {
        if self.buflen > BLOCKBYTES {
            self.t += BLOCKBYTES as u64;
            self.compress_head(false);
            self.buf.copy_within(BLOCKBYTES..self.buflen, 0);
            self.buflen -= BLOCKBYTES;
        }

        self.t += self.buflen as u64;
        let buflen = self.buflen;
        blocks::erase(&mut self.buf[buflen..]);
        self.compress_head(true);

        let mut bytes = [0u8; OUTBYTES];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.h.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        blocks::erase(&mut bytes[self.out_len..]);

        Digest {
            bytes,
            len: self.out_len,
        }
    }

    #[inline(always)]
    fn compress_head(&mut self, last: bool) {
        let m = block_from_le_bytes(&self.buf[..BLOCKBYTES]);
        compress(&mut self.h, &m, self.t, last);
    }
}

impl Drop for Blake2s {
    fn drop(&mut self) {
        blocks::erase(&mut self.h);
        blocks::erase(&mut self.buf);
    }
}

/// One-shot keyed BLAKE2s; `out.len()` is the digest length
pub fn keyed_hash(key: &[u8], input: &[u8], out: &mut [u8]) -> Result<()> {
    let mut state = Blake2s::new_keyed(key, out.len())?;
    state.update(input);
    out.copy_from_slice(state.finalize().as_bytes());
    Ok(())
}

/// FastKDF PRF: BLAKE2s-256 of a 64-byte input under a 32-byte key
///
/// Equivalent to `keyed_hash(key, input, &mut [0; 32])`, minus the
/// buffering: the key block and the input block are compressed directly.
pub fn prf(key: &[u8], input: &[u8]) -> [u8; PRF_OUTPUT_SIZE] {
    assert_eq!(key.len(), PRF_KEY_SIZE, "prf: key must be 32 bytes");
    assert_eq!(input.len(), PRF_INPUT_SIZE, "prf: input must be 64 bytes");

    let mut h = IV_PRF;

    let mut key_block = [0u32; BLOCK_WORDS];
    for (word, chunk) in key_block.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    compress(&mut h, &key_block, BLOCKBYTES as u64, false);

    let message = block_from_le_bytes(input);
    compress(&mut h, &message, 2 * BLOCKBYTES as u64, true);

    let mut out = [0u8; PRF_OUTPUT_SIZE];
    for (chunk, word) in out.chunks_exact_mut(4).zip(h.iter()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}
