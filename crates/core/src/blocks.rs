//! Block utilities
//!
//! Copy, zero-fill, XOR and swap over word slices. Every operation is
//! element-wise, so running it over `u32` or `u64` words gives exactly the
//! result of the byte loop over the same memory.

use core::ops::BitXorAssign;

use crate::params::{BLOCK_SIZE, BLOCK_WORDS};

/// One mixing block of sixteen little-endian words
pub type Block = [u32; BLOCK_WORDS];

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Machine words the utilities operate on
pub trait Word: sealed::Sealed + Copy + Default + BitXorAssign {}

impl Word for u8 {}
impl Word for u32 {}
impl Word for u64 {}

/// `dst = src`
#[inline(always)]
pub fn copy<W: Word>(dst: &mut [W], src: &[W]) {
    dst.copy_from_slice(src);
}

/// `dst = 0`
#[inline(always)]
pub fn erase<W: Word>(dst: &mut [W]) {
    dst.fill(W::default());
}

/// `dst ^= src`
#[inline(always)]
pub fn xor<W: Word>(dst: &mut [W], src: &[W]) {
    assert_eq!(dst.len(), src.len(), "xor: length mismatch");
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// Exchange the contents of `a` and `b`
#[inline(always)]
pub fn swap<W: Word>(a: &mut [W], b: &mut [W]) {
    a.swap_with_slice(b);
}

/// XOR every block of `src` into the matching block of `dst`
#[inline(always)]
pub fn xor_blocks(dst: &mut [Block], src: &[Block]) {
    assert_eq!(dst.len(), src.len(), "xor_blocks: length mismatch");
    for (d, s) in dst.iter_mut().zip(src) {
        xor(d, s);
    }
}

#[inline(always)]
pub fn block_from_le_bytes(bytes: &[u8]) -> Block {
    assert_eq!(bytes.len(), BLOCK_SIZE, "block_from_le_bytes: need 64 bytes");
    let mut block = [0u32; BLOCK_WORDS];
    for (word, chunk) in block.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    block
}

#[inline(always)]
pub fn block_to_le_bytes(block: &Block, bytes: &mut [u8]) {
    assert_eq!(bytes.len(), BLOCK_SIZE, "block_to_le_bytes: need 64 bytes");
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(block) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

/// Load a byte buffer into consecutive blocks; `bytes.len()` must be `64 * blocks.len()`
pub fn load_blocks(blocks: &mut [Block], bytes: &[u8]) {
    assert_eq!(bytes.len(), blocks.len() * BLOCK_SIZE, "load_blocks: length mismatch");
    for (block, chunk) in blocks.iter_mut().zip(bytes.chunks_exact(BLOCK_SIZE)) {
        *block = block_from_le_bytes(chunk);
    }
}

/// Inverse of [`load_blocks`]
pub fn store_blocks(blocks: &[Block], bytes: &mut [u8]) {
    assert_eq!(bytes.len(), blocks.len() * BLOCK_SIZE, "store_blocks: length mismatch");
    for (block, chunk) in blocks.iter().zip(bytes.chunks_exact_mut(BLOCK_SIZE)) {
        block_to_le_bytes(block, chunk);
    }
}
