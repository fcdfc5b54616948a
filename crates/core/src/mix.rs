//! Block mixer, SMix and the scratch arena
//!
//! A chain is `2r` blocks. The block mixer runs one cipher core over every
//! block of a chain, each block first XOR'ed with its predecessor (the
//! first block with the last), then moves even blocks to the front half
//! and odd blocks to the back half. SMix fills `N` slots of `V` with
//! successive chain states and then walks `V` at indices taken from the
//! chain's last block.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::blocks::{self, Block};
use crate::cipher::Cipher;
use crate::error::{Error, Result};
use crate::params::{BLOCK_WORDS, Config, MemoryCost, Rounds};

/// Cipher core and round count for one SMix pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MixMode {
    pub cipher: Cipher,
    pub rounds: Rounds,
}

impl MixMode {
    /// `0x0008`
    pub const SALSA20_8: MixMode = MixMode::new(Cipher::Salsa, Rounds::R8);

    /// `0x0014`
    pub const SALSA20_20: MixMode = MixMode::new(Cipher::Salsa, Rounds::R20);

    /// `0x0114`
    pub const CHACHA20_20: MixMode = MixMode::new(Cipher::ChaCha, Rounds::R20);

    pub const fn new(cipher: Cipher, rounds: Rounds) -> Self {
        Self { cipher, rounds }
    }

    /// `cipher << 8 | rounds`, with Salsa = 0 and ChaCha = 1
    pub const fn packed(self) -> u32 {
        let cipher = match self.cipher {
            Cipher::Salsa => 0,
            Cipher::ChaCha => 1,
        };
        (cipher << 8) | self.rounds.get()
    }

    pub fn from_packed(word: u32) -> Result<Self> {
        let cipher = match word >> 8 {
            0 => Cipher::Salsa,
            1 => Cipher::ChaCha,
            _ => return Err(Error::InvalidMixMode(word)),
        };
        Ok(Self::new(cipher, Rounds::new(word & 0xFF)?))
    }
}

/// XOR-chain and encrypt every block in place, wrapping from the last
#[inline(always)]
fn chain_blocks(x: &mut [Block], mode: MixMode) {
    let last = x.len() - 1;
    let (first, rest) = x.split_at_mut(1);
    blocks::xor(&mut first[0], &rest[last - 1]);
    mode.cipher.apply(&mut first[0], mode.rounds);

    for i in 1..x.len() {
        let (done, todo) = x.split_at_mut(i);
        blocks::xor(&mut todo[0], &done[i - 1]);
        mode.cipher.apply(&mut todo[0], mode.rounds);
    }
}

/// Block mix for `r = 1`: the interleave is the identity
#[inline(always)]
fn block_mix_r1(x: &mut [Block], mode: MixMode) {
    chain_blocks(x, mode);
}

/// Block mix for `r = 2`: the interleave swaps blocks 1 and 2
#[inline(always)]
fn block_mix_r2(x: &mut [Block], mode: MixMode) {
    chain_blocks(x, mode);
    let (front, back) = x.split_at_mut(2);
    blocks::swap(&mut front[1], &mut back[0]);
}

/// Block mix for any `r`, staging the interleave through `y`
pub(crate) fn block_mix_generic(x: &mut [Block], y: &mut [Block], mode: MixMode) {
    chain_blocks(x, mode);
    y.copy_from_slice(x);

    let r = x.len() / 2;
    for i in 0..r {
        x[i] = y[2 * i];
        x[i + r] = y[2 * i + 1];
    }
}

/// Mix the chain `x` in place; `y` is scratch of the same length
///
/// # Panics
///
/// If `x` is not a non-empty even number of blocks or `y` differs in length.
pub fn block_mix(x: &mut [Block], y: &mut [Block], mode: MixMode) {
    assert!(
        !x.is_empty() && x.len() % 2 == 0,
        "block_mix: chain must be 2r blocks"
    );
    assert_eq!(x.len(), y.len(), "block_mix: scratch length mismatch");

    match x.len() {
        2 => block_mix_r1(x, mode),
        4 => block_mix_r2(x, mode),
        _ => block_mix_generic(x, y, mode),
    }
}

/// SMix over `N` slots of `V`
///
/// `v` must hold exactly `N` chains of `x.len()` blocks.
pub fn smix(x: &mut [Block], y: &mut [Block], v: &mut [Block], n: MemoryCost, mode: MixMode) {
    let width = x.len();
    assert_eq!(
        v.len() as u64,
        u64::from(n.get()) * width as u64,
        "smix: V must hold N chains"
    );

    // Phase 1: fill V with successive chain states
    for slot in v.chunks_exact_mut(width) {
        slot.copy_from_slice(x);
        block_mix(x, y, mode);
    }

    // Phase 2: data-dependent lookups
    let mask = n.mask();
    for _ in 0..n.get() {
        let j = (x[width - 1][0] & mask) as usize;
        blocks::xor_blocks(x, &v[j * width..(j + 1) * width]);
        block_mix(x, y, mode);
    }
}

/// Zeroed block vector, allocated without aborting on exhaustion
pub(crate) fn alloc_blocks(count: usize, bytes: u64) -> Result<Vec<Block>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(count)
        .map_err(|_| Error::Allocation { bytes })?;
    buf.resize(count, [0u32; BLOCK_WORDS]);
    Ok(buf)
}

/// Working memory for one hash: the `X`, `Y`, `Z` chains and `V`
///
/// Sized once from the [`Config`] and wiped when dropped.
pub struct Scratch {
    pub(crate) x: Vec<Block>,
    pub(crate) y: Vec<Block>,
    pub(crate) z: Vec<Block>,
    pub(crate) v: Vec<Block>,
}

impl Scratch {
    pub fn new(config: &Config) -> Result<Self> {
        let bytes = config.scratch_bytes();
        let width = config.r.blocks();
        let slots = (config.n.get() as usize)
            .checked_mul(width)
            .ok_or(Error::Allocation { bytes })?;

        Ok(Self {
            x: alloc_blocks(width, bytes)?,
            y: alloc_blocks(width, bytes)?,
            z: alloc_blocks(width, bytes)?,
            v: alloc_blocks(slots, bytes)?,
        })
    }

    /// Total bytes held
    pub fn bytes(&self) -> u64 {
        let blocks = self.x.len() + self.y.len() + self.z.len() + self.v.len();
        (blocks * core::mem::size_of::<Block>()) as u64
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for chain in [&mut self.x, &mut self.y, &mut self.z, &mut self.v] {
            for block in chain.iter_mut() {
                blocks::erase(block);
            }
        }
    }
}
