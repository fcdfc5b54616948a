//! Error types
//!
//! Every variant except [`Error::Allocation`] is a rejected caller
//! contract, raised while decoding a profile or building a hasher.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid round count {0}: must be even and in 2..=254")]
    InvalidRounds(u32),

    #[error("Invalid memory cost N = {0}: must be a power of two in 2..=2^31")]
    InvalidMemoryCost(u64),

    #[error("Invalid block factor r = {0}: must be a power of two in 1..=128")]
    InvalidBlockFactor(u32),

    #[error("Unsupported KDF sub-mode {0:#06b}: only FastKDF (0000) is available")]
    UnsupportedKdf(u32),

    #[error("Invalid mix mode {0:#06x}: cipher must be 0 (Salsa) or 1 (ChaCha)")]
    InvalidMixMode(u32),

    #[error("Reserved profile bits set: {0:#010x}")]
    ReservedBits(u32),

    #[error("Invalid digest length {0}: must be in 1..=32")]
    InvalidDigestLength(usize),

    #[error("Invalid key length {0}: must be in 0..=32")]
    InvalidKeyLength(usize),

    #[error("Failed to allocate {bytes} bytes of scratch memory")]
    Allocation { bytes: u64 },
}

pub type Result<T> = core::result::Result<T, Error>;
