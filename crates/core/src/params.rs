//! NeoScrypt parameters and profile decoding
//!
//! The wire-level profile word is decoded once into a [`Config`], whose
//! fields are typed so that an odd round count, a non-power-of-two `N` or
//! an out-of-range `r` cannot reach the mixing code.

use crate::cipher::Cipher;
use crate::error::{Error, Result};
use crate::mix::MixMode;

/// Mixing block size in bytes
pub const BLOCK_SIZE: usize = 64;

/// Mixing block size in 32-bit words
pub const BLOCK_WORDS: usize = 16;

/// Password (block header) size in bytes
pub const PASSWORD_LEN: usize = 80;

/// Digest size in bytes
pub const DIGEST_LEN: usize = 32;

/// FastKDF ring buffer size
pub const KDF_BUF_SIZE: usize = 256;

/// BLAKE2s input window per FastKDF iteration
pub const PRF_INPUT_SIZE: usize = 64;

/// BLAKE2s key window per FastKDF iteration
pub const PRF_KEY_SIZE: usize = 32;

/// BLAKE2s output size inside FastKDF
pub const PRF_OUTPUT_SIZE: usize = 32;

/// FastKDF iteration count
pub const KDF_ITERATIONS: usize = 32;

/// FastKDF output length before SMix
pub const PREHASH_LEN: usize = 256;

/// FastKDF output length after SMix
pub const POSTHASH_LEN: usize = DIGEST_LEN;

/// Classic NeoScrypt memory cost
pub const DEFAULT_N: u32 = 128;

/// Classic NeoScrypt block factor
pub const DEFAULT_R: u32 = 2;

/// Scrypt-compatible memory cost
pub const SCRYPT_N: u32 = 1024;

/// Scrypt-compatible block factor
pub const SCRYPT_R: u32 = 1;

/// An even stream-cipher round count in `2..=254`
///
/// The upper bound keeps the count representable in the low byte of a
/// packed [`MixMode`] word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rounds(u32);

impl Rounds {
    /// Salsa20/8, the scrypt-compatible core
    pub const R8: Rounds = Rounds(8);

    /// Salsa20/20 and ChaCha20/20, the classic NeoScrypt cores
    pub const R20: Rounds = Rounds(20);

    pub fn new(rounds: u32) -> Result<Self> {
        if rounds == 0 || rounds % 2 != 0 || rounds > 254 {
            return Err(Error::InvalidRounds(rounds));
        }
        Ok(Self(rounds))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Number of double-rounds (column + row, or column + diagonal)
    pub const fn double_rounds(self) -> u32 {
        self.0 / 2
    }
}

/// Memory cost `N`: always a power of two in `2..=2^31`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryCost(u32);

impl MemoryCost {
    pub fn new(n: u32) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(Error::InvalidMemoryCost(u64::from(n)));
        }
        Ok(Self(n))
    }

    /// `N = 2^(exponent + 1)`, the encoding of profile bits 8–12
    pub fn from_exponent(exponent: u32) -> Result<Self> {
        if exponent > 30 {
            return Err(Error::InvalidMemoryCost(1u64 << exponent.saturating_add(1).min(63)));
        }
        Ok(Self(1 << (exponent + 1)))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Index reduction mask, `N - 1`
    pub const fn mask(self) -> u32 {
        self.0 - 1
    }

    /// Inverse of [`MemoryCost::from_exponent`]
    pub const fn exponent(self) -> u32 {
        self.0.trailing_zeros() - 1
    }
}

/// Block factor `r`: always a power of two in `1..=128`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockFactor(u32);

impl BlockFactor {
    pub fn new(r: u32) -> Result<Self> {
        if r == 0 || r > 128 || !r.is_power_of_two() {
            return Err(Error::InvalidBlockFactor(r));
        }
        Ok(Self(r))
    }

    /// `r = 2^exponent`, the encoding of profile bits 5–7
    pub fn from_exponent(exponent: u32) -> Result<Self> {
        if exponent > 7 {
            return Err(Error::InvalidBlockFactor(1u32.checked_shl(exponent).unwrap_or(u32::MAX)));
        }
        Ok(Self(1 << exponent))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn exponent(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Mixing blocks per chain, `2r`
    pub const fn blocks(self) -> usize {
        2 * self.0 as usize
    }

    /// Bytes per chain, `128r`
    pub const fn chain_bytes(self) -> usize {
        self.blocks() * BLOCK_SIZE
    }
}

/// Key-derivation sub-mode (profile bits 1–4)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Kdf {
    /// `0000`: FastKDF-BLAKE2s
    #[default]
    FastKdf,
}

impl Kdf {
    pub fn from_mode(mode: u32) -> Result<Self> {
        match mode {
            0 => Ok(Kdf::FastKdf),
            // 0001 = PBKDF2-HMAC-SHA256, 0010 = PBKDF2-HMAC-BLAKE256
            other => Err(Error::UnsupportedKdf(other)),
        }
    }

    pub const fn mode(self) -> u32 {
        match self {
            Kdf::FastKdf => 0,
        }
    }
}

/// Decoded algorithm configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    pub n: MemoryCost,
    pub r: BlockFactor,
    /// Run a ChaCha chain next to the Salsa chain and XOR them
    pub dual_mix: bool,
    pub salsa_rounds: Rounds,
    pub chacha_rounds: Rounds,
    pub kdf: Kdf,
}

impl Config {
    /// NeoScrypt(128, 2, 1) with Salsa20/20 and ChaCha20/20
    pub const fn neoscrypt() -> Self {
        Self {
            n: MemoryCost(DEFAULT_N),
            r: BlockFactor(DEFAULT_R),
            dual_mix: true,
            salsa_rounds: Rounds::R20,
            chacha_rounds: Rounds::R20,
            kdf: Kdf::FastKdf,
        }
    }

    /// Scrypt(1024, 1, 1) with Salsa20/8
    pub const fn scrypt() -> Self {
        Self {
            n: MemoryCost(SCRYPT_N),
            r: BlockFactor(SCRYPT_R),
            dual_mix: false,
            salsa_rounds: Rounds::R8,
            chacha_rounds: Rounds::R8,
            kdf: Kdf::FastKdf,
        }
    }

    pub const fn salsa_mode(&self) -> MixMode {
        MixMode::new(Cipher::Salsa, self.salsa_rounds)
    }

    pub const fn chacha_mode(&self) -> MixMode {
        MixMode::new(Cipher::ChaCha, self.chacha_rounds)
    }

    /// Scratch memory for one hash: `X`, `Y`, `Z` and the `N`-slot `V`
    ///
    /// Both chains run one after the other and use the same `V`.
    pub const fn scratch_bytes(&self) -> u64 {
        (self.n.get() as u64 + 3) * self.r.chain_bytes() as u64
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::neoscrypt()
    }
}

/// Raw 32-bit profile word
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Profile(pub u32);

impl Profile {
    /// Classic NeoScrypt
    pub const DEFAULT: Profile = Profile(0);

    /// Scrypt-compatible mode with FastKDF
    pub const SCRYPT: Profile = Profile(SCRYPT_MODE);

    /// Bit 31: bits 5–12 override `N` and `r`
    pub const EXTENDED: u32 = 1 << 31;

    const RESERVED: u32 = 0x7FFF_E000;

    /// Set the extended-customisation fields, keeping bits 0–4
    pub const fn with_costs(self, n: MemoryCost, r: BlockFactor) -> Profile {
        let base = self.0 & 0x1F;
        Profile(base | Self::EXTENDED | (n.exponent() << N_SHIFT) | (r.exponent() << R_SHIFT))
    }

    pub const fn is_scrypt(self) -> bool {
        self.0 & SCRYPT_MODE != 0
    }

    pub const fn is_extended(self) -> bool {
        self.0 & Self::EXTENDED != 0
    }

    /// Decode into a validated [`Config`]
    pub fn decode(self) -> Result<Config> {
        let word = self.0;

        let reserved = word & Self::RESERVED;
        if reserved != 0 {
            return Err(Error::ReservedBits(reserved));
        }

        let kdf = Kdf::from_mode((word >> KDF_SHIFT) & KDF_MASK)?;

        let mut config = if self.is_scrypt() {
            Config::scrypt()
        } else {
            Config::neoscrypt()
        };
        config.kdf = kdf;

        if self.is_extended() {
            config.r = BlockFactor::from_exponent((word >> R_SHIFT) & R_MASK)?;
            config.n = MemoryCost::from_exponent((word >> N_SHIFT) & N_MASK)?;
        }

        Ok(config)
    }
}

impl From<u32> for Profile {
    fn from(word: u32) -> Self {
        Profile(word)
    }
}

impl TryFrom<Profile> for Config {
    type Error = Error;

    fn try_from(profile: Profile) -> Result<Config> {
        profile.decode()
    }
}

const SCRYPT_MODE: u32 = 0x1;
const KDF_SHIFT: u32 = 1;
const KDF_MASK: u32 = 0xF;
const R_SHIFT: u32 = 5;
const R_MASK: u32 = 0x7;
const N_SHIFT: u32 = 8;
const N_MASK: u32 = 0x1F;
