//! NeoScrypt orchestration: FastKDF, one or two SMix chains, FastKDF

use crate::blocks;
use crate::error::Result;
use crate::fastkdf;
use crate::mix::{Scratch, smix};
use crate::params::{BLOCK_SIZE, Config, DIGEST_LEN, KDF_BUF_SIZE, PASSWORD_LEN, Profile};

/// NeoScrypt hasher for one decoded profile
///
/// Holds only the configuration. Every [`NeoScrypt::hash`] call allocates
/// and wipes its own scratch, so a single hasher can be shared across
/// threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeoScrypt {
    config: Config,
}

impl NeoScrypt {
    /// Decode `profile`, rejecting reserved bits and unsupported sub-modes
    pub fn new(profile: Profile) -> Result<Self> {
        Ok(Self::with_config(profile.decode()?))
    }

    pub const fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hash an 80-byte password (block header)
    ///
    /// Fails only if the scratch memory cannot be allocated.
    pub fn hash(&self, password: &[u8; PASSWORD_LEN]) -> Result<[u8; DIGEST_LEN]> {
        let config = &self.config;
        let mut scratch = Scratch::new(config)?;
        let Scratch { x, y, z, v } = &mut scratch;

        // FastKDF yields at most 256 bytes; wider chains keep zeros past it
        let kdf_len = config.r.chain_bytes().min(KDF_BUF_SIZE);
        let kdf_blocks = kdf_len / BLOCK_SIZE;

        // Phase 1: X = FastKDF(password, password)
        let mut prehash = fastkdf::prehash(password);
        blocks::load_blocks(&mut x[..kdf_blocks], &prehash[..kdf_len]);
        blocks::erase(&mut prehash);

        // Phase 2: ChaCha chain first, then Salsa, sharing V
        if config.dual_mix {
            z.copy_from_slice(x);
            smix(z, y, v, config.n, config.chacha_mode());
        }
        smix(x, y, v, config.n, config.salsa_mode());
        if config.dual_mix {
            blocks::xor_blocks(x, z);
        }

        // Phase 3: digest = FastKDF(password, X)
        let mut salt = [0u8; KDF_BUF_SIZE];
        blocks::store_blocks(&x[..kdf_blocks], &mut salt[..kdf_len]);
        let digest = fastkdf::posthash(password, &salt[..kdf_len]);
        blocks::erase(&mut salt);

        Ok(digest)
    }
}

/// Hash `password` under `profile`
pub fn neoscrypt(password: &[u8; PASSWORD_LEN], profile: Profile) -> Result<[u8; DIGEST_LEN]> {
    NeoScrypt::new(profile)?.hash(password)
}
