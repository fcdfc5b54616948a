//! # NeoScrypt Core Algorithm
//!
//! A sequential memory-hard key-derivation function used as a
//! proof-of-work hash over 80-byte block headers.
//!
//! ## Construction
//!
//! ```text
//! password ──► FastKDF(pre) ──► X ──┬──► SMix(ChaCha20/20) ──► Z ──┐
//!                                   └──► SMix(Salsa20/20)  ──► X ──┴─ XOR ──► FastKDF(post) ──► digest
//! ```
//!
//! - **FastKDF**: a data-dependent rolling KDF built on keyed BLAKE2s
//! - **SMix**: the scrypt fill-then-lookup loop over `N` slots of `2r` blocks
//! - **Dual mix**: two chains mixed with different stream-cipher cores and
//!   combined by XOR (classic profile); a single Salsa20/8 chain in the
//!   scrypt-compatible profile
//!
//! ## Profiles
//!
//! The 32-bit profile word selects the variant and optional cost overrides.
//! It is decoded once into a [`Config`]:
//!
//! | bits  | meaning                                             |
//! |-------|-----------------------------------------------------|
//! | 0     | 0 = NeoScrypt(128, 2), 1 = Scrypt(1024, 1) mode     |
//! | 1–4   | KDF sub-mode, `0000` = FastKDF                      |
//! | 5–7   | `r = 2^bits` (with bit 31)                          |
//! | 8–12  | `N = 2^(bits + 1)` (with bit 31)                    |
//! | 31    | extended customisation present                      |
//!
//! ## Example
//!
//! ```rust
//! use neoscrypt_core::{NeoScrypt, Profile, neoscrypt};
//!
//! let header = [0u8; 80];
//!
//! // Single-shot hashing with the classic profile
//! let digest = neoscrypt(&header, Profile::DEFAULT).unwrap();
//!
//! // Decode the profile once, hash many headers
//! let hasher = NeoScrypt::new(Profile::DEFAULT).unwrap();
//! assert_eq!(hasher.hash(&header).unwrap(), digest);
//! ```
//!
//! ## no_std Support
//!
//! This crate supports `no_std` environments with the `alloc` crate:
//!
//! ```toml
//! [dependencies]
//! neoscrypt-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod blake2s;
pub mod blocks;
pub mod cipher;
mod error;
pub mod fastkdf;
pub mod mix;
mod neoscrypt;
mod params;

#[cfg(feature = "std")]
mod ffi;

pub use error::{Error, Result};
pub use neoscrypt::{NeoScrypt, neoscrypt};
pub use params::*;
