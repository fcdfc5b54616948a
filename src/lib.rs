//! NeoScrypt Prover Library
//!
//! Caller-side tooling around the NeoScrypt proof-of-work hash.
//!
//! # Overview
//!
//! The hash itself lives in [`neoscrypt_core`] (re-exported as
//! [`algorithm`]) and is treated here as an opaque
//! `digest = neoscrypt(header, profile)` function. This crate adds:
//!
//! - **Work**: 80-byte headers with the nonce at bytes 76..80, and 256-bit
//!   little-endian targets
//! - **Scanning**: a multi-threaded nonce-range search with re-verification
//! - **Benchmarks**: hashrate and memory per profile
//! - **Configuration**: a JSON config file merged with CLI flags
//!
//! # Example
//!
//! ```rust
//! use neoscrypt::algorithm::Profile;
//! use neoscrypt::{Header, Target, meets_target, neoscrypt};
//!
//! let header = Header::default().with_nonce(5);
//! let digest = neoscrypt(header.as_bytes(), Profile::DEFAULT).unwrap();
//!
//! // Check the digest against a target with 4 leading zero bits
//! let target = Target::from_zero_bits(4).unwrap();
//! assert!(meets_target(&digest, &target));
//! ```

// Re-export the core algorithm
pub use neoscrypt_core as algorithm;

pub mod bench;
pub mod config;
pub mod scan;
pub mod work;

// Convenience re-exports
pub use algorithm::{neoscrypt, NeoScrypt, Profile};
pub use scan::{ScanOutcome, Scanner, Share};
pub use work::{meets_target, Header, Target};
