//! Block headers and 256-bit share targets
//!
//! A digest is read as a little-endian 256-bit integer (byte 31 is the
//! most significant) and meets a target when it is less than or equal
//! to it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::algorithm::{DIGEST_LEN, PASSWORD_LEN};

/// Byte offset of the little-endian nonce (header word 19)
pub const NONCE_OFFSET: usize = 76;

#[derive(Error, Debug)]
pub enum WorkError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Target hex too long: {0} digits (max 64)")]
    TargetTooLong(usize),

    #[error("Too many zero bits: {0} (max 256)")]
    TooManyBits(u32),
}

fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// An 80-byte block header, hashed as the NeoScrypt password
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Header([u8; PASSWORD_LEN]);

impl Header {
    pub const fn new(bytes: [u8; PASSWORD_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, WorkError> {
        let bytes = hex::decode(strip_hex_prefix(s))?;
        let actual = bytes.len();
        let bytes: [u8; PASSWORD_LEN] =
            bytes.try_into().map_err(|_| WorkError::InvalidLength {
                expected: PASSWORD_LEN,
                actual,
            })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PASSWORD_LEN] {
        &self.0
    }

    pub fn nonce(&self) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.0[NONCE_OFFSET..]);
        u32::from_le_bytes(word)
    }

    pub fn set_nonce(&mut self, nonce: u32) {
        self.0[NONCE_OFFSET..].copy_from_slice(&nonce.to_le_bytes());
    }

    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.set_nonce(nonce);
        self
    }
}

impl Default for Header {
    fn default() -> Self {
        Self([0u8; PASSWORD_LEN])
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Header({})", self)
    }
}

/// A share target, stored little-endian
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Target([u8; DIGEST_LEN]);

impl Target {
    /// `2^256 - 1`: every digest qualifies
    pub const MAX: Target = Target([0xFF; DIGEST_LEN]);

    pub const fn from_le_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn to_le_bytes(&self) -> [u8; DIGEST_LEN] {
        self.0
    }

    /// Parse big-endian display hex; shorter strings are zero-extended on the left
    pub fn from_hex(s: &str) -> Result<Self, WorkError> {
        let digits = strip_hex_prefix(s);
        if digits.len() > 2 * DIGEST_LEN {
            return Err(WorkError::TargetTooLong(digits.len()));
        }

        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(padded, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }

    /// `2^(256 - bits) - 1`: the top `bits` bits must be zero
    pub fn from_zero_bits(bits: u32) -> Result<Self, WorkError> {
        if bits > 256 {
            return Err(WorkError::TooManyBits(bits));
        }

        let mut bytes = [0xFFu8; DIGEST_LEN];
        for i in 0..bits as usize {
            // Bit i counted from the most significant end
            bytes[DIGEST_LEN - 1 - i / 8] &= !(0x80 >> (i % 8));
        }
        Ok(Self(bytes))
    }

    /// Big-endian display hex, 64 digits
    pub fn to_hex(&self) -> String {
        let mut be = self.0;
        be.reverse();
        hex::encode(be)
    }

    /// Leading zero bits of the 256-bit value
    pub fn zero_bits(&self) -> u32 {
        let mut bits = 0;
        for &byte in self.0.iter().rev() {
            bits += byte.leading_zeros();
            if byte != 0 {
                break;
            }
        }
        bits
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.to_hex())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Target::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// `hash <= target`, both as little-endian 256-bit integers
pub fn meets_target(hash: &[u8; DIGEST_LEN], target: &Target) -> bool {
    hash.iter().rev().cmp(target.0.iter().rev()) != Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_nonce() {
        let header = Header::default().with_nonce(0x1234_5678);
        assert_eq!(header.nonce(), 0x1234_5678);
        assert_eq!(&header.as_bytes()[76..], &[0x78, 0x56, 0x34, 0x12]);
        assert!(header.as_bytes()[..76].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_header_hex() {
        let hex_str = "ab".repeat(80);
        let header = Header::from_hex(&hex_str).unwrap();
        assert_eq!(header.to_string(), hex_str);
        assert_eq!(Header::from_hex(&format!("0x{}", hex_str)).unwrap(), header);

        assert!(matches!(
            Header::from_hex("abcd"),
            Err(WorkError::InvalidLength { expected: 80, actual: 2 })
        ));
        assert!(matches!(Header::from_hex("zz"), Err(WorkError::InvalidHex(_))));
    }

    #[test]
    fn test_target_from_zero_bits() {
        assert_eq!(Target::from_zero_bits(0).unwrap(), Target::MAX);

        let t = Target::from_zero_bits(4).unwrap();
        assert_eq!(t.to_le_bytes()[31], 0x0F);
        assert_eq!(t.to_le_bytes()[30], 0xFF);
        assert_eq!(t.zero_bits(), 4);

        let t = Target::from_zero_bits(20).unwrap();
        assert_eq!(&t.to_hex()[..6], "00000f");
        assert_eq!(t.zero_bits(), 20);

        assert_eq!(Target::from_zero_bits(256).unwrap().to_le_bytes(), [0u8; 32]);
        assert!(Target::from_zero_bits(257).is_err());
    }

    #[test]
    fn test_target_hex() {
        let t = Target::from_hex("0x00000fff").unwrap();
        let mut expected = [0u8; 32];
        expected[0] = 0xFF;
        expected[1] = 0x0F;
        assert_eq!(t.to_le_bytes(), expected);

        let full = "00000000ffff0000000000000000000000000000000000000000000000000000";
        assert_eq!(Target::from_hex(full).unwrap().to_hex(), full);
        assert!(Target::from_hex(&"f".repeat(65)).is_err());
    }

    #[test]
    fn test_meets_target() {
        let target = Target::from_zero_bits(8).unwrap();

        let mut hash = [0xFFu8; 32];
        assert!(!meets_target(&hash, &target));

        // Most significant byte is the last one
        hash[31] = 0x00;
        assert!(meets_target(&hash, &target));

        hash[31] = 0x01;
        hash[0] = 0x00;
        assert!(!meets_target(&hash, &target));

        // Equality counts
        assert!(meets_target(&target.to_le_bytes(), &target));
        assert!(meets_target(&hash, &Target::MAX));
    }

    #[test]
    fn test_target_serde() {
        let target = Target::from_zero_bits(12).unwrap();
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, format!("\"{}\"", target.to_hex()));
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
    }
}
