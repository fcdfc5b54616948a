//! Hashrate benchmark

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::{self, NeoScrypt, Profile};
use crate::work::Header;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Hashing failed: {0}")]
    Hash(#[from] algorithm::Error),

    #[error("Failed to gather randomness: {0}")]
    Random(String),
}

/// Benchmark results for one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub profile: u32,
    pub n: u32,
    pub r: u32,
    pub dual_mix: bool,
    pub hashes: u32,
    pub seconds: f64,
    pub hashrate: f64,
    /// Scratch memory per hash
    pub scratch_bytes: u64,
}

/// Time `count` hashes of a random header, incrementing the nonce
pub fn benchmark(profile: Profile, count: u32) -> Result<BenchReport, BenchError> {
    let hasher = NeoScrypt::new(profile)?;
    let config = *hasher.config();

    let mut bytes = [0u8; algorithm::PASSWORD_LEN];
    getrandom::getrandom(&mut bytes).map_err(|e| BenchError::Random(e.to_string()))?;
    let mut header = Header::new(bytes);
    let base = header.nonce();

    log::debug!(
        target: "bench",
        "Benchmarking profile {:#010x} (N = {}, r = {}) with {} hashes",
        profile.0,
        config.n.get(),
        config.r.get(),
        count
    );

    let start = Instant::now();
    for i in 0..count {
        header.set_nonce(base.wrapping_add(i));
        hasher.hash(header.as_bytes())?;
    }
    let seconds = start.elapsed().as_secs_f64();

    let hashrate = if seconds > 0.0 {
        count as f64 / seconds
    } else {
        0.0
    };

    Ok(BenchReport {
        profile: profile.0,
        n: config.n.get(),
        r: config.r.get(),
        dual_mix: config.dual_mix,
        hashes: count,
        seconds,
        hashrate,
        scratch_bytes: config.scratch_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_report() {
        let report = benchmark(Profile(0x8000_0400), 4).unwrap();
        assert_eq!(report.hashes, 4);
        assert_eq!((report.n, report.r), (32, 1));
        assert!(report.dual_mix);
        assert_eq!(report.scratch_bytes, (32 + 3) * 128);
        assert!(report.hashrate >= 0.0);
    }

    #[test]
    fn test_benchmark_rejects_profile() {
        assert!(matches!(
            benchmark(Profile(1 << 20), 1),
            Err(BenchError::Hash(algorithm::Error::ReservedBits(_)))
        ));
    }

    #[test]
    fn test_benchmark_report_json() {
        let report = benchmark(Profile::DEFAULT, 1).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["n"], 128);
        assert_eq!(json["r"], 2);
        assert_eq!(json["scratch_bytes"], 33536);
    }
}
