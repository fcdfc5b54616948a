//! CPU nonce-range scanner
//!
//! Each worker takes interleaved nonces (`start + id`, `start + id + T`,
//! ...). A stopped scan leaves every worker part way through its own
//! stride, so the covered nonces need not form a contiguous prefix.
//! A candidate share is hashed once more before it stops the scan; one that
//! fails this check is logged and the worker moves on.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::algorithm::{self, Config, NeoScrypt, DIGEST_LEN};
use crate::work::{meets_target, Header, Target};

/// Default interval between progress log lines
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Hashing failed: {0}")]
    Hash(#[from] algorithm::Error),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A nonce whose digest meets the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Share {
    pub nonce: u32,
    #[serde(serialize_with = "hex_digest")]
    pub hash: [u8; DIGEST_LEN],
}

fn hex_digest<S: serde::Serializer>(hash: &[u8; DIGEST_LEN], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(hash))
}

/// Result of one scan call
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub share: Option<Share>,
    pub hashes_done: u64,
    pub elapsed: Duration,
}

impl ScanOutcome {
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.hashes_done as f64 / secs
        } else {
            0.0
        }
    }
}

/// State shared by the workers of one scan
struct Sweep<'a> {
    hasher: &'a NeoScrypt,
    header: &'a Header,
    target: &'a Target,
    first: u32,
    span: u64,
    stride: u64,
    found: &'a AtomicBool,
    stop: &'a AtomicBool,
    hashes: &'a AtomicU64,
    report_interval: Duration,
    started: Instant,
}

impl Sweep<'_> {
    fn halted(&self) -> bool {
        self.found.load(Ordering::Relaxed) || self.stop.load(Ordering::Relaxed)
    }

    fn run(&self, worker: usize) -> Result<Option<Share>, algorithm::Error> {
        let mut header = *self.header;
        let mut offset = worker as u64;
        let mut last_report = Instant::now();

        while offset < self.span && !self.halted() {
            // offset < span keeps first + offset within the u32 range
            let nonce = self.first.wrapping_add(offset as u32);
            header.set_nonce(nonce);

            let hash = self.hasher.hash(header.as_bytes())?;
            self.hashes.fetch_add(1, Ordering::Relaxed);

            if meets_target(&hash, self.target) {
                let share = Share { nonce, hash };
                if verify_share(self.hasher, self.header, self.target, &share)? {
                    self.found.store(true, Ordering::SeqCst);
                    return Ok(Some(share));
                }
                log::warn!(
                    target: "scan",
                    "Share at nonce {:#010x} fails CPU verification",
                    nonce
                );
            }

            if worker == 0 && last_report.elapsed() >= self.report_interval {
                let done = self.hashes.load(Ordering::Relaxed);
                let secs = self.started.elapsed().as_secs_f64();
                log::debug!(
                    target: "scan",
                    "Hashes: {} | Hashrate: {:.0} H/s | Nonce: {:#010x}",
                    done,
                    done as f64 / secs,
                    nonce
                );
                last_report = Instant::now();
            }

            offset += self.stride;
        }

        Ok(None)
    }
}

/// Multi-threaded nonce scanner for one decoded profile
pub struct Scanner {
    hasher: NeoScrypt,
    threads: usize,
    report_interval: Duration,
}

impl Scanner {
    pub fn new(config: Config, threads: usize) -> Self {
        Self {
            hasher: NeoScrypt::with_config(config),
            threads: threads.max(1),
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn config(&self) -> &Config {
        self.hasher.config()
    }

    /// Scan `nonces` for a digest meeting `target`
    ///
    /// Returns when a share is found, the range is exhausted, or `stop` is
    /// raised by the caller.
    pub fn scan(
        &self,
        header: &Header,
        target: &Target,
        nonces: RangeInclusive<u32>,
        stop: &AtomicBool,
    ) -> Result<ScanOutcome, ScanError> {
        let started = Instant::now();

        if nonces.is_empty() {
            return Ok(ScanOutcome {
                share: None,
                hashes_done: 0,
                elapsed: started.elapsed(),
            });
        }

        let first = *nonces.start();
        let span = u64::from(*nonces.end() - first) + 1;
        let workers = (self.threads as u64).min(span) as usize;

        log::debug!(
            target: "scan",
            "Scanning {} nonces from {:#010x} on {} threads (target {})",
            span,
            first,
            workers,
            target
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;

        let found = AtomicBool::new(false);
        let hashes = AtomicU64::new(0);
        let sweep = Sweep {
            hasher: &self.hasher,
            header,
            target,
            first,
            span,
            stride: workers as u64,
            found: &found,
            stop,
            hashes: &hashes,
            report_interval: self.report_interval,
            started,
        };

        let results: Vec<Result<Option<Share>, algorithm::Error>> = pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|worker| sweep.run(worker))
                .collect()
        });

        // Lowest nonce wins when several workers hit at once
        let mut share: Option<Share> = None;
        for result in results {
            if let Some(candidate) = result? {
                match share {
                    Some(best) if best.nonce <= candidate.nonce => {}
                    _ => share = Some(candidate),
                }
            }
        }

        if let Some(share) = &share {
            log::info!(
                target: "scan",
                "Share found at nonce {:#010x}: {}",
                share.nonce,
                hex::encode(share.hash)
            );
        }

        Ok(ScanOutcome {
            share,
            hashes_done: hashes.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
        })
    }
}

/// Re-hash `share` against `header` and check it still meets `target`
pub fn verify_share(
    hasher: &NeoScrypt,
    header: &Header,
    target: &Target,
    share: &Share,
) -> Result<bool, algorithm::Error> {
    let hash = hasher.hash(header.with_nonce(share.nonce).as_bytes())?;
    Ok(hash == share.hash && meets_target(&hash, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Profile;

    fn cheap_config() -> Config {
        // N = 32, r = 1, dual mix
        Profile(0x8000_0400).decode().unwrap()
    }

    #[test]
    fn test_single_thread_finds_first_share() {
        let scanner = Scanner::new(cheap_config(), 1);
        let target = Target::from_zero_bits(4).unwrap();
        let stop = AtomicBool::new(false);

        let outcome = scanner
            .scan(&Header::default(), &target, 0..=63, &stop)
            .unwrap();

        let share = outcome.share.unwrap();
        assert_eq!(share.nonce, 10);
        assert_eq!(
            hex::encode(share.hash),
            "f4d4d9ecd7cb6820bdca37cfbd7850ed4a4b32f86fdd59139b331faffd960005"
        );
        assert_eq!(outcome.hashes_done, 11);
    }

    #[test]
    fn test_range_exhausted_without_share() {
        let scanner = Scanner::new(cheap_config(), 3);
        let target = Target::from_zero_bits(4).unwrap();
        let stop = AtomicBool::new(false);

        // Nonces 0..=9 hold no 4-bit share for the zero header
        let outcome = scanner
            .scan(&Header::default(), &target, 0..=9, &stop)
            .unwrap();

        assert!(outcome.share.is_none());
        assert_eq!(outcome.hashes_done, 10);
    }

    #[test]
    fn test_stop_flag_ends_scan() {
        let scanner = Scanner::new(cheap_config(), 2);
        let stop = AtomicBool::new(true);

        let outcome = scanner
            .scan(&Header::default(), &Target::from_zero_bits(64).unwrap(), 0..=u32::MAX, &stop)
            .unwrap();

        assert!(outcome.share.is_none());
        assert_eq!(outcome.hashes_done, 0);
    }

    #[test]
    fn test_empty_range() {
        let scanner = Scanner::new(cheap_config(), 4);
        let stop = AtomicBool::new(false);
        #[allow(clippy::reversed_empty_ranges)]
        let outcome = scanner
            .scan(&Header::default(), &Target::MAX, 5..=4, &stop)
            .unwrap();
        assert!(outcome.share.is_none());
        assert_eq!(outcome.hashes_done, 0);
    }

    #[test]
    fn test_verify_share() {
        let hasher = NeoScrypt::with_config(cheap_config());
        let header = Header::default();
        let target = Target::from_zero_bits(4).unwrap();

        let hash = hasher.hash(header.with_nonce(10).as_bytes()).unwrap();
        let share = Share { nonce: 10, hash };
        assert!(verify_share(&hasher, &header, &target, &share).unwrap());

        // Mismatched digest
        let mut tampered = share;
        tampered.hash[0] ^= 1;
        assert!(!verify_share(&hasher, &header, &target, &tampered).unwrap());

        // Right digest, wrong nonce
        let moved = Share { nonce: 11, ..share };
        assert!(!verify_share(&hasher, &header, &target, &moved).unwrap());

        // Genuine digest that misses a harder target
        let hard = Target::from_zero_bits(64).unwrap();
        assert!(!verify_share(&hasher, &header, &hard, &share).unwrap());
    }

    #[test]
    fn test_max_target_takes_first_nonce() {
        let scanner = Scanner::new(cheap_config(), 1);
        let stop = AtomicBool::new(false);
        let outcome = scanner
            .scan(&Header::default(), &Target::MAX, 7..=7, &stop)
            .unwrap();
        assert_eq!(outcome.share.map(|s| s.nonce), Some(7));
    }
}
