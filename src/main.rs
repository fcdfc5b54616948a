//! NeoScrypt Prover CLI
//!
//! # Commands
//!
//! - `hash` - Hash one 80-byte header
//! - `scan` - Search a nonce range for a share
//! - `benchmark` - Run performance benchmark
//! - `profile` - Show the decoded form of a profile word

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use neoscrypt::bench::benchmark;
use neoscrypt::config::{parse_profile_word, ProverConfig};
use neoscrypt::{Header, NeoScrypt, Profile, Scanner, Target};

#[derive(Parser)]
#[command(name = "neoscrypt")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "NeoScrypt proof-of-work prover")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile word, decimal or 0x-prefixed hex (overrides the config file)
    #[arg(long, global = true, value_parser = profile_arg)]
    profile: Option<u32>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash an 80-byte header
    Hash {
        /// Header as 160 hex digits
        #[arg(long)]
        header: String,
    },

    /// Scan a nonce range for a share
    Scan {
        /// Header as 160 hex digits (its nonce field is overwritten)
        #[arg(long)]
        header: String,

        /// Target as big-endian hex
        #[arg(long, conflicts_with = "bits")]
        target: Option<String>,

        /// Target as a number of leading zero bits
        #[arg(long)]
        bits: Option<u32>,

        /// First nonce
        #[arg(long, default_value = "0")]
        start: u32,

        /// Last nonce (inclusive)
        #[arg(long, default_value_t = u32::MAX)]
        end: u32,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of hashes to compute
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the decoded configuration of a profile word
    Profile {
        /// Profile word, decimal or 0x-prefixed hex
        #[arg(value_parser = profile_arg)]
        word: u32,
    },
}

fn profile_arg(s: &str) -> Result<u32, String> {
    parse_profile_word(s).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ProverConfig::resolve(cli.config.as_deref())?;
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }

    match cli.command {
        Commands::Hash { header } => cmd_hash(&config, &header),
        Commands::Scan {
            header,
            target,
            bits,
            start,
            end,
            threads,
        } => {
            if threads.is_some() {
                config.threads = threads;
            }
            cmd_scan(&config, &header, target.as_deref(), bits, start, end)
        }
        Commands::Benchmark { count, json } => cmd_benchmark(&config, count, json),
        Commands::Profile { word } => cmd_profile(word),
    }
}

fn cmd_hash(config: &ProverConfig, header_hex: &str) -> anyhow::Result<()> {
    let header = Header::from_hex(header_hex)?;
    let hasher = NeoScrypt::with_config(config.decoded_profile()?);
    let digest = hasher.hash(header.as_bytes())?;

    println!("{}", hex::encode(digest));

    Ok(())
}

fn cmd_scan(
    config: &ProverConfig,
    header_hex: &str,
    target_hex: Option<&str>,
    bits: Option<u32>,
    start: u32,
    end: u32,
) -> anyhow::Result<()> {
    let header = Header::from_hex(header_hex)?;

    let target = match (target_hex, bits, config.target) {
        (Some(hex_str), _, _) => Target::from_hex(hex_str)?,
        (None, Some(bits), _) => Target::from_zero_bits(bits)?,
        (None, None, Some(target)) => target,
        (None, None, None) => {
            anyhow::bail!("No target given. Use --target, --bits or the config file")
        }
    };

    if start > end {
        anyhow::bail!("Empty nonce range: start {} > end {}", start, end);
    }

    let num_threads = config.thread_count();
    let scanner = Scanner::new(config.decoded_profile()?, num_threads)
        .with_report_interval(config.report_interval());
    let stop = stop_on_interrupt();

    println!("\n=== NeoScrypt Scanner ===");
    println!("Profile: {:#010x}", config.profile);
    println!("Target:  {}", target);
    println!("Nonces:  {:#010x}..={:#010x}", start, end);
    println!("Threads: {}", num_threads);
    println!("=========================\n");

    let outcome = scanner.scan(&header, &target, start..=end, &stop)?;

    match outcome.share {
        Some(share) => {
            println!("Found valid share!");
            println!("  Nonce:  {} ({:#010x})", share.nonce, share.nonce);
            println!("  Hash:   {}", hex::encode(share.hash));
            println!("  Header: {}", header.with_nonce(share.nonce));
        }
        None if stop.load(Ordering::Relaxed) => println!("Scan interrupted."),
        None => println!("No share found in range."),
    }
    println!(
        "  Hashes: {} ({:.2} H/s in {:.2}s)",
        outcome.hashes_done,
        outcome.hashrate(),
        outcome.elapsed.as_secs_f64()
    );

    Ok(())
}

/// Raise the returned flag on Ctrl-C so workers finish their current hash and return
fn stop_on_interrupt() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Ctrl-C handler unavailable: {}", e);
                return;
            }
        };

        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Interrupted, stopping workers");
                    flag.store(true, Ordering::SeqCst);
                }
                Err(e) => log::warn!("Ctrl-C handler unavailable: {}", e),
            }
        });
    });

    stop
}

fn cmd_benchmark(config: &ProverConfig, count: u32, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("Running benchmark with {} hashes...", count);
    }

    let report = benchmark(Profile(config.profile), count)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\nResults:");
    println!("  Total hashes: {}", report.hashes);
    println!("  Time elapsed: {:.2}s", report.seconds);
    println!("  Hashrate: {:.2} H/s", report.hashrate);

    // Memory info
    println!("\nAlgorithm parameters:");
    println!("  Profile: {:#010x}", report.profile);
    println!("  N: {}", report.n);
    println!("  r: {}", report.r);
    println!("  Dual mix: {}", report.dual_mix);
    println!("  Memory per hash: {} KB", report.scratch_bytes / 1024);

    Ok(())
}

fn cmd_profile(word: u32) -> anyhow::Result<()> {
    let config = Profile(word).decode()?;

    println!("Profile {:#010x}:", word);
    println!("  N: {}", config.n.get());
    println!("  r: {}", config.r.get());
    println!("  Dual mix: {}", config.dual_mix);
    println!("  Salsa mode: {:#06x}", config.salsa_mode().packed());
    if config.dual_mix {
        println!("  ChaCha mode: {:#06x}", config.chacha_mode().packed());
    }
    println!("  KDF: {:?}", config.kdf);
    println!("  Scratch memory: {} bytes", config.scratch_bytes());

    Ok(())
}
