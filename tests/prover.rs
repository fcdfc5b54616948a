//! End-to-end tests for the prover library and CLI

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::AtomicBool;

use neoscrypt::algorithm::Profile;
use neoscrypt::config::ProverConfig;
use neoscrypt::{meets_target, neoscrypt, Header, Scanner, Target};

const ZERO_DIGEST: &str = "2c400aba7b67aae2eb8afe32a31303b43a5b2ad884badd97c7984e6b7e3b2c7b";

fn write_config(name: &str, config: &ProverConfig) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("neoscrypt-prover-{}", std::process::id()))
        .join(name);
    config.save(&path).unwrap();
    path
}

#[test]
fn test_scan_default_profile_multi_threaded() {
    let header = Header::default();
    let target = Target::from_zero_bits(4).unwrap();
    let config = Profile::DEFAULT.decode().unwrap();
    let stop = AtomicBool::new(false);

    let outcome = Scanner::new(config, 2)
        .scan(&header, &target, 0..=63, &stop)
        .unwrap();

    let share = outcome.share.expect("a 4-bit share exists below nonce 64");
    // Shares for the zero header below 64: 5, 6 and 35
    assert!([5, 6, 35].contains(&share.nonce), "unexpected nonce {}", share.nonce);
    assert!(meets_target(&share.hash, &target));
    assert_eq!(
        neoscrypt(header.with_nonce(share.nonce).as_bytes(), Profile::DEFAULT).unwrap(),
        share.hash
    );
    assert!(outcome.hashes_done >= 6);
}

#[test]
fn test_single_thread_matches_known_share() {
    let target = Target::from_zero_bits(4).unwrap();
    let stop = AtomicBool::new(false);

    let outcome = Scanner::new(Profile::DEFAULT.decode().unwrap(), 1)
        .scan(&Header::default(), &target, 0..=63, &stop)
        .unwrap();

    let share = outcome.share.unwrap();
    assert_eq!(share.nonce, 5);
    assert_eq!(
        hex::encode(share.hash),
        "800aeadc0a83a189e0223beea29a6558080255a19eb464c218ff63c0bdbe5c08"
    );
}

#[test]
fn test_cli_hash() {
    let config = write_config("hash.json", &ProverConfig::default());

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap()])
        .args(["hash", "--header", &"00".repeat(80)])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), ZERO_DIGEST);
}

#[test]
fn test_cli_profile_override() {
    let config = write_config("override.json", &ProverConfig::default());

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap(), "--profile", "0x1"])
        .args(["hash", "--header", &"00".repeat(80)])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "c52ff7445e43a9703c91fc2c0dc2f056853c5c46a573c6d735b5d903ed55f27a"
    );
}

#[test]
fn test_cli_rejects_bad_input() {
    let config = write_config("reject.json", &ProverConfig::default());

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap()])
        .args(["hash", "--header", "abcd"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid length"));

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap(), "--profile", "8192"])
        .args(["hash", "--header", &"00".repeat(80)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Reserved profile bits"));
}

#[test]
fn test_cli_scan_finds_share() {
    let config = ProverConfig {
        threads: Some(1),
        target: Some(Target::from_zero_bits(4).unwrap()),
        ..ProverConfig::default()
    };
    let path = write_config("scan.json", &config);

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", path.to_str().unwrap()])
        .args(["scan", "--header", &"00".repeat(80), "--end", "63"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nonce:  5 (0x00000005)"), "{}", stdout);
}

#[test]
fn test_cli_benchmark_json() {
    let config = write_config("bench.json", &ProverConfig::default());

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap(), "--profile", "0x80000400"])
        .args(["benchmark", "--count", "2", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["hashes"], 2);
    assert_eq!(report["n"], 32);
    assert_eq!(report["r"], 1);
}

#[test]
fn test_cli_profile_command() {
    let config = write_config("profile.json", &ProverConfig::default());

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap()])
        .args(["profile", "0x80000400"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Profile 0x80000400:"), "{}", stdout);
    assert!(stdout.contains("  N: 32\n"), "{}", stdout);
    assert!(stdout.contains("  r: 1\n"), "{}", stdout);
    assert!(stdout.contains("  Dual mix: true"), "{}", stdout);
    assert!(stdout.contains("  Scratch memory: 4480 bytes"), "{}", stdout);

    let output = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", config.to_str().unwrap()])
        .args(["profile", "0x2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
#[test]
fn test_cli_scan_stops_on_interrupt() {
    use std::io::{BufRead, BufReader, Read};
    use std::process::Stdio;
    use std::time::Duration;

    let config = ProverConfig {
        profile: 0x8000_0400,
        threads: Some(1),
        ..ProverConfig::default()
    };
    let path = write_config("interrupt.json", &config);

    let mut child = Command::new(env!("CARGO_BIN_EXE_neoscrypt"))
        .args(["--config", path.to_str().unwrap()])
        .args(["scan", "--header", &"00".repeat(80), "--bits", "200"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Wait for the banner so the handler thread is already running
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut seen = String::new();
    while !seen.contains("Threads:") {
        let mut line = String::new();
        assert!(stdout.read_line(&mut line).unwrap() > 0, "{}", seen);
        seen.push_str(&line);
    }
    std::thread::sleep(Duration::from_millis(500));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    stdout.read_to_string(&mut seen).unwrap();
    assert!(child.wait().unwrap().success(), "{}", seen);
    assert!(seen.contains("Scan interrupted."), "{}", seen);
}
