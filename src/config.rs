//! Prover configuration
//!
//! JSON file with every field optional; command-line flags override the
//! file values.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::{self, Config, Profile};
use crate::work::Target;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid profile: {0}")]
    Profile(#[from] algorithm::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Raw profile word
    pub profile: u32,
    /// Worker threads (default: number of CPU cores)
    pub threads: Option<usize>,
    /// Share target used when none is given on the command line
    pub target: Option<Target>,
    /// Seconds between progress log lines
    pub report_interval_secs: u64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            profile: Profile::DEFAULT.0,
            threads: None,
            target: None,
            report_interval_secs: 5,
        }
    }
}

impl ProverConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Explicit path if given, else the default location if it exists, else defaults
    #[cfg(feature = "cli")]
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "threads",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.report_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        self.decoded_profile()?;
        Ok(())
    }

    pub fn decoded_profile(&self) -> Result<Config, ConfigError> {
        Ok(Profile(self.profile).decode()?)
    }

    #[cfg(feature = "cli")]
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

/// Parse a profile word given as decimal or `0x`-prefixed hex
pub fn parse_profile_word(s: &str) -> Result<u32, ConfigError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => u32::from_str_radix(hex_digits, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| ConfigError::InvalidValue {
        field: "profile",
        reason: e.to_string(),
    })
}

/// Get the default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|dir| dir.join("neoscrypt").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Per-process scratch path
    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("neoscrypt-config-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = ProverConfig::default();
        assert_eq!(config.profile, 0);
        assert_eq!(config.report_interval(), Duration::from_secs(5));
        assert_eq!(config.decoded_profile().unwrap(), Config::neoscrypt());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ProverConfig =
            serde_json::from_str(r#"{ "profile": 1, "threads": 2 }"#).unwrap();
        assert_eq!(config.profile, 1);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.target, None);
        assert_eq!(config.report_interval_secs, 5);
        assert_eq!(config.decoded_profile().unwrap(), Config::scrypt());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip/config.json");
        let config = ProverConfig {
            profile: 0x8000_0540,
            threads: Some(3),
            target: Some(Target::from_zero_bits(16).unwrap()),
            report_interval_secs: 10,
        };

        config.save(&path).unwrap();
        let loaded = ProverConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = temp_path("invalid/config.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        fs::write(&path, r#"{ "threads": 0 }"#).unwrap();
        assert!(matches!(
            ProverConfig::load(&path),
            Err(ConfigError::InvalidValue { field: "threads", .. })
        ));

        fs::write(&path, r#"{ "profile": 8192 }"#).unwrap();
        assert!(matches!(
            ProverConfig::load(&path),
            Err(ConfigError::Profile(algorithm::Error::ReservedBits(8192)))
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(ProverConfig::load(&path), Err(ConfigError::Json(_))));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("missing/none.json");
        assert!(matches!(
            ProverConfig::load(&path),
            Err(ConfigError::FileError(_))
        ));
    }

    #[test]
    fn test_parse_profile_word() {
        assert_eq!(parse_profile_word("0").unwrap(), 0);
        assert_eq!(parse_profile_word("1").unwrap(), 1);
        assert_eq!(parse_profile_word("0x80000620").unwrap(), 0x8000_0620);
        assert_eq!(parse_profile_word(" 0X1F ").unwrap(), 0x1F);
        assert!(parse_profile_word("0xZZ").is_err());
        assert!(parse_profile_word("-1").is_err());
    }
}
