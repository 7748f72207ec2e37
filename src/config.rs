//! Configuration management for cdcsim.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (CDCSIM_ADDRESS_BITS, etc.)
//! 2. Project-local config file (`./cdcsim.toml`)
//! 3. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # cdcsim.toml
//!
//! # log2 of the FIFO depth
//! address_bits = 4
//!
//! # payload width in bits (1..=64)
//! data_width = 16
//!
//! # synchronizer depth per clock-domain crossing
//! sync_stages = 2
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Global cached configuration.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// cdcsim configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// log2 of the FIFO depth (address width of the ring memory).
    pub address_bits: Option<u32>,

    /// Payload width in bits, 1 through 64.
    pub data_width: Option<u32>,

    /// Flip-flop stages per clock-domain crossing synchronizer.
    pub sync_stages: Option<u32>,

    /// Scheduler steps between write-clock edges.
    pub write_interval: Option<u64>,

    /// Scheduler steps between read-clock edges.
    pub read_interval: Option<u64>,

    /// Number of words to push through the FIFO in a run.
    pub items: Option<u64>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `cdcsim.toml`
    /// 3. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(local_config) = Self::load_local_config() {
            config.merge(local_config);
        }

        // Environment variables override everything
        config.apply_env_overrides();

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Address width, with fallback to default.
    pub fn address_bits(&self) -> u32 {
        self.address_bits.unwrap_or(4)
    }

    /// Payload width in bits, with fallback to default.
    pub fn data_width(&self) -> u32 {
        self.data_width.unwrap_or(16)
    }

    /// Synchronizer depth, with fallback to default.
    pub fn sync_stages(&self) -> u32 {
        self.sync_stages
            .unwrap_or(crate::fifo::DEFAULT_SYNC_STAGES as u32)
    }

    /// Write-clock interval, with fallback to default.
    pub fn write_interval(&self) -> u64 {
        self.write_interval.unwrap_or(1)
    }

    /// Read-clock interval, with fallback to default.
    pub fn read_interval(&self) -> u64 {
        self.read_interval.unwrap_or(1)
    }

    /// Words per run, with fallback to default.
    pub fn items(&self) -> u64 {
        self.items.unwrap_or(256)
    }

    /// Load project-local configuration from ./cdcsim.toml
    fn load_local_config() -> Option<Self> {
        // Try current directory
        let local_path = Path::new("cdcsim.toml");
        if let Some(config) = Self::load_from_file(local_path) {
            return Some(config);
        }

        // Try to find project root by looking for Cargo.toml
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let project_path = Path::new(&manifest_dir).join("cdcsim.toml");
            if let Some(config) = Self::load_from_file(&project_path) {
                return Some(config);
            }
        }

        None
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    fn merge(&mut self, other: Self) {
        if other.address_bits.is_some() {
            self.address_bits = other.address_bits;
        }
        if other.data_width.is_some() {
            self.data_width = other.data_width;
        }
        if other.sync_stages.is_some() {
            self.sync_stages = other.sync_stages;
        }
        if other.write_interval.is_some() {
            self.write_interval = other.write_interval;
        }
        if other.read_interval.is_some() {
            self.read_interval = other.read_interval;
        }
        if other.items.is_some() {
            self.items = other.items;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
            let raw = std::env::var(name).ok()?;
            match raw.parse() {
                Ok(v) => {
                    log::info!("Using {} from environment: {}", name, raw);
                    Some(v)
                }
                Err(_) => {
                    log::warn!("Ignoring unparsable {}: {}", name, raw);
                    None
                }
            }
        }

        if let Some(v) = parse_env("CDCSIM_ADDRESS_BITS") {
            self.address_bits = Some(v);
        }
        if let Some(v) = parse_env("CDCSIM_DATA_WIDTH") {
            self.data_width = Some(v);
        }
        if let Some(v) = parse_env("CDCSIM_SYNC_STAGES") {
            self.sync_stages = Some(v);
        }
        if let Some(v) = parse_env("CDCSIM_WRITE_INTERVAL") {
            self.write_interval = Some(v);
        }
        if let Some(v) = parse_env("CDCSIM_READ_INTERVAL") {
            self.read_interval = Some(v);
        }
        if let Some(v) = parse_env("CDCSIM_ITEMS") {
            self.items = Some(v);
        }
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# cdcsim configuration
# Place this file at ./cdcsim.toml

# log2 of the FIFO depth (depth = 2^address_bits)
address_bits = 4

# payload width in bits (1..=64)
data_width = 16

# flip-flop stages per clock-domain crossing (minimum sensible value is 2)
# sync_stages = 2

# scheduler steps between clock edges of each domain
# write_interval = 1
# read_interval = 3

# words pushed through the FIFO per run
# items = 256
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.address_bits(), 4);
        assert_eq!(config.data_width(), 16);
        assert_eq!(config.sync_stages(), 2);
        assert_eq!(config.write_interval(), 1);
        assert_eq!(config.read_interval(), 1);
        assert_eq!(config.items(), 256);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config {
            address_bits: Some(3),
            data_width: None,
            sync_stages: Some(2),
            ..Default::default()
        };

        let overlay = Config {
            address_bits: None,
            data_width: Some(32),
            sync_stages: Some(3),
            ..Default::default()
        };

        base.merge(overlay);

        // address_bits unchanged (overlay was None)
        assert_eq!(base.address_bits, Some(3));
        // data_width set from overlay
        assert_eq!(base.data_width, Some(32));
        // sync_stages overridden by overlay
        assert_eq!(base.sync_stages, Some(3));
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = Config::sample_config();
        let config: Config = toml::from_str(&sample).expect("Sample config should parse");
        assert_eq!(config.address_bits, Some(4));
        assert_eq!(config.data_width, Some(16));
    }
}
