//! Disassembler configuration
//!
//! Settings come from three layers, later ones winning: a TOML file,
//! `KBC_DISASM_*` environment variables, then command-line flags.
//!
//! ```toml
//! show_bytes = true
//! show_offsets = true
//! base_offset = 0x100
//! stop_on_error = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

/// Environment variable overriding [`DisasmConfig::show_bytes`]
pub const ENV_SHOW_BYTES: &str = "KBC_DISASM_SHOW_BYTES";

/// Environment variable overriding [`DisasmConfig::base_offset`]
pub const ENV_BASE_OFFSET: &str = "KBC_DISASM_BASE_OFFSET";

/// Listing options for [`crate::disassemble`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisasmConfig {
    /// Print the raw instruction bytes next to each line
    pub show_bytes: bool,
    /// Prefix each line with its offset
    pub show_offsets: bool,
    /// Added to every printed offset and jump target
    pub base_offset: u64,
    /// End the listing at the first undecodable instruction
    pub stop_on_error: bool,
}

impl Default for DisasmConfig {
    fn default() -> Self {
        Self {
            show_bytes: false,
            show_offsets: true,
            base_offset: 0,
            stop_on_error: true,
        }
    }
}

/// Errors loading a configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Cannot read {}: {}", path.display(), source),
            Self::Parse(err) => write!(f, "Invalid disassembler config: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl DisasmConfig {
    /// Parse a configuration from TOML content.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file path.
    pub fn load_from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_toml(&content)?;
        debug!(target: "kbc::cli", path = %path.display(), "Loaded disassembler config");
        Ok(config)
    }

    /// Apply `KBC_DISASM_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`. Unparsable values are
    /// ignored with a warning.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_SHOW_BYTES) {
            match parse_flag(&raw) {
                Some(flag) => self.show_bytes = flag,
                None => warn!(target: "kbc::cli", value = %raw, "Ignoring {}", ENV_SHOW_BYTES),
            }
        }
        if let Some(raw) = lookup(ENV_BASE_OFFSET) {
            match parse_offset(&raw) {
                Some(offset) => self.base_offset = offset,
                None => warn!(target: "kbc::cli", value = %raw, "Ignoring {}", ENV_BASE_OFFSET),
            }
        }
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Decimal or `0x`-prefixed hexadecimal offset
pub fn parse_offset(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}
