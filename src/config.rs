//! Configuration file parser for ~/.config/rss-writer/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, but we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::{Feed, Rfc822};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid utc_offset '{0}': expected +HH:MM, -HHMM or Z")]
    InvalidOffset(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Rendering and validation settings.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spaces per nesting level. 0 writes the document on one line.
    pub indent_width: usize,

    /// Offset dates are written in, e.g. "+09:00".
    pub utc_offset: String,

    /// Validate rendered output against the schema before writing it.
    pub validate: bool,

    /// Schema to validate against instead of the bundled RSS 2.0 schema.
    pub schema_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_width: 2,
            utc_offset: "+00:00".to_string(),
            validate: false,
            schema_path: None,
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["indent_width", "utc_offset", "validate", "schema_path"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            utc_offset = %config.utc_offset,
            validate = config.validate,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// `None` when output should not be indented.
    pub fn indent(&self) -> Option<usize> {
        (self.indent_width > 0).then_some(self.indent_width)
    }

    /// RFC-822 formatter for the configured offset.
    pub fn date_formatter(&self) -> Result<Rfc822, ConfigError> {
        parse_offset(&self.utc_offset)
            .and_then(Rfc822::from_offset_seconds)
            .ok_or_else(|| ConfigError::InvalidOffset(self.utc_offset.clone()))
    }

    /// Applies the rendering settings to `feed`.
    pub fn apply(&self, feed: &mut Feed) -> Result<(), ConfigError> {
        feed.date_formatter(self.date_formatter()?)
            .indent(self.indent());
        Ok(())
    }
}

/// Seconds east of UTC for `Z`, `±HH:MM` or `±HHMM`.
fn parse_offset(offset: &str) -> Option<i32> {
    let offset = offset.trim();
    if offset.eq_ignore_ascii_case("z") {
        return Some(0);
    }

    let (sign, rest) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    let digits: String = match rest.len() {
        5 if rest.as_bytes()[2] == b':' => rest.chars().filter(|&c| c != ':').collect(),
        4 => rest.to_string(),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

// ============================================================================
// Tests
// ============================================================================
