//! TOML configuration for the device host.
//!
//! Read from an explicit path, or from the platform-appropriate file:
//! - Windows:  `%APPDATA%\Aik\device.toml`
//! - Linux:    `$XDG_CONFIG_HOME/aik/device.toml` or `~/.config/aik/device.toml`
//! - macOS:    `~/Library/Application Support/Aik/device.toml`
//!
//! ```toml
//! [device]
//! name = "AikKmdfIoctl"
//! sink = "send-input"
//! queue_depth = 64
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section or a
//! missing key all fall back to the values above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "device.toml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No explicit path was given and the platform directory is unknown.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but a value is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Which downstream sink the host attaches at start-up.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SinkKind {
    /// The OS input stream (Windows only; degraded elsewhere).
    #[default]
    SendInput,
    /// No sink: every inject is acknowledged but not delivered.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceSection {
    /// Device name used in log output.
    #[serde(default = "default_device_name")]
    pub name: String,
    #[serde(default)]
    pub sink: SinkKind,
    /// Capacity of the sequential request queue.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSection {
    /// `tracing` level or filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_device_name() -> String {
    "AikKmdfIoctl".to_string()
}
fn default_queue_depth() -> usize {
    64
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            sink: SinkKind::default(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DeviceConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::Invalid`]
    /// for a zero `queue_depth`.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: DeviceConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "device.queue_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from `path`, or from [`config_file_path`] when `None`.
/// A missing file yields `DeviceConfig::default()`.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] and [`ConfigError::Invalid`] for bad content.
pub fn load_config(path: Option<&Path>) -> Result<DeviceConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => DeviceConfig::from_toml(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DeviceConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Platform config base directory including the `Aik` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Aik"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("aik"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Aik")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.device.name, "AikKmdfIoctl");
        assert_eq!(cfg.device.sink, SinkKind::SendInput);
        assert_eq!(cfg.device.queue_depth, 64);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg = DeviceConfig::from_toml("").unwrap();
        assert_eq!(cfg, DeviceConfig::default());
    }

    #[test]
    fn test_partial_device_section_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[device]
sink = "none"
"#;

        // Act
        let cfg = DeviceConfig::from_toml(toml_str).unwrap();

        // Assert
        assert_eq!(cfg.device.sink, SinkKind::None);
        assert_eq!(cfg.device.queue_depth, 64, "unspecified fields keep defaults");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_unknown_sink_kind_is_parse_error() {
        let result = DeviceConfig::from_toml("[device]\nsink = \"hid\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_queue_depth_is_invalid() {
        let result = DeviceConfig::from_toml("[device]\nqueue_depth = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_serializes_sink_in_kebab_case() {
        let toml_str = toml::to_string_pretty(&DeviceConfig::default()).expect("serialize");
        assert!(toml_str.contains("sink = \"send-input\""), "got {toml_str}");
    }

    #[test]
    fn test_load_config_reads_explicit_path() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[device]\nname = \"bench-device\"\nqueue_depth = 8\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        // Act
        let cfg = load_config(Some(&path)).unwrap();

        // Assert
        assert_eq!(cfg.device.name, "bench-device");
        assert_eq!(cfg.device.queue_depth, 8);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_load_config_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg, DeviceConfig::default());
    }

    #[test]
    fn test_load_config_directory_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(dir.path()));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_config_file_path_ends_with_device_toml() {
        // NoPlatformConfigDir is acceptable in a stripped environment.
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME), "got {path:?}");
        }
    }
}
