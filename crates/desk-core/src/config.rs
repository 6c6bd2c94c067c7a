//! Configuration for the service desk monitor.
//!
//! Loaded from YAML at `~/.servicedesk/config.yaml` (or an explicit path).
//! Every field has a default, so an absent default file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DeskError, Result};

/// Configuration file name inside the base directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Seconds between ticket batch refreshes
    pub refresh_interval_secs: u64,

    /// Mock ticket generation
    pub generator: GeneratorConfig,

    /// Alert timing
    pub alert: AlertConfig,

    /// Audible alert settings
    pub sound: SoundConfig,

    /// Color theme name (default, dark, light)
    pub theme: String,

    /// External service handle settings
    pub service: ServiceConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 10,
            generator: GeneratorConfig::default(),
            alert: AlertConfig::default(),
            sound: SoundConfig::default(),
            theme: "default".to_string(),
            service: ServiceConfig::default(),
        }
    }
}

/// Ticket generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Smallest batch size (inclusive)
    pub min_batch: usize,

    /// Largest batch size (inclusive)
    pub max_batch: usize,

    /// Probability that a generated ticket has no handler
    pub unassigned_ratio: f64,

    /// Fixed RNG seed for reproducible queues
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_batch: 3,
            max_batch: 8,
            unassigned_ratio: 0.8,
            seed: None,
        }
    }
}

/// Alert timing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// How long the unassigned badge flashes, in milliseconds
    pub flash_ms: u64,

    /// Seconds between repeated chimes
    pub chime_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            flash_ms: 1000,
            chime_interval_secs: 3,
        }
    }
}

impl AlertConfig {
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn chime_interval(&self) -> Duration {
        Duration::from_secs(self.chime_interval_secs)
    }
}

/// Which audio backend plays chimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SoundBackend {
    /// Terminal bell (BEL)
    #[default]
    Bell,
    /// No audio output at all
    None,
}

/// Audible alert settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Whether sound starts enabled (toggled at runtime with `s`)
    pub enabled: bool,

    pub backend: SoundBackend,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: SoundBackend::Bell,
        }
    }
}

/// Service client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub project_id: String,
    pub api_url: String,
    pub auth_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            project_id: "servicedesk-demo".to_string(),
            api_url: "https://api.servicedesk.example.com/v1".to_string(),
            auth_url: "https://auth.servicedesk.example.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl DeskConfig {
    /// Default configuration file path: `~/.servicedesk/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::logging::default_base_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// path is tried and defaults are used if it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and validate a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DeskError::config_not_found_with_source(path, e),
            _ => DeskError::io("reading config", path, e),
        })?;

        let config = Self::from_yaml(&content).map_err(|e| match e {
            DeskError::ConfigInvalid { message, .. } => DeskError::ConfigInvalid {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML content.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| DeskError::ConfigInvalid {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(DeskError::validation("refresh_interval_secs must be > 0"));
        }
        if self.alert.flash_ms == 0 {
            return Err(DeskError::validation("alert.flash_ms must be > 0"));
        }
        if self.alert.chime_interval_secs == 0 {
            return Err(DeskError::validation("alert.chime_interval_secs must be > 0"));
        }
        if self.generator.min_batch == 0 {
            return Err(DeskError::validation("generator.min_batch must be > 0"));
        }
        if self.generator.min_batch > self.generator.max_batch {
            return Err(DeskError::validation(format!(
                "generator.min_batch ({}) exceeds generator.max_batch ({})",
                self.generator.min_batch, self.generator.max_batch
            )));
        }
        if !(0.0..=1.0).contains(&self.generator.unassigned_ratio) {
            return Err(DeskError::validation(format!(
                "generator.unassigned_ratio must be within [0, 1], got {}",
                self.generator.unassigned_ratio
            )));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Override the refresh interval.
    pub fn with_refresh_secs(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    /// Override the generator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.generator.seed = Some(seed);
        self
    }

    /// Start with sound disabled.
    pub fn muted(mut self) -> Self {
        self.sound.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DeskConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.alert.flash_duration(), Duration::from_secs(1));
        assert_eq!(config.alert.chime_interval(), Duration::from_secs(3));
        assert_eq!(config.generator.min_batch, 3);
        assert_eq!(config.generator.max_batch, 8);
        assert!(config.sound.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DeskConfig::from_yaml(
            "refresh_interval_secs: 5\nsound:\n  backend: none\n",
        )
        .unwrap();
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.sound.backend, SoundBackend::None);
        assert!(config.sound.enabled);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = DeskConfig::from_yaml("refresh_interval_secs: [oops").unwrap_err();
        assert!(matches!(err, DeskError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let err = DeskConfig::from_yaml("refresh_interval_secs: 0").unwrap_err();
        assert!(err.to_string().contains("refresh_interval_secs"));

        let err = DeskConfig::from_yaml("generator:\n  min_batch: 9\n  max_batch: 4\n").unwrap_err();
        assert!(err.to_string().contains("exceeds"));

        let err = DeskConfig::from_yaml("generator:\n  unassigned_ratio: 1.5\n").unwrap_err();
        assert!(err.to_string().contains("unassigned_ratio"));

        let err = DeskConfig::from_yaml("alert:\n  chime_interval_secs: 0\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "theme: dark").unwrap();
        writeln!(file, "generator:").unwrap();
        writeln!(file, "  seed: 42").unwrap();

        let config = DeskConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.generator.seed, Some(42));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeskConfig::load(Some(&dir.path().join("missing.yaml"))).unwrap_err();
        assert!(matches!(err, DeskError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alert: [").unwrap();

        match DeskConfig::from_file(file.path()).unwrap_err() {
            DeskError::ConfigInvalid { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overrides() {
        let config = DeskConfig::default().with_refresh_secs(2).with_seed(7).muted();
        assert_eq!(config.refresh_interval_secs, 2);
        assert_eq!(config.generator.seed, Some(7));
        assert!(!config.sound.enabled);
    }
}
