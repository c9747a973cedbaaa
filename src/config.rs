//! Configuration management and validation.
//!
//! Provides the processing knobs for a synchronisation run: worker
//! concurrency, the undated-row policy and the numeric coercion switch.
//! Values can be loaded from a TOML file and overridden from the CLI.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// What to do with a row whose timestamp cannot be constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidTimestampPolicy {
    /// Drop the row and count it in the file's statistics
    #[default]
    Drop,
    /// Keep the row without a timestamp; it sorts after every dated row
    Keep,
}

/// Global configuration for NDBC synchronisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum files normalized at once by the concurrent pipeline
    pub max_concurrent_files: usize,

    /// Handling of rows with unconstructible timestamps
    pub invalid_timestamps: InvalidTimestampPolicy,

    /// Apply lenient numeric coercion to every variant, including the
    /// four digit year layout that is otherwise assumed numeric
    pub uniform_coercion: bool,

    /// Show a progress bar while files are processed
    pub show_progress: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get().max(1),
            invalid_timestamps: InvalidTimestampPolicy::Drop,
            uniform_coercion: false,
            show_progress: false,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            SyncError::Configuration { message } => SyncError::Configuration {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| SyncError::Configuration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(SyncError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Set the undated-row policy
    pub fn with_invalid_timestamps(mut self, policy: InvalidTimestampPolicy) -> Self {
        self.invalid_timestamps = policy;
        self
    }

    /// Enable lenient coercion for every variant
    pub fn with_uniform_coercion(mut self) -> Self {
        self.uniform_coercion = true;
        self
    }

    /// Enable the progress bar
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(config.max_concurrent_files >= 1);
        assert_eq!(config.invalid_timestamps, InvalidTimestampPolicy::Drop);
        assert!(!config.uniform_coercion);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml_str("invalid_timestamps = \"keep\"\n").unwrap();
        assert_eq!(config.invalid_timestamps, InvalidTimestampPolicy::Keep);
        assert!(!config.uniform_coercion);
        assert_eq!(
            config.max_concurrent_files,
            SyncConfig::default().max_concurrent_files
        );
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = SyncConfig::from_toml_str("max_concurrent_files = 0\n");
        assert!(matches!(result, Err(SyncError::Configuration { .. })));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = SyncConfig::from_toml_str("invalid_timestamps = \"ignore\"\n");
        assert!(matches!(result, Err(SyncError::Configuration { .. })));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_files = 2").unwrap();
        writeln!(file, "uniform_coercion = true").unwrap();

        let config = SyncConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.max_concurrent_files, 2);
        assert!(config.uniform_coercion);
    }

    #[test]
    fn test_builder_methods() {
        let config = SyncConfig::default()
            .with_max_concurrent_files(3)
            .with_invalid_timestamps(InvalidTimestampPolicy::Keep)
            .with_uniform_coercion()
            .with_progress();

        assert_eq!(config.max_concurrent_files, 3);
        assert_eq!(config.invalid_timestamps, InvalidTimestampPolicy::Keep);
        assert!(config.uniform_coercion);
        assert!(config.show_progress);
    }
}
