//! Runtime settings
//!
//! Settings are loaded from an optional YAML file; every field has a default
//! so an empty file (or no file) is valid. CLI flags override file values.
//!
//! ```yaml
//! storage:
//!   backend: s3            # s3 | local | memory
//!   endpoint: http://localhost:9000
//!   region: eu-west-2
//!   allow_http: true
//! output:
//!   compression: snappy    # snappy | zstd | gzip | none
//!   row_group_size: 1048576
//! fetch:
//!   timeout_secs: 60
//! datasets_dir: ./datasets
//! ```

use crate::error::{Error, Result};
use crate::output::ParquetWriterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Complete runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Object storage backend
    #[serde(default)]
    pub storage: StorageSettings,

    /// Parquet output options
    #[serde(default)]
    pub output: OutputSettings,

    /// Raw fetch options
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Directory of extra dataset definition YAML files
    #[serde(default)]
    pub datasets_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read settings file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a file when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Object storage backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// AWS S3 or S3-compatible service
    #[default]
    S3,
    /// Local filesystem, one directory per bucket
    Local,
    /// In-memory stores (tests, dry runs)
    Memory,
}

/// Storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Custom S3 endpoint (MinIO, LocalStack, ...)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// S3 region override
    #[serde(default)]
    pub region: Option<String>,

    /// Allow plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,

    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: Option<PathBuf>,
}

// ============================================================================
// Output
// ============================================================================

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    None,
}

/// Parquet output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub compression: CompressionCodec,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::default(),
            row_group_size: default_row_group_size(),
        }
    }
}

impl OutputSettings {
    /// Build the Parquet writer configuration
    pub fn writer_config(&self) -> ParquetWriterConfig {
        ParquetWriterConfig::new()
            .with_codec(self.compression)
            .with_row_group_size(self.row_group_size)
    }
}

// ============================================================================
// Fetch
// ============================================================================

/// Raw fetch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("lake-loader/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage.backend, StorageBackend::S3);
        assert_eq!(settings.output.row_group_size, 1024 * 1024);
        assert_eq!(settings.fetch.timeout(), Duration::from_secs(60));
        assert!(settings.fetch.user_agent.starts_with("lake-loader/"));
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r"
storage:
  backend: local
  local_root: /tmp/lake
output:
  compression: zstd
  row_group_size: 5000
fetch:
  timeout_secs: 5
datasets_dir: ./defs
";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Local);
        assert_eq!(settings.storage.local_root, Some(PathBuf::from("/tmp/lake")));
        assert_eq!(settings.output.compression, CompressionCodec::Zstd);
        let writer = settings.output.writer_config();
        assert_eq!(writer.row_group_size(), 5000);
        assert_eq!(writer.codec(), CompressionCodec::Zstd);
        assert_eq!(settings.fetch.timeout_secs, 5);
        assert_eq!(settings.datasets_dir, Some(PathBuf::from("./defs")));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = Settings::from_yaml("storage:\n  backend: ftp\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "storage:\n  backend: memory\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Memory);

        let missing = Settings::from_file(dir.path().join("nope.yaml"));
        assert!(missing.is_err());
    }
}
