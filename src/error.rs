//! Error types for lake-loader
//!
//! Every stage of an invocation returns `Result<T, Error>`. Failures are never
//! recovered locally: they abort the run and are reported to the orchestrator
//! with the [`ErrorKind`] returned by [`Error::kind`].

use serde::Serialize;
use thiserror::Error;

/// The main error type for lake-loader
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // ============================================================================
    // Parse / Normalize Errors
    // ============================================================================
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Schema violation in column '{column}' at row {row}: {message}")]
    SchemaViolation {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Required column '{column}' is missing at row {row}")]
    MissingColumn { column: String, row: usize },

    // ============================================================================
    // Publish Errors
    // ============================================================================
    #[error("Publish to {path} failed: {message}")]
    PublishFailure { path: String, message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // Dataset / Configuration Errors
    // ============================================================================
    #[error("No dataset registered for {provider}/{name}")]
    UnknownDataset { provider: String, name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid dataset definition '{dataset}': {message}")]
    InvalidDefinition { dataset: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O and Generic Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure kind reported to the invoking workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ObjectNotFound,
    AccessDenied,
    Storage,
    MalformedInput,
    SchemaViolation,
    PublishFailure,
    UnknownDataset,
    FetchFailure,
    Config,
    Internal,
}

impl ErrorKind {
    /// Name used in the `errorType` field of a failed invocation
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ObjectNotFound => "ObjectNotFound",
            ErrorKind::AccessDenied => "AccessDenied",
            ErrorKind::Storage => "Storage",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::SchemaViolation => "SchemaViolation",
            ErrorKind::PublishFailure => "PublishFailure",
            ErrorKind::UnknownDataset => "UnknownDataset",
            ErrorKind::FetchFailure => "FetchFailure",
            ErrorKind::Config => "Config",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a malformed input error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Create a schema violation for a single cell
    pub fn schema_violation(column: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            column: column.into(),
            row,
            message: message.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>, row: usize) -> Self {
        Self::MissingColumn {
            column: column.into(),
            row,
        }
    }

    /// Create a publish error
    pub fn publish(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PublishFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid definition error
    pub fn definition(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Classify this error for the orchestrator
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
            Error::AccessDenied { .. } => ErrorKind::AccessDenied,
            Error::Storage { .. } => ErrorKind::Storage,
            Error::MalformedInput { .. } => ErrorKind::MalformedInput,
            Error::SchemaViolation { .. } | Error::MissingColumn { .. } => {
                ErrorKind::SchemaViolation
            }
            Error::PublishFailure { .. } | Error::Arrow(_) | Error::Parquet(_) => {
                ErrorKind::PublishFailure
            }
            Error::UnknownDataset { .. } => ErrorKind::UnknownDataset,
            Error::Http(_) | Error::HttpStatus { .. } | Error::InvalidUrl(_) => {
                ErrorKind::FetchFailure
            }
            Error::Config { .. }
            | Error::InvalidDefinition { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => ErrorKind::Config,
            Error::Io(_) | Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Orchestrator-facing failure payload: `{errorType, errorMessage}`
    pub fn to_failure_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errorType": self.kind().as_str(),
            "errorMessage": self.to_string(),
        })
    }
}

/// Result type alias for lake-loader
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::schema_violation("severityLevel", 3, "not an integer");
        assert_eq!(
            err.to_string(),
            "Schema violation in column 'severityLevel' at row 3: not an integer"
        );

        let err = Error::ObjectNotFound {
            bucket: "raw".to_string(),
            key: "ea/floods/x.json".to_string(),
        };
        assert_eq!(err.to_string(), "Object not found: s3://raw/ea/floods/x.json");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            Error::missing_column("id", 0).kind(),
            ErrorKind::SchemaViolation
        );
        assert_eq!(Error::malformed("bad").kind(), ErrorKind::MalformedInput);
        assert_eq!(
            Error::publish("s3://lake/x", "boom").kind(),
            ErrorKind::PublishFailure
        );
        assert_eq!(
            Error::http_status("http://x", 503, "").kind(),
            ErrorKind::FetchFailure
        );
        assert_eq!(Error::Other("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_failure_json() {
        let value = Error::malformed("missing key 'items'").to_failure_json();
        assert_eq!(value["errorType"], "MalformedInput");
        assert_eq!(value["errorMessage"], "Malformed input: missing key 'items'");
    }
}
