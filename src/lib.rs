//! # lake-loader
//!
//! Loads raw dataset payloads (JSON API responses, spreadsheet exports) from
//! object storage, normalizes them into strictly typed tables and publishes
//! them to a data lake as Parquet, replacing the previous version.
//!
//! ## Features
//!
//! - **Declarative datasets**: per-dataset column declarations in YAML
//! - **Strict normalization**: projection, list flattening, coercion, trimming
//! - **Wide-to-long reshape**: spreadsheets with a two-row header are unstacked
//! - **Overwrite publishing**: one Parquet object per table plus a catalog manifest
//! - **Raw fetch stage**: download a source URL into the raw bucket
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lake_loader::cli::AppContext;
//! use lake_loader::{InvocationInput, Settings};
//!
//! #[tokio::main]
//! async fn main() -> lake_loader::Result<()> {
//!     let context = AppContext::from_settings(&Settings::default())?;
//!     let input = InvocationInput::from_event(serde_json::json!({
//!         "rawBucket": "raw",
//!         "rawKey": "ea/floods/floods-2024-01-04T10:21:41.000000.json",
//!         "datasetProvider": "ea",
//!         "datasetName": "floods",
//!         "dataLakeBucket": "lake",
//!         "dataLakeDatabaseName": "lake_db"
//!     }))?;
//!
//!     let output = context.pipeline().run(&input).await?;
//!     println!("{} rows", output.rows_processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────┐   ┌───────────┐
//! │ storage  │ → │  decode  │ → │ normalize  │ → │  output   │
//! │ (reader) │   │ (parser) │   │ (coercion, │   │ (parquet, │
//! │          │   │          │   │  reshape)  │   │  catalog) │
//! └──────────┘   └──────────┘   └────────────┘   └───────────┘
//!        ↑              dataset registry selects the rules
//!   fetch (raw stage)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and invocation payloads
pub mod types;

/// Runtime settings
pub mod config;

/// Object storage access
pub mod storage;

/// Raw payload parsers
pub mod decode;

/// Schema normalization
pub mod normalize;

/// Parquet output and lake publishing
pub mod output;

/// Dataset definitions and registry
pub mod dataset;

/// Transform-load orchestration
pub mod pipeline;

/// Raw fetch stage
pub mod fetch;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::Settings;
pub use dataset::{DatasetHandler, DatasetRegistry};
pub use error::{Error, ErrorKind, Result};
pub use pipeline::Pipeline;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
