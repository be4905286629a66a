//! CLI commands and argument parsing

use crate::config::StorageBackend;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Loads raw dataset payloads into typed Parquet lake tables
#[derive(Parser, Debug)]
#[command(name = "lake-loader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of extra dataset definitions (overrides built-ins)
    #[arg(short, long, global = true)]
    pub datasets_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true)]
    pub storage: Option<StorageArg>,

    /// Root directory for the local storage backend
    #[arg(long, global = true)]
    pub local_root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform and load one raw object into its lake table
    Run {
        /// Invocation event file (JSON)
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Inline invocation event JSON
        #[arg(long)]
        event_json: Option<String>,
    },

    /// Download a source URL into the raw bucket
    Fetch {
        /// Fetch request file (JSON)
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Inline fetch request JSON
        #[arg(long)]
        event_json: Option<String>,

        /// Continue with the transform-load stage
        #[arg(long)]
        and_run: bool,
    },

    /// Normalize a raw object and print the rows without publishing
    Preview {
        /// Invocation event file (JSON)
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Inline invocation event JSON
        #[arg(long)]
        event_json: Option<String>,

        /// Maximum rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// List registered datasets
    Datasets,

    /// Validate a dataset definition file
    Validate {
        /// Definition file (YAML)
        file: PathBuf,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}

/// Storage backend selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageArg {
    S3,
    Local,
    Memory,
}

impl From<StorageArg> for StorageBackend {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::S3 => StorageBackend::S3,
            StorageArg::Local => StorageBackend::Local,
            StorageArg::Memory => StorageBackend::Memory,
        }
    }
}
