//! CLI module
//!
//! Command-line interface and HTTP server mode.
//!
//! # Commands
//!
//! - `run` - Transform and load one raw object
//! - `fetch` - Download a source into the raw bucket
//! - `preview` - Normalize without publishing
//! - `datasets` - List registered datasets
//! - `validate` - Check a dataset definition file
//! - `serve` - Start HTTP server mode

mod commands;
mod context;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat, StorageArg};
pub use context::AppContext;
pub use runner::Runner;
pub use server::{router, serve};
