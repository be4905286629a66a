//! Object storage module
//!
//! Resolves buckets to `object_store` handles and reads raw payloads.
//!
//! # Backends
//!
//! - `s3` - AWS S3 or an S3-compatible endpoint (credentials from the environment)
//! - `local` - one directory per bucket under a configured root
//! - `memory` - in-process stores, used by tests and dry runs

mod reader;
mod stores;

pub use reader::{ObjectReader, StoreReader};
pub use stores::{map_store_error, BucketStores};
