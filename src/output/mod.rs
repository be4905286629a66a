//! Output module
//!
//! Encodes canonical tables as Parquet and publishes them to the lake.
//!
//! # Overview
//!
//! - Converting passthrough JSON values to Arrow arrays
//! - Encoding RecordBatches as Parquet
//! - Overwrite publishing of one data object per table
//! - Registering the table in a manifest catalog

mod arrays;
mod catalog;
mod publisher;
mod writer;

pub use arrays::json_array;
pub use catalog::{Catalog, ManifestCatalog, ManifestColumn, TableManifest};
pub use publisher::{LakePublisher, ObjectStoreLake, PublishReceipt, PART_FILE};
pub use writer::{encode_parquet, ParquetWriter, ParquetWriterConfig};
