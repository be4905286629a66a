//! Parquet encoding
//!
//! Encodes Arrow RecordBatches as Parquet, either into any `Write` sink or
//! straight into an in-memory buffer ready for a single object PUT.

use crate::config::CompressionCodec;
use crate::error::Result;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::io::Write;

/// Writer options applied to every published table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParquetWriterConfig {
    codec: CompressionCodec,
    max_rows_per_group: usize,
    dictionary: bool,
    column_stats: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::Snappy,
            max_rows_per_group: 1 << 20,
            dictionary: true,
            column_stats: true,
        }
    }
}

impl ParquetWriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_codec(self, codec: CompressionCodec) -> Self {
        Self { codec, ..self }
    }

    /// Rows per row group; at least one
    #[must_use]
    pub fn with_row_group_size(self, rows: usize) -> Self {
        Self {
            max_rows_per_group: rows.max(1),
            ..self
        }
    }

    #[must_use]
    pub fn with_dictionary(self, dictionary: bool) -> Self {
        Self { dictionary, ..self }
    }

    #[must_use]
    pub fn with_statistics(self, column_stats: bool) -> Self {
        Self {
            column_stats,
            ..self
        }
    }

    pub fn codec(&self) -> CompressionCodec {
        self.codec
    }

    pub fn row_group_size(&self) -> usize {
        self.max_rows_per_group
    }

    /// Parquet compression for the configured codec
    pub fn compression(&self) -> Compression {
        match self.codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::None => Compression::UNCOMPRESSED,
        }
    }

    fn properties(&self) -> WriterProperties {
        let stats = if self.column_stats {
            EnabledStatistics::Page
        } else {
            EnabledStatistics::None
        };
        WriterProperties::builder()
            .set_compression(self.compression())
            .set_max_row_group_size(self.max_rows_per_group)
            .set_dictionary_enabled(self.dictionary)
            .set_statistics_enabled(stats)
            .build()
    }
}

/// Parquet writer over any sink, counting the rows it has accepted
pub struct ParquetWriter<W: Write + Send> {
    inner: ArrowWriter<W>,
    rows: usize,
}

impl<W: Write + Send> ParquetWriter<W> {
    pub fn try_new(sink: W, schema: SchemaRef, config: &ParquetWriterConfig) -> Result<Self> {
        let inner = ArrowWriter::try_new(sink, schema, Some(config.properties()))?;
        Ok(Self { inner, rows: 0 })
    }

    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner.write(batch)?;
        self.rows += batch.num_rows();
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Write the footer and hand back the sink
    pub fn into_inner(self) -> Result<W> {
        Ok(self.inner.into_inner()?)
    }
}

/// Encode one batch as a complete Parquet file in memory
pub fn encode_parquet(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let mut sink = ParquetWriter::try_new(Vec::new(), batch.schema(), config)?;
    sink.write(batch)?;
    sink.into_inner().map(Bytes::from)
}
