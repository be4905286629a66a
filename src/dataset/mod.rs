//! Dataset handlers and definitions
//!
//! Every dataset the pipeline can load is a [`DatasetHandler`]: it knows
//! its identity, how to parse its raw payload and how to normalize it.
//!
//! # Overview
//!
//! - Definitions are YAML files ([`DatasetDefinition`])
//! - [`DeclarativeDataset`] turns a definition into a handler
//! - [`DatasetRegistry`] looks handlers up by case-insensitive identity
//!
//! # Example
//!
//! ```yaml
//! provider: ea
//! name: floods
//! format:
//!   type: record_array
//!   records_key: items
//! columns:
//!   - name: id
//!     source: "@id"
//!     type: string
//!   - name: severityLevel
//!     type: integer
//! ```

mod parser;
mod registry;
mod types;

pub use parser::{load_definition, load_definition_from_str, validate_definition};
pub use registry::{builtin_definitions, DatasetRegistry, BUILTIN_DATASETS};
pub use types::{DatasetDefinition, DatasetSummary, FormatSpec};

use crate::decode::{RawParser, RawTable, RecordArrayParser, SpreadsheetParser};
use crate::error::Result;
use crate::normalize::{CanonicalTable, Normalizer};
use crate::types::DatasetIdentity;

/// Per-dataset parse and normalize rules
pub trait DatasetHandler: Send + Sync + std::fmt::Debug {
    fn identity(&self) -> DatasetIdentity;

    /// Deserialize raw payload bytes
    fn parse(&self, data: &[u8]) -> Result<RawTable>;

    /// Convert a parsed payload to the canonical table
    fn normalize(&self, raw: RawTable) -> Result<CanonicalTable>;
}

/// Handler built from a [`DatasetDefinition`]
pub struct DeclarativeDataset {
    definition: DatasetDefinition,
    parser: Box<dyn RawParser>,
    normalizer: Normalizer,
}

impl std::fmt::Debug for DeclarativeDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclarativeDataset")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl DeclarativeDataset {
    /// Validate a definition and build its handler
    pub fn new(definition: DatasetDefinition) -> Result<Self> {
        validate_definition(&definition)?;

        let parser: Box<dyn RawParser> = match &definition.format {
            FormatSpec::RecordArray { records_key } => Box::new(match records_key {
                Some(key) => RecordArrayParser::with_key(key),
                None => RecordArrayParser::new(),
            }),
            FormatSpec::Spreadsheet { sheet, header_rows } => Box::new(SpreadsheetParser::new(
                sheet,
                [header_rows[0], header_rows[1]],
            )),
        };

        let mut normalizer = Normalizer::new(definition.columns.clone());
        if let Some(reshape) = &definition.reshape {
            normalizer = normalizer.with_reshape(reshape.clone());
        }

        Ok(Self {
            definition,
            parser,
            normalizer,
        })
    }

    pub fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }
}

impl DatasetHandler for DeclarativeDataset {
    fn identity(&self) -> DatasetIdentity {
        self.definition.identity()
    }

    fn parse(&self, data: &[u8]) -> Result<RawTable> {
        self.parser.parse(data)
    }

    fn normalize(&self, raw: RawTable) -> Result<CanonicalTable> {
        self.normalizer.normalize(raw)
    }
}

#[cfg(test)]
mod tests;
