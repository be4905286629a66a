//! Dataset handler registry
//!
//! Built-in definitions are embedded in the binary; extra definitions can be
//! loaded from a directory and replace built-ins with the same identity.

use super::parser::{load_definition, load_definition_from_str};
use super::types::{DatasetDefinition, DatasetSummary};
use super::{DatasetHandler, DeclarativeDataset};
use crate::error::{Error, Result};
use crate::types::DatasetIdentity;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// Built-in dataset YAML definitions keyed by `provider/name`
pub static BUILTIN_DATASETS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();
        m.insert(
            "dit/trade-barriers",
            include_str!("../../datasets/dit-trade-barriers.yaml"),
        );
        m.insert("ea/floods", include_str!("../../datasets/ea-floods.yaml"));
        m.insert(
            "nhs/uec-sitrep",
            include_str!("../../datasets/nhs-uec-sitrep.yaml"),
        );
        m
    });

/// Parse every built-in definition
pub fn builtin_definitions() -> Result<Vec<DatasetDefinition>> {
    let mut keys: Vec<&str> = BUILTIN_DATASETS.keys().copied().collect();
    keys.sort_unstable();
    keys.into_iter()
        .map(|key| {
            load_definition_from_str(BUILTIN_DATASETS[key])
                .map_err(|e| Error::definition(key, format!("built-in definition: {e}")))
        })
        .collect()
}

struct Entry {
    handler: Arc<dyn DatasetHandler>,
    summary: Option<DatasetSummary>,
}

/// Dataset handlers keyed by case-normalized identity
#[derive(Default)]
pub struct DatasetRegistry {
    entries: HashMap<DatasetIdentity, Entry>,
}

impl std::fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("datasets", &self.identities())
            .finish()
    }
}

impl DatasetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in datasets
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for definition in builtin_definitions()? {
            registry.register_definition(definition)?;
        }
        Ok(registry)
    }

    /// Register a handler, replacing any handler with the same identity
    pub fn register(&mut self, handler: Arc<dyn DatasetHandler>) {
        self.insert(handler, None);
    }

    /// Build and register a handler from a definition
    pub fn register_definition(&mut self, definition: DatasetDefinition) -> Result<()> {
        let summary = DatasetSummary::from(&definition);
        let handler = DeclarativeDataset::new(definition)?;
        self.insert(Arc::new(handler), Some(summary));
        Ok(())
    }

    fn insert(&mut self, handler: Arc<dyn DatasetHandler>, summary: Option<DatasetSummary>) {
        let identity = handler.identity().normalized();
        if self.entries.contains_key(&identity) {
            debug!(dataset = %identity, "Replacing registered dataset");
        }
        self.entries.insert(identity, Entry { handler, summary });
    }

    /// Load every `*.yaml` / `*.yml` definition in a directory
    ///
    /// Returns the number of definitions loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::config(format!(
                "Failed to read datasets directory '{}': {e}",
                dir.display()
            ))
        })?;

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.retain(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
        });
        paths.sort();

        for path in &paths {
            let definition = load_definition(path)?;
            debug!(dataset = %definition.identity(), path = %path.display(), "Loaded dataset definition");
            self.register_definition(definition)?;
        }

        info!(dir = %dir.display(), count = paths.len(), "Loaded dataset definitions");
        Ok(paths.len())
    }

    /// Look up a handler by identity (case-insensitive)
    pub fn get(&self, identity: &DatasetIdentity) -> Result<Arc<dyn DatasetHandler>> {
        self.entries
            .get(&identity.normalized())
            .map(|entry| Arc::clone(&entry.handler))
            .ok_or_else(|| Error::UnknownDataset {
                provider: identity.provider.clone(),
                name: identity.name.clone(),
            })
    }

    pub fn contains(&self, identity: &DatasetIdentity) -> bool {
        self.entries.contains_key(&identity.normalized())
    }

    /// Registered identities, sorted
    pub fn identities(&self) -> Vec<DatasetIdentity> {
        let mut ids: Vec<DatasetIdentity> = self.entries.keys().cloned().collect();
        ids.sort_by(|a, b| (&a.provider, &a.name).cmp(&(&b.provider, &b.name)));
        ids
    }

    /// Listing of registered datasets, sorted by identity
    pub fn summaries(&self) -> Vec<DatasetSummary> {
        self.identities()
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| {
                entry.summary.clone().unwrap_or_else(|| {
                    let id = entry.handler.identity();
                    DatasetSummary {
                        provider: id.provider,
                        name: id.name,
                        format: "custom".to_string(),
                        columns: 0,
                        description: None,
                    }
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
