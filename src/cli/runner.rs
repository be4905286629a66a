//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::context::AppContext;
use crate::config::Settings;
use crate::dataset::{load_definition, DatasetRegistry, DatasetSummary};
use crate::error::{Error, Result};
use crate::types::{FetchRequest, InvocationInput, JsonValue};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run { event, event_json } => {
                let event = Self::load_event(event.as_deref(), event_json.as_deref())?;
                self.run_invocation(event).await
            }
            Commands::Fetch {
                event,
                event_json,
                and_run,
            } => {
                let event = Self::load_event(event.as_deref(), event_json.as_deref())?;
                self.fetch(event, *and_run).await
            }
            Commands::Preview {
                event,
                event_json,
                limit,
            } => {
                let event = Self::load_event(event.as_deref(), event_json.as_deref())?;
                self.preview(event, *limit).await
            }
            Commands::Datasets => self.datasets(),
            Commands::Validate { file } => self.validate(file),
            Commands::Serve { port } => {
                let context = AppContext::from_settings(&self.settings()?)?;
                crate::cli::serve(context, *port).await
            }
        }
    }

    /// Settings file merged with command-line overrides
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.cli.config.as_deref())?;
        if let Some(storage) = self.cli.storage {
            settings.storage.backend = storage.into();
        }
        if let Some(root) = &self.cli.local_root {
            settings.storage.local_root = Some(root.clone());
        }
        if let Some(dir) = &self.cli.datasets_dir {
            settings.datasets_dir = Some(dir.clone());
        }
        Ok(settings)
    }

    fn registry(&self) -> Result<DatasetRegistry> {
        let settings = self.settings()?;
        let mut registry = DatasetRegistry::with_builtins()?;
        if let Some(dir) = &settings.datasets_dir {
            registry.load_dir(dir)?;
        }
        Ok(registry)
    }

    /// Read an event from a file or inline JSON (exactly one)
    fn load_event(file: Option<&Path>, inline: Option<&str>) -> Result<JsonValue> {
        match (file, inline) {
            (Some(_), Some(_)) => Err(Error::config(
                "Use either --event or --event-json, not both",
            )),
            (Some(path), None) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::config(format!(
                        "Failed to read event file '{}': {e}",
                        path.display()
                    ))
                })?;
                serde_json::from_str(&content).map_err(|e| {
                    Error::config(format!("Invalid event file '{}': {e}", path.display()))
                })
            }
            (None, Some(json)) => serde_json::from_str(json)
                .map_err(|e| Error::config(format!("Invalid --event-json: {e}"))),
            (None, None) => Err(Error::config(
                "An event is required (use --event or --event-json)",
            )),
        }
    }

    async fn run_invocation(&self, event: JsonValue) -> Result<()> {
        let input = InvocationInput::from_event(event)?;
        let context = AppContext::from_settings(&self.settings()?)?;

        let output = context.pipeline().run(&input).await?;
        self.output(&output);
        Ok(())
    }

    async fn fetch(&self, event: JsonValue, and_run: bool) -> Result<()> {
        let request: FetchRequest = serde_json::from_value(event)
            .map_err(|e| Error::config(format!("Invalid fetch request: {e}")))?;
        let context = AppContext::from_settings(&self.settings()?)?;

        let start = Instant::now();
        let input = context.fetcher().fetch(&request).await?;
        info!(
            key = %input.raw_key,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetch complete"
        );

        if and_run {
            let output = context.pipeline().run(&input).await?;
            self.output(&output);
        } else {
            self.output(&input);
        }
        Ok(())
    }

    async fn preview(&self, event: JsonValue, limit: usize) -> Result<()> {
        let input = InvocationInput::from_event(event)?;
        let context = AppContext::from_settings(&self.settings()?)?;

        let table = context.pipeline().preview(&input).await?;
        let rows: Vec<JsonValue> = table
            .to_json_rows()
            .into_iter()
            .take(limit)
            .map(JsonValue::Object)
            .collect();
        let columns: Vec<JsonValue> = table
            .columns()
            .iter()
            .map(|c| json!({"name": c.name, "type": c.column_type, "nullable": c.accepts_null()}))
            .collect();

        self.output(&json!({
            "dataset": input.identity().to_string(),
            "rowsProcessed": table.num_rows(),
            "columns": columns,
            "rows": rows,
        }));
        Ok(())
    }

    fn datasets(&self) -> Result<()> {
        let summaries: Vec<DatasetSummary> = self.registry()?.summaries();
        match self.cli.format {
            OutputFormat::Json => self.output(&summaries),
            OutputFormat::Pretty => {
                for s in &summaries {
                    println!(
                        "{}/{}  ({}, {} columns){}",
                        s.provider,
                        s.name,
                        s.format,
                        s.columns,
                        s.description
                            .as_deref()
                            .map(|d| format!("  {d}"))
                            .unwrap_or_default()
                    );
                }
            }
        }
        Ok(())
    }

    fn validate(&self, file: &Path) -> Result<()> {
        let definition = load_definition(file)?;
        self.output(&json!({
            "valid": true,
            "dataset": definition.identity().to_string(),
            "columns": definition.columns.len(),
        }));
        Ok(())
    }

    fn output<T: Serialize>(&self, value: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}
