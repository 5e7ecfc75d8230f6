//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::parser::Input;
use crate::settings::JsonFileSettings;
use crate::{Config, Result, StateService};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Read a state file: one record or token list per line, `#` starts a comment
pub fn read_inputs(path: &Path) -> Result<Vec<Input>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {:?}", path))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Input::from_line)
        .collect())
}

/// Open the persistent state table, or an in-memory one when storage is disabled
fn open_service(config: &Config, store: Option<PathBuf>) -> Result<StateService> {
    let service = if config.storage.enabled || store.is_some() {
        let path = store.unwrap_or_else(|| config.storage_path());
        tracing::debug!("Using state store {:?}", path);
        StateService::with_settings_key(
            Box::new(JsonFileSettings::new(path)),
            config.storage.key.clone(),
        )?
    } else {
        StateService::new()
    };
    Ok(service.with_disconnected_gap(config.layout.disconnected_gap))
}

/// The state table of a file, or the persistent one without a file
fn load_service(config: &Config, store: Option<PathBuf>, input: Option<&Path>) -> Result<StateService> {
    match input {
        Some(path) => {
            tracing::info!("Loading states from {:?}", path);
            let mut service =
                StateService::new().with_disconnected_gap(config.layout.disconnected_gap);
            let inputs = read_inputs(path)?;
            service.add_batch(&inputs)?;
            Ok(service)
        }
        None => open_service(config, store),
    }
}

/// Decode command implementation
pub mod decode {
    use super::*;
    use crate::cli::output;

    pub fn execute(records: &[String]) -> Result<()> {
        let decoded = records
            .iter()
            .map(|line| Input::from_line(line).decode())
            .collect::<Result<Vec<_>>>()?;

        output::output_records(&mut std::io::stdout(), &decoded)
    }
}

/// Add command implementation
pub mod add {
    use super::*;

    pub fn execute(
        config: &Config,
        store: Option<PathBuf>,
        file: Option<&Path>,
        records: &[String],
    ) -> Result<()> {
        let mut inputs = match file {
            Some(path) => read_inputs(path)?,
            None => Vec::new(),
        };
        inputs.extend(records.iter().map(|line| Input::from_line(line)));

        if inputs.is_empty() {
            return Err(crate::Error::custom("No states given"));
        }

        let mut service = open_service(config, store)?;
        let added = service.add_batch(&inputs)?;
        println!("Added {} state(s): {}", added.len(), added.join(", "));
        Ok(())
    }
}

/// Delete command implementation
pub mod delete {
    use super::*;

    pub fn execute(config: &Config, store: Option<PathBuf>, number: &str) -> Result<()> {
        let mut service = open_service(config, store)?;
        if service.delete(number)? {
            println!("Deleted state {}", number);
            Ok(())
        } else {
            Err(crate::Error::StateNotFound(number.to_string()))
        }
    }
}

/// Show command implementation
pub mod show {
    use super::*;
    use crate::cli::output;

    pub fn execute(config: &Config, store: Option<PathBuf>, number: &str) -> Result<()> {
        let service = open_service(config, store)?;
        let record = service.require(number)?;
        output::output_records(&mut std::io::stdout(), std::slice::from_ref(record))
    }
}

/// Graph command implementation
pub mod graph {
    use super::*;
    use crate::cli::{OutputFormat, output};

    pub fn execute(
        config: &Config,
        store: Option<PathBuf>,
        input: Option<&Path>,
        format: OutputFormat,
        export: bool,
    ) -> Result<()> {
        let mut service = load_service(config, store, input)?;
        let nodes = service.nodes()?;
        let edges = service.edges();
        tracing::info!("Graph has {} nodes, {} edges", nodes.len(), edges.len());

        let mut stdout = std::io::stdout();
        match format {
            OutputFormat::Json => output::output_json(&mut stdout, &nodes, &edges)?,
            OutputFormat::Table => output::output_table(&mut stdout, &nodes, &edges)?,
            OutputFormat::Dot => print!("{}", service.graph()?.to_dot()),
        }

        if export {
            let filename = format!("{}.graph.dot", chrono::Utc::now().format("%Y%m%d%H%M%S"));
            std::fs::write(&filename, service.graph()?.to_dot())?;
            eprintln!("Graph exported to {}", filename);
        }
        Ok(())
    }
}

/// Analyze command implementation
pub mod analyze {
    use super::*;
    use crate::cli::output;

    pub fn execute(
        config: &Config,
        store: Option<PathBuf>,
        input: Option<&Path>,
        json: bool,
    ) -> Result<()> {
        let mut service = load_service(config, store, input)?;
        let report = service.analyze()?;

        let mut stdout = std::io::stdout();
        if json {
            output::output_report_json(&mut stdout, &report)
        } else {
            output::output_report(&mut stdout, &report)
        }
    }
}
