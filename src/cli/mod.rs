//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// NDC State Table Visualizer CLI
#[derive(Parser, Debug)]
#[command(name = "ndc-state-viz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// State store file (overrides config)
    #[arg(long, global = true, env = "NDC_STATE_STORE")]
    pub store: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode state records without storing them
    Decode {
        /// 28-character records, or comma separated token lists
        #[arg(required = true)]
        records: Vec<String>,
    },

    /// Add states to the state store
    Add {
        /// File with one state per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// 28-character records, or comma separated token lists
        records: Vec<String>,
    },

    /// Delete a state from the state store
    Delete {
        /// State number
        number: String,
    },

    /// Show a stored state
    Show {
        /// State number
        number: String,
    },

    /// Print the nodes and transitions of the state graph
    Graph {
        /// Read states from this file instead of the state store
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,

        /// Also write the graph to a timestamped DOT file
        #[arg(long)]
        export: bool,
    },

    /// Report cycles, dangling transitions and unreachable states
    Analyze {
        /// Read states from this file instead of the state store
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// DOT format (Graphviz)
    Dot,
    /// Plain text table
    Table,
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    let store = args.store;
    match args.command {
        Commands::Decode { records } => commands::decode::execute(&records),
        Commands::Add { file, records } => {
            commands::add::execute(&config, store, file.as_deref(), &records)
        }
        Commands::Delete { number } => commands::delete::execute(&config, store, &number),
        Commands::Show { number } => commands::show::execute(&config, store, &number),
        Commands::Graph {
            input,
            output,
            export,
        } => commands::graph::execute(&config, store, input.as_deref(), output, export),
        Commands::Analyze { input, json } => {
            commands::analyze::execute(&config, store, input.as_deref(), json)
        }
    }
}
