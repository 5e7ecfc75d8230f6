//! NDC State Table Visualizer

use clap::Parser;
use ndc_state_viz::{Config, Result, VERSION, cli, init_logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::load()?
    };

    init_logging(&config.logging.level);

    tracing::info!("NDC State Table Visualizer v{}", VERSION);
    tracing::debug!("Parsed arguments: {:?}", args);
    tracing::debug!("Loaded configuration: {:?}", config);

    cli::execute(args, config)?;

    Ok(())
}
