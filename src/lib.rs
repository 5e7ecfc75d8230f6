//! NDC State Table Visualizer
//!
//! Decodes NDC ATM state tables and lays their transaction flow out as a
//! leveled graph.
//!
//! This library provides functionality for:
//! - Decoding 28-character state records and ten-token state lists
//! - Storing decoded states, optionally persisted to a settings file
//! - Deriving nodes and transitions of the state graph
//! - Assigning layout levels from the root state `000`, including
//!   extension states and states the root does not reach
//!
//! ```
//! use ndc_state_viz::StateService;
//!
//! let mut service = StateService::new();
//! service.add_record("000A870500128002002002001127").unwrap();
//! let nodes = service.nodes().unwrap();
//! assert_eq!(nodes[0].label, "000 A");
//! assert_eq!(service.edges().len(), 2);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod settings;
pub mod state_machine;

pub use config::Config;
pub use error::{Error, Result};
pub use parser::{StateRecord, decode, normalize};
pub use state_machine::StateService;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
