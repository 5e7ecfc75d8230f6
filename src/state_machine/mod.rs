//! State machine module - store, level layout and graph of a state table

pub mod analyzer;
pub mod graph;
pub mod levels;
pub mod service;
pub mod state;
pub mod store;
pub mod transition;

// Re-export key types
pub use analyzer::{AnalysisReport, analyze};
pub use graph::{GraphStats, StateGraph, edges, nodes};
pub use levels::{LevelEngine, LevelIndex, LevelTracker, extension_of};
pub use service::StateService;
pub use state::StateNode;
pub use store::StateStore;
pub use transition::Transition;
