//! Settings module - key/value persistence for the decoded state table
//!
//! The state service stores its whole state mapping under a single key
//! after each change. Backends:
//! - `JsonFileSettings`: a JSON object on disk
//! - `MemorySettings`: an in-process map

use crate::Result;
use serde_json::Value;

pub mod file;
pub mod memory;

pub use file::JsonFileSettings;
pub use memory::MemorySettings;

/// Default key the state mapping is stored under
pub const STATES_KEY: &str = "states";

/// Key/value settings store
pub trait SettingsStore {
    /// Read a value, `None` when the key was never set
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}
