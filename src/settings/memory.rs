//! In-memory settings store for tests and one-shot runs

use super::SettingsStore;
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
