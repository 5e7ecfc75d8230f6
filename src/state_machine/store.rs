//! In-memory state table keyed by state number

use crate::parser::{StateNumber, StateRecord};
use crate::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Decoded states by number, iterated in ascending number order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateStore {
    states: BTreeMap<StateNumber, StateRecord>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record with the same number
    pub fn put(&mut self, record: StateRecord) -> Option<StateRecord> {
        self.states.insert(record.number.clone(), record)
    }

    pub fn get(&self, number: &str) -> Option<&StateRecord> {
        self.states.get(number)
    }

    /// Remove a record, returning whether it existed
    pub fn delete(&mut self, number: &str) -> bool {
        self.states.remove(number).is_some()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.states.contains_key(number)
    }

    pub fn records(&self) -> impl Iterator<Item = &StateRecord> {
        self.states.values()
    }

    pub fn numbers(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Serialize the whole mapping for the settings store
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.states)?)
    }

    /// Rebuild a store from a serialized mapping
    pub fn from_value(value: Value) -> Result<Self> {
        let states: BTreeMap<StateNumber, StateRecord> = serde_json::from_value(value)?;
        Ok(Self { states })
    }
}

impl FromIterator<StateRecord> for StateStore {
    fn from_iter<I: IntoIterator<Item = StateRecord>>(iter: I) -> Self {
        let mut store = StateStore::new();
        for record in iter {
            store.put(record);
        }
        store
    }
}
