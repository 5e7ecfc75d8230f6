//! Graph node representation

use crate::parser::StateNumber;
use serde::{Deserialize, Serialize};

/// A leveled state as drawn in the state navigator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateNode {
    pub id: StateNumber,
    pub label: String,
    pub level: u32,
}

impl StateNode {
    pub fn new(id: StateNumber, label: String, level: u32) -> Self {
        Self { id, label, level }
    }

    /// Label collapsed to a single line
    pub fn display_short(&self) -> String {
        self.label.replace('\n', " / ")
    }
}
