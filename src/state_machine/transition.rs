//! Transition representation

use crate::parser::StateNumber;
use serde::{Deserialize, Serialize};

/// A transition from a state to one of its next states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: StateNumber,
    pub to: StateNumber,
}

impl Transition {
    pub fn new(from: impl Into<StateNumber>, to: impl Into<StateNumber>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.from == self.to
    }
}
