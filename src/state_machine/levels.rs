//! Layout levels for the state graph
//!
//! Levels are assigned depth first from the root state `000`: the root is
//! level 1, its next states level 2, and so on. A state keeps the level of
//! the first path that reached it, which makes cycles and self references
//! harmless. Extension states share the level of the state that uses them.
//! States not reachable from the root are laid out after the main graph,
//! separated by a gap of empty levels.

use super::StateStore;
use crate::parser::record::ROOT_STATE;
use crate::parser::{StateNumber, StateRecord};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Level of the root state
pub const ROOT_LEVEL: u32 = 1;

/// Default distance between the deepest main-graph level and disconnected states
pub const DEFAULT_DISCONNECTED_GAP: u32 = 3;

/// Collects state/level associations produced by the level engine
pub trait LevelTracker {
    fn add_state(&mut self, number: &str, level: u32);

    fn clear(&mut self);

    /// Highest recorded level, 0 when nothing is recorded
    fn max_level(&self) -> u32;
}

/// Level tracker grouping state numbers by level
#[derive(Debug, Clone, Default)]
pub struct LevelIndex {
    by_level: BTreeMap<u32, BTreeSet<StateNumber>>,
    by_state: HashMap<StateNumber, u32>,
}

impl LevelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// State numbers recorded at `level`, ascending
    pub fn states_at(&self, level: u32) -> impl Iterator<Item = &str> {
        self.by_level
            .get(&level)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn level_of(&self, number: &str) -> Option<u32> {
        self.by_state.get(number).copied()
    }

    /// Occupied levels, ascending
    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_level.keys().copied()
    }
}

impl LevelTracker for LevelIndex {
    fn add_state(&mut self, number: &str, level: u32) {
        if let Some(previous) = self.by_state.insert(number.to_string(), level)
            && let Some(states) = self.by_level.get_mut(&previous)
        {
            states.remove(number);
            if states.is_empty() {
                self.by_level.remove(&previous);
            }
        }
        self.by_level
            .entry(level)
            .or_default()
            .insert(number.to_string());
    }

    fn clear(&mut self) {
        self.by_level.clear();
        self.by_state.clear();
    }

    fn max_level(&self) -> u32 {
        self.by_level.keys().next_back().copied().unwrap_or(0)
    }
}

/// The extension state a record links to.
///
/// Only resolves when the record's `extension_state` is set to something
/// other than the "unused" sentinels and names a stored extension state.
pub fn extension_of<'s>(store: &'s StateStore, record: &StateRecord) -> Option<&'s StateRecord> {
    record
        .linked_extension()
        .and_then(|number| store.get(number))
        .filter(|ext| ext.is_extension())
}

/// Computes and owns the level of every state in a store
#[derive(Debug, Clone)]
pub struct LevelEngine<T: LevelTracker = LevelIndex> {
    levels: HashMap<StateNumber, u32>,
    tracker: T,
    disconnected_gap: u32,
    unlinked: Vec<StateNumber>,
}

impl Default for LevelEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelEngine {
    pub fn new() -> Self {
        Self::with_tracker(LevelIndex::new())
    }
}

impl<T: LevelTracker> LevelEngine<T> {
    pub fn with_tracker(tracker: T) -> Self {
        Self {
            levels: HashMap::new(),
            tracker,
            disconnected_gap: DEFAULT_DISCONNECTED_GAP,
            unlinked: Vec::new(),
        }
    }

    pub fn with_disconnected_gap(mut self, gap: u32) -> Self {
        self.disconnected_gap = gap;
        self
    }

    pub fn level(&self, number: &str) -> Option<u32> {
        self.levels.get(number).copied()
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// States the last recomputation could not reach from the root, in store order
    pub fn unlinked(&self) -> &[StateNumber] {
        &self.unlinked
    }

    pub fn clear_levels(&mut self) {
        self.levels.clear();
        self.unlinked.clear();
        self.tracker.clear();
    }

    fn set_level(&mut self, number: &str, level: u32) {
        self.levels.insert(number.to_string(), level);
        self.tracker.add_state(number, level);
    }

    /// Level every not yet leveled state in `numbers`, and their next states, depth first
    pub fn assign_levels<'s, I>(&mut self, store: &'s StateStore, numbers: I, level: u32)
    where
        I: IntoIterator<Item = &'s str>,
    {
        for number in numbers {
            let Some(record) = store.get(number) else {
                continue;
            };
            if self.levels.contains_key(number) {
                continue;
            }

            self.set_level(number, level);
            if let Some(extension) = extension_of(store, record) {
                self.set_level(&extension.number, level);
            }

            if let Some(targets) = record.states_to() {
                self.assign_levels(store, targets, level + 1);
            }
        }
    }

    /// Recompute the levels of every stored state
    pub fn recompute_all(&mut self, store: &StateStore) -> Result<()> {
        self.clear_levels();

        let root = store.get(ROOT_STATE).ok_or(Error::MissingRoot)?;
        self.levels.insert(root.number.clone(), ROOT_LEVEL);
        if let Some(targets) = root.states_to() {
            self.assign_levels(store, targets, ROOT_LEVEL + 1);
        }

        self.unlinked = store
            .numbers()
            .filter(|number| !self.levels.contains_key(*number))
            .map(str::to_string)
            .collect();

        if !self.unlinked.is_empty() {
            let start = self.tracker.max_level() + self.disconnected_gap;
            let unlinked = std::mem::take(&mut self.unlinked);
            self.assign_levels(store, unlinked.iter().map(String::as_str), start);
            self.unlinked = unlinked;
        }

        tracing::debug!(
            "Levels recomputed: {} states, {} unlinked",
            self.levels.len(),
            self.unlinked.len()
        );
        Ok(())
    }
}
