//! State table analyzer
//!
//! Reports structural facts about a state table that matter when reading
//! its graph: loops, states pointing at themselves, next states that are
//! not defined, and states the root cannot reach.

use super::{LevelEngine, LevelTracker, StateGraph, StateStore, edges};
use crate::parser::StateNumber;
use crate::{Result, state_machine::Transition};
use serde::Serialize;

/// Analysis report of a state table
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub total_states: usize,
    pub total_nodes: usize,
    pub total_transitions: usize,
    pub has_cycles: bool,
    pub max_level: u32,
    /// States listing themselves as a next state
    pub self_references: Vec<StateNumber>,
    /// Transitions whose target state is not defined
    pub dangling: Vec<Transition>,
    /// States the root does not reach, in table order
    pub unlinked: Vec<StateNumber>,
}

/// Analyze a state table, recomputing its levels
pub fn analyze<T: LevelTracker>(
    store: &StateStore,
    engine: &mut LevelEngine<T>,
) -> Result<AnalysisReport> {
    let graph = StateGraph::build(store, engine)?;
    let transitions = edges(store);

    let mut self_references: Vec<StateNumber> = transitions
        .iter()
        .filter(|t| t.is_self_reference())
        .map(|t| t.from.clone())
        .collect();
    self_references.dedup();

    let dangling = transitions
        .iter()
        .filter(|t| !store.contains(&t.to))
        .cloned()
        .collect();

    let max_level = graph
        .graph
        .node_indices()
        .filter_map(|idx| graph.graph.node_weight(idx))
        .map(|node| node.level)
        .max()
        .unwrap_or(0);

    Ok(AnalysisReport {
        total_states: store.len(),
        total_nodes: graph.graph.node_count(),
        total_transitions: transitions.len(),
        has_cycles: petgraph::algo::is_cyclic_directed(&graph.graph),
        max_level,
        self_references,
        dangling,
        unlinked: engine.unlinked().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode;

    fn store(records: &[&str]) -> StateStore {
        records.iter().map(|r| decode(r).unwrap()).collect()
    }

    #[test]
    fn test_linear_table() {
        let store = store(&[
            "000C001000000000000000000000",
            "001J132000132136132000081178",
        ]);
        let report = analyze(&store, &mut LevelEngine::new()).unwrap();

        assert_eq!(report.total_states, 2);
        assert_eq!(report.total_nodes, 2);
        assert_eq!(report.total_transitions, 1);
        assert!(!report.has_cycles);
        assert_eq!(report.max_level, 2);
        assert!(report.dangling.is_empty());
        assert!(report.unlinked.is_empty());
    }

    #[test]
    fn test_cycles_self_references_and_dangling() {
        let store = store(&[
            "000C001000000000000000000000",
            "001B024001000999026138026003",
            "026C001000000000000000000000",
            "400C400000000000000000000000",
        ]);
        let report = analyze(&store, &mut LevelEngine::new()).unwrap();

        assert!(report.has_cycles);
        assert_eq!(report.self_references, vec!["001", "400"]);
        assert_eq!(report.dangling, vec![Transition::new("001", "999")]);
        assert_eq!(report.unlinked, vec!["400"]);
    }

    #[test]
    fn test_missing_root_is_reported() {
        let store = store(&["001C000000000000000000000000"]);
        assert!(analyze(&store, &mut LevelEngine::new()).is_err());
    }
}
