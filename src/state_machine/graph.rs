use crate::Result;
use crate::parser::StateNumber;
use crate::state_machine::levels::{LevelEngine, LevelTracker, extension_of};
use crate::state_machine::{StateNode, StateStore, Transition};
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use std::collections::HashMap;

/// Nodes of the state graph.
///
/// Recomputes all levels first. Extension states are not nodes of their
/// own, they show up as a second label line of the state using them.
pub fn nodes<T: LevelTracker>(
    store: &StateStore,
    engine: &mut LevelEngine<T>,
) -> Result<Vec<StateNode>> {
    engine.recompute_all(store)?;

    let nodes = store
        .records()
        .filter(|record| !record.is_extension())
        .filter_map(|record| {
            let level = engine.level(&record.number)?;
            let mut label = record.to_string();
            if let Some(extension) = extension_of(store, record) {
                label.push('\n');
                label.push_str(&extension.to_string());
            }
            Some(StateNode::new(record.number.clone(), label, level))
        })
        .collect();

    Ok(nodes)
}

/// One transition per next-state entry of every stored state, duplicates kept
pub fn edges(store: &StateStore) -> Vec<Transition> {
    store
        .records()
        .filter_map(|record| record.states_to().map(|targets| (record, targets)))
        .flat_map(|(record, targets)| {
            targets
                .into_iter()
                .map(move |target| Transition::new(record.number.as_str(), target))
        })
        .collect()
}

/// A directed graph of the leveled states of a state table.
///
/// Transitions pointing at states that are not nodes (missing states,
/// extension states) are left out of the graph.
pub struct StateGraph {
    /// Nodes are leveled states, edges the transitions between them.
    pub graph: StableGraph<StateNode, Transition>,

    /// State number to node index.
    pub state_index: HashMap<StateNumber, NodeIndex>,
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StateGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            state_index: HashMap::new(),
        }
    }

    /// Adds a state to the graph and updates the state index.
    pub fn add_state(&mut self, node: StateNode) -> NodeIndex {
        let id = node.id.clone();
        let node_index = self.graph.add_node(node);
        self.state_index.insert(id, node_index);
        node_index
    }

    /// Adds a transition to the graph, linking two existing states.
    pub fn add_transition(&mut self, transition: Transition) -> Option<EdgeIndex> {
        if let (Some(&from_idx), Some(&to_idx)) = (
            self.state_index.get(&transition.from),
            self.state_index.get(&transition.to),
        ) {
            Some(self.graph.add_edge(from_idx, to_idx, transition))
        } else {
            None
        }
    }

    pub fn from_parts(nodes: Vec<StateNode>, transitions: Vec<Transition>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_state(node);
        }
        for transition in transitions {
            graph.add_transition(transition);
        }
        graph
    }

    /// Build the graph of a store, recomputing levels
    pub fn build<T: LevelTracker>(store: &StateStore, engine: &mut LevelEngine<T>) -> Result<Self> {
        Ok(Self::from_parts(nodes(store, engine)?, edges(store)))
    }

    /// States without incoming transitions
    pub fn find_initial_states(&self) -> Vec<&StateNode> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count() == 0)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// States without outgoing transitions
    pub fn find_terminal_states(&self) -> Vec<&StateNode> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count() == 0)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Export to DOT format for Graphviz
    pub fn to_dot(&self) -> String {
        let mut dot = "digraph StateGraph {\n".to_string();
        dot.push_str("  rankdir=TB;\n");
        dot.push_str("  node [shape=box];\n\n");

        let mut nodes: Vec<&StateNode> = self
            .graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect();
        nodes.sort_by(|a, b| (a.level, &a.id).cmp(&(b.level, &b.id)));

        for node in &nodes {
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\"];\n",
                node.id,
                dot_escape(&node.label)
            ));
        }

        // Same-level states on the same rank
        let mut level = None;
        for node in &nodes {
            if level != Some(node.level) {
                if level.is_some() {
                    dot.push_str(" }\n");
                }
                dot.push_str("  { rank=same;");
                level = Some(node.level);
            }
            dot.push_str(&format!(" \"{}\";", node.id));
        }
        if level.is_some() {
            dot.push_str(" }\n");
        }

        dot.push('\n');

        for transition in self
            .graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
        {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                transition.from, transition.to
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Get a state by its number
    pub fn get_state(&self, number: &str) -> Option<&StateNode> {
        self.state_index
            .get(number)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Get outgoing transitions from a state
    pub fn outgoing_transitions(&self, number: &str) -> Vec<&Transition> {
        if let Some(&node_idx) = self.state_index.get(number) {
            self.graph
                .edges_directed(node_idx, Direction::Outgoing)
                .map(|edge| edge.weight())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get incoming transitions to a state
    pub fn incoming_transitions(&self, number: &str) -> Vec<&Transition> {
        if let Some(&node_idx) = self.state_index.get(number) {
            self.graph
                .edges_directed(node_idx, Direction::Incoming)
                .map(|edge| edge.weight())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_states: self.graph.node_count(),
            total_transitions: self.graph.edge_count(),
            initial_states: self.find_initial_states().len(),
            terminal_states: self.find_terminal_states().len(),
        }
    }
}

fn dot_escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

#[derive(Debug, Clone)]
pub struct GraphStats {
    pub total_states: usize,
    pub total_transitions: usize,
    pub initial_states: usize,
    pub terminal_states: usize,
}
