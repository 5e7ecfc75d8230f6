//! Output formatting module
//!
//! This module handles formatting states, graphs and reports for different output formats.

use crate::{
    Result,
    parser::StateRecord,
    state_machine::{AnalysisReport, StateNode, Transition},
};
use serde_json::{Value, json};

/// A record as JSON, with its description and next states alongside the entries
pub fn record_json(record: &StateRecord) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.insert("description".to_string(), json!(record.description()));
        if let Some(states_to) = record.states_to() {
            map.insert("states_to".to_string(), json!(states_to));
        }
    }
    Ok(value)
}

/// Output decoded records as JSON
pub fn output_records(w: &mut impl std::io::Write, records: &[StateRecord]) -> Result<()> {
    let values = records.iter().map(record_json).collect::<Result<Vec<_>>>()?;
    serde_json::to_writer_pretty(&mut *w, &values)?;
    writeln!(w)?;
    Ok(())
}

/// Output graph nodes and edges as JSON
pub fn output_json(
    w: &mut impl std::io::Write,
    nodes: &[StateNode],
    edges: &[Transition],
) -> Result<()> {
    let output = json!({
        "summary": {
            "total_nodes": nodes.len(),
            "total_edges": edges.len(),
        },
        "nodes": nodes,
        "edges": edges,
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?;
    Ok(())
}

/// Output graph nodes and edges as text table
pub fn output_table(
    w: &mut impl std::io::Write,
    nodes: &[StateNode],
    edges: &[Transition],
) -> Result<()> {
    writeln!(w, "NDC State Graph")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(w, "  Total Nodes: {}", nodes.len())?;
    writeln!(w, "  Total Edges: {}", edges.len())?;
    writeln!(w)?;

    if !nodes.is_empty() {
        let mut sorted: Vec<&StateNode> = nodes.iter().collect();
        sorted.sort_by(|a, b| (a.level, &a.id).cmp(&(b.level, &b.id)));

        writeln!(w, "Nodes:")?;
        writeln!(w, "{:-<60}", "")?;
        writeln!(w, "{:>6} {:<8} {:<44}", "Level", "State", "Label")?;
        writeln!(w, "{:-<60}", "")?;
        for node in sorted {
            writeln!(
                w,
                "{:>6} {:<8} {:<44}",
                node.level,
                node.id,
                node.display_short()
            )?;
        }
        writeln!(w)?;
    }

    if !edges.is_empty() {
        writeln!(w, "Edges:")?;
        writeln!(w, "{:-<60}", "")?;
        for edge in edges {
            writeln!(w, "  {} -> {}", edge.from, edge.to)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Output an analysis report as JSON
pub fn output_report_json(w: &mut impl std::io::Write, report: &AnalysisReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, report)?;
    writeln!(w)?;
    Ok(())
}

/// Output an analysis report as text
pub fn output_report(w: &mut impl std::io::Write, report: &AnalysisReport) -> Result<()> {
    writeln!(w, "NDC State Table Analysis")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w, "  States:      {}", report.total_states)?;
    writeln!(w, "  Nodes:       {}", report.total_nodes)?;
    writeln!(w, "  Transitions: {}", report.total_transitions)?;
    writeln!(w, "  Max level:   {}", report.max_level)?;
    writeln!(
        w,
        "  Cycles:      {}",
        if report.has_cycles { "yes" } else { "no" }
    )?;

    if !report.self_references.is_empty() {
        writeln!(w, "Self references: {}", report.self_references.join(", "))?;
    }
    if !report.dangling.is_empty() {
        writeln!(w, "Undefined next states:")?;
        for transition in &report.dangling {
            writeln!(w, "  {} -> {}", transition.from, transition.to)?;
        }
    }
    if !report.unlinked.is_empty() {
        writeln!(w, "Not reached from 000: {}", report.unlinked.join(", "))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode;

    fn sample_graph() -> (Vec<StateNode>, Vec<Transition>) {
        let nodes = vec![
            StateNode::new("500".into(), "500 K".into(), 2),
            StateNode::new("000".into(), "000 A\n127 Z".into(), 1),
        ];
        let edges = vec![Transition::new("000", "500"), Transition::new("000", "127")];
        (nodes, edges)
    }

    #[test]
    fn test_record_json_matches_table_names() {
        let record = decode("000A870500128002002002001127").unwrap();
        let value = record_json(&record).unwrap();
        assert_eq!(value["description"], "Card read state");
        assert_eq!(value["good_read_next_state"], "500");
        assert_eq!(value["states_to"], json!(["500", "127"]));

        let close = decode("002J132000132136132000081178").unwrap();
        assert!(record_json(&close).unwrap().get("states_to").is_none());
    }

    #[test]
    fn test_output_json() {
        let (nodes, edges) = sample_graph();
        let mut output = Vec::new();
        output_json(&mut output, &nodes, &edges).unwrap();

        let value: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["summary"]["total_edges"], 2);
        assert_eq!(value["nodes"][0]["id"], "500");
        assert_eq!(value["edges"][1]["to"], "127");
    }

    #[test]
    fn test_output_table_orders_by_level() {
        let (nodes, edges) = sample_graph();
        let mut output = Vec::new();
        output_table(&mut output, &nodes, &edges).unwrap();

        let text = String::from_utf8(output).unwrap();
        let root = text.find("000 A / 127 Z").unwrap();
        let fit = text.find("500 K").unwrap();
        assert!(root < fit);
        assert!(text.contains("000 -> 127"));
    }

    #[test]
    fn test_output_records() {
        let records = vec![decode("634C631791092174618362840503").unwrap()];
        let mut output = Vec::new();
        output_records(&mut output, &records).unwrap();

        let value: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value[0]["type"], "C");
        assert_eq!(value[0]["next_state"], "631");
    }
}
