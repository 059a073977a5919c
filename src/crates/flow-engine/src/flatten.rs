//! `Flatten(flow) → scenarioIds[]` (spec §4.1): a topological order over the
//! whole node graph via Kahn's algorithm, filtered down to the `scenario`
//! nodes encountered along the way.

use flow_core::{FlowNode, UserFlow};
use std::collections::{HashMap, VecDeque};

pub fn flatten(flow: &UserFlow) -> Vec<String> {
    let mut in_degree: HashMap<&str, usize> = flow.nodes.iter().map(|n| (n.id(), 0usize)).collect();
    for edge in &flow.edges {
        if let Some(count) = in_degree.get_mut(edge.target.as_str()) {
            *count += 1;
        }
    }

    let mut queue: VecDeque<&str> = VecDeque::new();
    for node in &flow.nodes {
        if in_degree[node.id()] == 0 {
            queue.push_back(node.id());
        }
    }

    let mut order: Vec<&str> = Vec::with_capacity(flow.nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for edge in flow.out_edges(id) {
            if let Some(count) = in_degree.get_mut(edge.target.as_str()) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(edge.target.as_str());
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| match flow.node(id) {
            Some(FlowNode::Scenario { scenario_id, .. }) => Some(scenario_id.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::FlowEdge;

    fn flow() -> UserFlow {
        UserFlow {
            id: "f".into(),
            name: "t".into(),
            nodes: vec![
                FlowNode::Start { id: "start".into() },
                FlowNode::Scenario { id: "n1".into(), scenario_id: "scn-a".into() },
                FlowNode::Scenario { id: "n2".into(), scenario_id: "scn-b".into() },
                FlowNode::End { id: "end".into() },
            ],
            edges: vec![
                FlowEdge { source: "start".into(), target: "n1".into(), source_handle: None },
                FlowEdge { source: "n1".into(), target: "n2".into(), source_handle: None },
                FlowEdge { source: "n2".into(), target: "end".into(), source_handle: None },
            ],
            initial_variables: None,
        }
    }

    #[test]
    fn returns_scenario_ids_in_topological_order() {
        assert_eq!(flatten(&flow()), vec!["scn-a".to_string(), "scn-b".to_string()]);
    }
}
