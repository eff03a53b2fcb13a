// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::ident::MermaidIdents;
use crate::projection::{FlowEdgeKind, FlowGraph, FlowNodeData, FlowNodeKind};
use crate::query::UNTITLED_PAGE;

const STALE_CLASS: &str = "stale";

/// Renders `graph` as a Mermaid `flowchart LR` document.
///
/// Pages become rectangles and conditions become rhombi. Sequential edges are dotted. Edge
/// endpoints that are not nodes of the graph (dangling condition targets) are declared as
/// placeholder pages, and they share the `stale` class with stale condition nodes. Never fails.
pub fn export_mermaid(graph: &FlowGraph) -> String {
    let mut idents = MermaidIdents::default();
    let mut stale = Vec::<String>::new();

    let mut out = String::new();
    out.push_str("flowchart LR\n");

    for node in &graph.nodes {
        let ident = idents.ident(&node.id).to_owned();
        let label = escape_label(node.data.label());
        match node.kind {
            FlowNodeKind::Page => out.push_str(&format!("    {ident}[\"{label}\"]\n")),
            FlowNodeKind::Condition => out.push_str(&format!("    {ident}{{\"{label}\"}}\n")),
        }
        if matches!(node.data, FlowNodeData::Condition { stale: true, .. }) {
            stale.push(ident);
        }
    }

    let known = graph.nodes.iter().map(|n| n.id.as_str()).collect::<BTreeSet<_>>();
    let mut dangling = BTreeSet::<&str>::new();
    for edge in &graph.edges {
        for endpoint in [edge.source.as_str(), edge.target.as_str()] {
            if !known.contains(endpoint) && dangling.insert(endpoint) {
                let ident = idents.ident(endpoint).to_owned();
                out.push_str(&format!("    {ident}[\"{UNTITLED_PAGE}\"]\n"));
                stale.push(ident);
            }
        }
    }

    for edge in &graph.edges {
        let from = idents.ident(&edge.source).to_owned();
        let to = idents.ident(&edge.target).to_owned();
        let connector = match edge.kind {
            FlowEdgeKind::Sequential => "-.->",
            FlowEdgeKind::ConditionIn | FlowEdgeKind::ConditionOut => "-->",
        };
        out.push_str(&format!("    {from} {connector} {to}\n"));
    }

    if !stale.is_empty() {
        out.push_str(&format!("    classDef {STALE_CLASS} stroke-dasharray: 4 4,color:#b00\n"));
        out.push_str(&format!("    class {} {STALE_CLASS}\n", stale.join(",")));
    }

    out
}

fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for ch in label.chars() {
        match ch {
            '"' => escaped.push_str("#quot;"),
            '\n' | '\r' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::export_mermaid;
    use crate::model::fixtures::{age_gate_form, cid, eid, linear_form, pid};
    use crate::model::{Condition, Operator, Page};
    use crate::projection::{project, project_form, ProjectionOptions};

    #[test]
    fn linear_form_exports_dotted_sequential_chain() {
        let graph = project_form(&linear_form(3), ProjectionOptions::default());
        assert_eq!(
            export_mermaid(&graph),
            concat!(
                "flowchart LR\n",
                "    p1[\"Page 1\"]\n",
                "    p2[\"Page 2\"]\n",
                "    p3[\"Page 3\"]\n",
                "    p1 -.-> p2\n",
                "    p2 -.-> p3\n",
            )
        );
    }

    #[test]
    fn conditions_export_as_rhombi_between_pages() {
        let graph = project_form(&age_gate_form(), ProjectionOptions::default());
        let mermaid = export_mermaid(&graph);

        assert!(mermaid.contains("    condition_c1{\"Age > 18\"}\n"));
        assert!(mermaid.contains("    p1 --> condition_c1\n"));
        assert!(mermaid.contains("    condition_c1 --> p2\n"));
        assert!(!mermaid.contains("-.->"));
        assert!(!mermaid.contains("classDef"));
    }

    #[test]
    fn dangling_targets_become_stale_placeholders() {
        let pages = vec![Page::new(pid("p1"), "Start")];
        let conditions = vec![Condition::new(
            cid("c1"),
            pid("p1"),
            Some(eid("e1")),
            Operator::Equals,
            "x",
            pid("gone"),
        )];

        let mermaid = export_mermaid(&project(&pages, &conditions, ProjectionOptions::default()));
        assert!(mermaid.contains("    gone[\"Untitled Page\"]\n"));
        assert!(mermaid.contains("    class condition_c1,gone stale\n"));
    }

    #[test]
    fn quotes_in_labels_are_escaped() {
        let mut form = linear_form(1);
        form.pages_mut()[0].set_title("Say \"hi\"");
        let mermaid = export_mermaid(&project_form(&form, ProjectionOptions::default()));
        assert!(mermaid.contains("p1[\"Say #quot;hi#quot;\"]"));
    }
}
