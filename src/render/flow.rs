// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::projection::{FlowEdgeKind, FlowGraph, FlowNodeKind};

use super::canvas::{Canvas, CanvasError};

const BOX_HEIGHT: usize = 3;
const COL_GAP: usize = 4;
const MIN_BOX_INNER_WIDTH: usize = 3;
const MAX_BOX_LABEL: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowRenderError {
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
}

#[derive(Debug, Clone, Copy)]
struct PageBox<'a> {
    node_id: &'a str,
    label: &'a str,
    x0: usize,
    x1: usize,
    inner_width: usize,
}

/// Deterministic Unicode rendering of a projected navigation graph.
///
/// Layout:
/// - One row of page boxes in page order. Sequential edges between neighbours are drawn as
///   arrows between the boxes.
/// - Then one line per navigation step, `[Page A] ──(Age > 18)──▶ [Page B]` for conditions
///   and `[Page A] ───▶ [Page B]` for sequential flow. Endpoints that are not in the graph
///   render as `?<id>`.
pub fn render_flow_text(graph: &FlowGraph) -> Result<String, FlowRenderError> {
    let mut sections = Vec::<String>::new();

    let row = render_page_row(graph)?;
    if !row.is_empty() {
        sections.push(row);
    }

    let steps = step_lines(graph);
    if !steps.is_empty() {
        sections.push(steps.join("\n"));
    }

    Ok(sections.join("\n\n"))
}

fn render_page_row(graph: &FlowGraph) -> Result<String, FlowRenderError> {
    let mut boxes = Vec::<PageBox<'_>>::new();
    let mut cursor_x = 0usize;
    for node in graph.page_nodes() {
        let label = node.data.label();
        let (inner_width, total_width) = box_widths(label);
        let x0 = cursor_x;
        let x1 = x0 + total_width - 1;
        boxes.push(PageBox { node_id: &node.id, label, x0, x1, inner_width });
        cursor_x = x1 + 1 + COL_GAP;
    }

    let Some(last) = boxes.last() else {
        return Ok(String::new());
    };
    let mut canvas = Canvas::new(last.x1 + 1, BOX_HEIGHT)?;

    for b in &boxes {
        canvas.draw_box(b.x0, 0, b.x1, BOX_HEIGHT - 1)?;
        let clipped = clip_label(b.label, b.inner_width.saturating_sub(2));
        let left_pad = b.inner_width.saturating_sub(label_width(&clipped)) / 2;
        canvas.write_str(b.x0 + 1 + left_pad, 1, &clipped)?;
    }

    let columns = boxes
        .iter()
        .enumerate()
        .map(|(idx, b)| (b.node_id, idx))
        .collect::<BTreeMap<_, _>>();
    for edge in graph.sequential_edges() {
        let (Some(&from), Some(&to)) =
            (columns.get(edge.source.as_str()), columns.get(edge.target.as_str()))
        else {
            continue;
        };
        if from + 1 != to {
            continue;
        }
        let start_x = boxes[from].x1 + 1;
        let head_x = boxes[to].x0 - 1;
        canvas.draw_hline(start_x, head_x, 1)?;
        canvas.set(head_x, 1, '▶')?;
    }

    Ok(canvas.to_trimmed_string())
}

fn step_lines(graph: &FlowGraph) -> Vec<String> {
    let page_ref = |node_id: &str| match graph.node(node_id) {
        Some(node) if node.kind == FlowNodeKind::Page => format!("[{}]", node.data.label()),
        _ => format!("?{node_id}"),
    };

    let mut lines = Vec::new();
    for edge in graph.sequential_edges() {
        lines.push(format!("{} ───▶ {}", page_ref(&edge.source), page_ref(&edge.target)));
    }

    for node in graph.condition_nodes() {
        let source = graph
            .edges
            .iter()
            .find(|e| e.kind == FlowEdgeKind::ConditionIn && e.target == node.id)
            .map(|e| page_ref(&e.source));
        let target = graph
            .edges
            .iter()
            .find(|e| e.kind == FlowEdgeKind::ConditionOut && e.source == node.id)
            .map(|e| page_ref(&e.target));
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        lines.push(format!("{source} ──({})──▶ {target}", node.data.label()));
    }

    lines
}

fn label_width(label: &str) -> usize {
    label.chars().count()
}

/// Fits a page title into its box, ending in `…` when it had to be cut.
fn clip_label(label: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if label_width(label) <= max_len {
        return label.to_owned();
    }
    let mut clipped: String = label.chars().take(max_len - 1).collect();
    clipped.push('…');
    clipped
}

fn box_widths(label: &str) -> (usize, usize) {
    let label_len = label_width(label).min(MAX_BOX_LABEL);
    let mut inner_width = (label_len + 2).max(MIN_BOX_INNER_WIDTH);
    let mut total_width = inner_width + 2;

    // Odd widths keep labels centered on a single cell.
    if total_width % 2 == 0 {
        total_width += 1;
        inner_width += 1;
    }

    (inner_width, total_width)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{clip_label, render_flow_text};
    use crate::model::fixtures::{age_gate_form, cid, eid, linear_form, pid};
    use crate::model::{Condition, Operator, Page};
    use crate::projection::{project, project_form, ProjectionOptions};

    #[test]
    fn empty_graph_renders_nothing() {
        let graph = project(&[], &[], ProjectionOptions::default());
        assert_eq!(render_flow_text(&graph).expect("render"), "");
    }

    #[test]
    fn snapshot_two_sequential_pages() {
        let mut form = linear_form(2);
        form.pages_mut()[0].set_title("Start");
        form.pages_mut()[1].set_title("End");

        let rendered =
            render_flow_text(&project_form(&form, ProjectionOptions::default())).expect("render");
        assert_eq!(
            rendered,
            "┌───────┐    ┌─────┐\n│ Start │───▶│ End │\n└───────┘    └─────┘\n\n[Start] ───▶ [End]"
        );
    }

    #[test]
    fn conditions_render_as_labelled_steps() {
        let graph = project_form(&age_gate_form(), ProjectionOptions::default());
        let rendered = render_flow_text(&graph).expect("render");

        let steps = rendered.split("\n\n").nth(1).expect("steps section");
        assert_eq!(steps, "[About you] ──(Age > 18)──▶ [Adults]");
        assert!(!rendered.lines().nth(1).expect("box row").contains('▶'));
    }

    #[test]
    fn long_page_titles_are_clipped_in_boxes_but_not_in_steps() {
        let title = "x".repeat(30);
        let mut form = linear_form(2);
        form.pages_mut()[0].set_title(title.clone());

        let rendered =
            render_flow_text(&project_form(&form, ProjectionOptions::default())).expect("render");
        let box_row = rendered.lines().nth(1).expect("box row");
        assert!(box_row.contains(&format!("{}…", "x".repeat(24))), "{box_row}");
        assert!(!box_row.contains(&title));
        assert!(rendered.ends_with(&format!("[{title}] ───▶ [Page 2]")));
    }

    #[rstest]
    #[case("hello", 0, "")]
    #[case("hello", 1, "…")]
    #[case("h", 1, "h")]
    #[case("hello", 2, "h…")]
    #[case("αβγ", 2, "α…")]
    fn clip_label_counts_chars(#[case] label: &str, #[case] max_len: usize, #[case] clipped: &str) {
        assert_eq!(clip_label(label, max_len), clipped);
    }

    #[test]
    fn dangling_endpoints_render_with_question_mark() {
        let pages = vec![Page::new(pid("p1"), "Start")];
        let conditions = vec![Condition::new(
            cid("c1"),
            pid("p1"),
            Some(eid("e1")),
            Operator::Equals,
            "x",
            pid("gone"),
        )];

        let rendered = render_flow_text(&project(&pages, &conditions, ProjectionOptions::default()))
            .expect("render");
        assert!(rendered.ends_with("[Start] ──(Unknown Element = x)──▶ ?gone"));
    }
}
