// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Graph projection of a form's navigation.
//!
//! `project` maps `{pages, conditions}` to the node/edge lists a graph renderer consumes. It is a
//! pure function: no state, recomputed on every change, and it never fails. Stale references
//! degrade to fallback labels and dangling edge endpoints.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Condition, ConditionId, FormDocument, Operator, Page, PageId};
use crate::query::labels::{condition_is_stale, element_title, page_title};

/// Horizontal distance between page columns.
pub const PAGE_SPACING_X: i32 = 250;
/// Row on which all page nodes sit.
pub const PAGE_ROW_Y: i32 = 100;
/// First row used for condition nodes.
pub const CONDITION_ROW_Y: i32 = 250;
/// Vertical distance between condition nodes stacked under the same source column.
pub const CONDITION_ROW_STEP: i32 = 80;

const SOURCE_HANDLE: &str = "right";
const TARGET_HANDLE: &str = "left";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionOptions {
    /// Keep the sequential edge out of every page that has no outgoing condition.
    ///
    /// Off by default: as soon as one condition exists, all implicit sequential edges are
    /// dropped and pages without an outgoing condition become dead ends in the graph.
    pub fallthrough_edges: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowNodeKind {
    Page,
    Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FlowNodeData {
    #[serde(rename_all = "camelCase")]
    Page { label: String, page_id: PageId, element_count: usize },
    #[serde(rename_all = "camelCase")]
    Condition {
        label: String,
        condition_id: ConditionId,
        operator: Operator,
        value: String,
        stale: bool,
    },
}

impl FlowNodeData {
    pub fn label(&self) -> &str {
        match self {
            Self::Page { label, .. } | Self::Condition { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FlowNodeKind,
    pub position: Position,
    pub data: FlowNodeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowEdgeKind {
    /// Implicit page-to-next-page flow.
    Sequential,
    /// Source page into a condition node.
    ConditionIn,
    /// Condition node out to its target page.
    ConditionOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    #[serde(default)]
    pub animated: bool,
    pub kind: FlowEdgeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn page_nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| n.kind == FlowNodeKind::Page)
    }

    pub fn condition_nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| n.kind == FlowNodeKind::Condition)
    }

    pub fn sequential_edges(&self) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter().filter(|e| e.kind == FlowEdgeKind::Sequential)
    }
}

/// Graph node id of the node representing `condition_id`.
pub fn condition_node_id(condition_id: &ConditionId) -> String {
    format!("condition-{condition_id}")
}

/// `"<element title> <operator symbol> <value>"`.
pub fn condition_label(pages: &[Page], condition: &Condition) -> String {
    let title = element_title(pages, condition.source_page_id(), condition.element_id());
    format!("{title} {} {}", condition.operator().symbol(), condition.value())
}

pub fn project_form(form: &FormDocument, options: ProjectionOptions) -> FlowGraph {
    project(form.pages(), form.conditions(), options)
}

pub fn project(pages: &[Page], conditions: &[Condition], options: ProjectionOptions) -> FlowGraph {
    let mut graph = FlowGraph::default();

    let mut columns: BTreeMap<&PageId, usize> = BTreeMap::new();
    for (idx, page) in pages.iter().enumerate() {
        columns.entry(page.id()).or_insert(idx);
        graph.nodes.push(FlowNode {
            id: page.id().to_string(),
            kind: FlowNodeKind::Page,
            position: Position { x: column_x(idx), y: PAGE_ROW_Y },
            data: FlowNodeData::Page {
                label: page_title(pages, page.id()).to_owned(),
                page_id: page.id().clone(),
                element_count: page.elements().len(),
            },
        });
    }

    let sources = conditions.iter().map(Condition::source_page_id).collect::<BTreeSet<_>>();
    for pair in pages.windows(2) {
        let [from, to] = pair else { continue };
        let keep = conditions.is_empty()
            || (options.fallthrough_edges && !sources.contains(from.id()));
        if !keep {
            continue;
        }
        graph.edges.push(FlowEdge {
            id: format!("e-{}-{}", from.id(), to.id()),
            source: from.id().to_string(),
            target: to.id().to_string(),
            source_handle: Some(SOURCE_HANDLE.to_owned()),
            target_handle: Some(TARGET_HANDLE.to_owned()),
            animated: false,
            kind: FlowEdgeKind::Sequential,
        });
    }

    let mut stacked: BTreeMap<usize, i32> = BTreeMap::new();
    for condition in conditions {
        let node_id = condition_node_id(condition.id());
        let column = columns.get(condition.source_page_id()).copied().unwrap_or(0);
        let depth = stacked.entry(column).or_insert(0);
        let position = condition_position(column, *depth);
        *depth = depth.saturating_add(1);

        graph.nodes.push(FlowNode {
            id: node_id.clone(),
            kind: FlowNodeKind::Condition,
            position,
            data: FlowNodeData::Condition {
                label: condition_label(pages, condition),
                condition_id: condition.id().clone(),
                operator: condition.operator(),
                value: condition.value().to_owned(),
                stale: condition_is_stale(pages, condition),
            },
        });

        let source = condition.source_page_id().to_string();
        let target = condition.target_page_id().to_string();
        graph.edges.push(FlowEdge {
            id: format!("e-{source}-{node_id}"),
            source,
            target: node_id.clone(),
            source_handle: Some(SOURCE_HANDLE.to_owned()),
            target_handle: Some(TARGET_HANDLE.to_owned()),
            animated: false,
            kind: FlowEdgeKind::ConditionIn,
        });
        graph.edges.push(FlowEdge {
            id: format!("e-{node_id}-{target}"),
            source: node_id,
            target,
            source_handle: Some(SOURCE_HANDLE.to_owned()),
            target_handle: Some(TARGET_HANDLE.to_owned()),
            animated: true,
            kind: FlowEdgeKind::ConditionOut,
        });
    }

    tracing::debug!(
        pages = pages.len(),
        conditions = conditions.len(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "projected navigation graph"
    );
    graph
}

/// Halfway to the next column, `depth` rows below the first condition row. Saturates.
fn condition_position(column: usize, depth: i32) -> Position {
    Position {
        x: column_x(column).saturating_add(PAGE_SPACING_X / 2),
        y: CONDITION_ROW_Y.saturating_add(depth.saturating_mul(CONDITION_ROW_STEP)),
    }
}

fn column_x(column: usize) -> i32 {
    i32::try_from(column).unwrap_or(i32::MAX / PAGE_SPACING_X).saturating_mul(PAGE_SPACING_X)
}
