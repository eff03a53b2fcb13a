// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Condition, ConditionId, FormDocument, FormId, PageId};
use crate::ops::{ConditionField, FormOp};
use crate::projection::FlowGraph;
use crate::query::{Answers, ConditionReport, NextPage};
use crate::workspace::FormSummary;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListFormsResponse {
    pub forms: Vec<FormSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOpsRequest {
    pub base_rev: u64,
    pub ops: Vec<FormOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConditionRequest {
    pub field: ConditionField,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSourcePageRequest {
    pub page_id: PageId,
}

/// The condition after a shortcut mutation, with the form revision it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionResponse {
    pub rev: u64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConditionResponse {
    pub rev: u64,
    pub condition_id: ConditionId,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFormResponse {
    pub form_id: FormId,
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GraphQuery {
    /// Overrides the workspace fall-through setting for this request.
    pub fallthrough: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    pub rev: u64,
    pub fallthrough_edges: bool,
    #[serde(flatten)]
    pub graph: FlowGraph,
    pub dead_end_pages: Vec<PageId>,
    pub unreachable_pages: Vec<PageId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuesResponse {
    pub rev: u64,
    pub conditions: Vec<ConditionReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    pub current_page_id: PageId,
    #[serde(default)]
    pub answers: Answers,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResponse {
    #[serde(flatten)]
    pub next: NextPage,
    pub end_of_form: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UiSelectionResponse {
    pub active_form_id: Option<FormId>,
    pub active_condition_id: Option<ConditionId>,
    pub forms_rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Schemas of the documents exchanged by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    pub form: schemars::Schema,
    pub ops: schemars::Schema,
    pub graph: schemars::Schema,
}

impl SchemaResponse {
    pub fn generate() -> Self {
        Self {
            form: schemars::schema_for!(FormDocument),
            ops: schemars::schema_for!(ApplyOpsRequest),
            graph: schemars::schema_for!(FlowGraph),
        }
    }
}
