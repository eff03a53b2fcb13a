// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for form documents.
//!
//! Operations are applied as an atomic batch with optimistic concurrency (revision checks) and
//! produce a minimal delta that views can use to refresh derived state. The condition reducers
//! are also exposed as plain functions for callers that own a document directly.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{
    Condition, ConditionId, Element, ElementId, ElementKind, FormDocument, Operator, Page, PageId,
    StyleMap,
};

/// What happens to conditions that reference a page or element being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StaleConditionPolicy {
    /// Delete every dependent condition together with the page/element.
    #[default]
    Cascade,
    /// Leave dependent conditions in place; they show up as issues until fixed.
    Keep,
}

/// The condition fields editable through [`update_condition`], named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConditionField {
    SourcePageId,
    ElementId,
    Operator,
    Value,
    TargetPageId,
}

impl ConditionField {
    pub const ALL: [ConditionField; 5] = [
        ConditionField::SourcePageId,
        ConditionField::ElementId,
        ConditionField::Operator,
        ConditionField::Value,
        ConditionField::TargetPageId,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::SourcePageId => "Source page",
            Self::ElementId => "Field",
            Self::Operator => "Operator",
            Self::Value => "Value",
            Self::TargetPageId => "Target page",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub title: Option<String>,
    pub required: Option<bool>,
    pub styles: Option<StyleMap>,
    pub kind: Option<ElementKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormOp {
    #[serde(rename_all = "camelCase")]
    AddCondition { condition_id: ConditionId },
    #[serde(rename_all = "camelCase")]
    RemoveCondition { condition_id: ConditionId },
    #[serde(rename_all = "camelCase")]
    UpdateCondition { condition_id: ConditionId, field: ConditionField, value: String },
    #[serde(rename_all = "camelCase")]
    SetConditionSourcePage { condition_id: ConditionId, page_id: PageId },
    #[serde(rename_all = "camelCase")]
    AddPage {
        page_id: PageId,
        title: String,
        #[serde(default)]
        index: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    RenamePage { page_id: PageId, title: String },
    #[serde(rename_all = "camelCase")]
    RemovePage {
        page_id: PageId,
        #[serde(default)]
        policy: StaleConditionPolicy,
    },
    #[serde(rename_all = "camelCase")]
    MovePage { page_id: PageId, to_index: usize },
    #[serde(rename_all = "camelCase")]
    AddElement {
        page_id: PageId,
        element: Element,
        #[serde(default)]
        index: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateElement { page_id: PageId, element_id: ElementId, patch: ElementPatch },
    #[serde(rename_all = "camelCase")]
    RemoveElement {
        page_id: PageId,
        element_id: ElementId,
        #[serde(default)]
        policy: StaleConditionPolicy,
    },
    #[serde(rename_all = "camelCase")]
    MoveElement { page_id: PageId, element_id: ElementId, to_index: usize },
}

/// Stable reference to an object inside one form document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormObjectRef {
    #[serde(rename_all = "camelCase")]
    Page { page_id: PageId },
    #[serde(rename_all = "camelCase")]
    Element { page_id: PageId, element_id: ElementId },
    #[serde(rename_all = "camelCase")]
    Condition { condition_id: ConditionId },
}

impl FormObjectRef {
    fn page(page_id: &PageId) -> Self {
        Self::Page { page_id: page_id.clone() }
    }

    fn element(page_id: &PageId, element_id: &ElementId) -> Self {
        Self::Element { page_id: page_id.clone(), element_id: element_id.clone() }
    }

    fn condition(condition_id: &ConditionId) -> Self {
        Self::Condition { condition_id: condition_id.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which objects changed as the result of applying ops.
///
/// This is intentionally coarse: it reports only added/removed/updated object refs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Delta {
    pub added: Vec<FormObjectRef>,
    pub removed: Vec<FormObjectRef>,
    pub updated: Vec<FormObjectRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<FormObjectRef>,
    removed: BTreeSet<FormObjectRef>,
    updated: BTreeSet<FormObjectRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, object_ref: FormObjectRef) {
        self.removed.remove(&object_ref);
        self.updated.remove(&object_ref);
        self.added.insert(object_ref);
    }

    fn record_removed(&mut self, object_ref: FormObjectRef) {
        // Added and removed within one batch: the object never existed as far as callers know.
        if self.added.remove(&object_ref) {
            self.updated.remove(&object_ref);
            return;
        }
        self.updated.remove(&object_ref);
        self.removed.insert(object_ref);
    }

    fn record_updated(&mut self, object_ref: FormObjectRef) {
        if self.added.contains(&object_ref) || self.removed.contains(&object_ref) {
            return;
        }
        self.updated.insert(object_ref);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

/// Applies `ops` to `form` as one batch.
///
/// The batch runs against a copy; `form` is only replaced when every op succeeded, after which
/// its revision is bumped once.
pub fn apply_ops(
    form: &mut FormDocument,
    base_rev: u64,
    ops: &[FormOp],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = form.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict { base_rev, current_rev });
    }

    if ops.is_empty() {
        return Ok(ApplyResult { new_rev: current_rev, applied: 0, delta: Delta::default() });
    }

    let mut next = form.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_form_op(&mut next, op, &mut delta)?;
    }

    next.bump_rev();
    *form = next;
    let new_rev = form.rev();
    tracing::info!(form_id = %form.id(), new_rev, applied = ops.len(), "applied form ops");

    Ok(ApplyResult { new_rev, applied: ops.len(), delta: delta.finish() })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Page,
    Element,
    Condition,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Page => "page",
            Self::Element => "element",
            Self::Condition => "condition",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("stale base_rev (base_rev={base_rev}, current_rev={current_rev})")]
    Conflict { base_rev: u64, current_rev: u64 },
    #[error("{kind} already exists (id={id})")]
    AlreadyExists { kind: ObjectKind, id: String },
    #[error("{kind} not found (id={id})")]
    NotFound { kind: ObjectKind, id: String },
}

/// Builds the condition `add_condition` would append, without touching any document.
///
/// Defaults: source = first page, element = that page's first element (if any),
/// operator = equals, empty value, target = second page if present, else the first page.
/// Returns `None` when there are no pages.
pub fn default_condition(pages: &[Page], condition_id: ConditionId) -> Option<Condition> {
    let first = pages.first()?;
    let target = pages.get(1).unwrap_or(first);
    Some(Condition::new(
        condition_id,
        first.id().clone(),
        first.first_element_id().cloned(),
        Operator::Equals,
        "",
        target.id().clone(),
    ))
}

/// Appends a defaulted condition. No-op (returns `None`) when the form has no pages.
pub fn add_condition(form: &mut FormDocument, condition_id: ConditionId) -> Option<&Condition> {
    let condition = default_condition(form.pages(), condition_id)?;
    form.conditions_mut().push(condition);
    form.conditions().last()
}

/// Drops every condition with `condition_id`; silently does nothing if there is none.
///
/// Returns how many conditions were removed.
pub fn remove_condition(form: &mut FormDocument, condition_id: &ConditionId) -> usize {
    let before = form.conditions().len();
    form.conditions_mut().retain(|c| c.id() != condition_id);
    before - form.conditions().len()
}

/// Replaces one field of every condition with `condition_id` by `value`.
///
/// Returns whether a condition changed. Missing conditions and values that do not parse for
/// the field (an unknown operator, a malformed page id) leave the document untouched.
/// `SourcePageId` is a raw replace here; use [`update_source_page`] to keep the element in sync.
pub fn update_condition(
    form: &mut FormDocument,
    condition_id: &ConditionId,
    field: ConditionField,
    value: &str,
) -> bool {
    let mut matched = false;
    let mut changed = false;
    for condition in form.conditions_mut().iter_mut().filter(|c| c.id() == condition_id) {
        matched = true;
        let before = condition.clone();
        set_condition_field(condition, field, value);
        changed |= *condition != before;
    }
    if !matched {
        tracing::debug!(%condition_id, "update ignored: condition not found");
    }
    changed
}

fn set_condition_field(condition: &mut Condition, field: ConditionField, value: &str) {
    let condition_id = condition.id().clone();
    match field {
        ConditionField::SourcePageId => match PageId::new(value) {
            Ok(page_id) => condition.set_source_page_id(page_id),
            Err(err) => tracing::warn!(%condition_id, value, %err, "ignored source page update"),
        },
        ConditionField::ElementId if value.is_empty() => condition.set_element_id(None),
        ConditionField::ElementId => match ElementId::new(value) {
            Ok(element_id) => condition.set_element_id(Some(element_id)),
            Err(err) => tracing::warn!(%condition_id, value, %err, "ignored element update"),
        },
        ConditionField::Operator => match value.parse::<Operator>() {
            Ok(operator) => condition.set_operator(operator),
            Err(err) => tracing::warn!(%condition_id, %err, "ignored operator update"),
        },
        ConditionField::Value => condition.set_value(value),
        ConditionField::TargetPageId => match PageId::new(value) {
            Ok(page_id) => condition.set_target_page_id(page_id),
            Err(err) => tracing::warn!(%condition_id, value, %err, "ignored target page update"),
        },
    }
}

/// Points every condition with `condition_id` at a new source page and resets its element to
/// that page's first element (or none), so the element always belongs to the source page after
/// this call.
pub fn update_source_page(
    form: &mut FormDocument,
    condition_id: &ConditionId,
    page_id: PageId,
) -> bool {
    let first_element = form.page(&page_id).and_then(Page::first_element_id).cloned();
    let mut matched = false;
    let mut changed = false;
    for condition in form.conditions_mut().iter_mut().filter(|c| c.id() == condition_id) {
        matched = true;
        let before = condition.clone();
        condition.set_source_page_id(page_id.clone());
        condition.set_element_id(first_element.clone());
        changed |= *condition != before;
    }
    if !matched {
        tracing::debug!(%condition_id, "source page update ignored: condition not found");
    }
    changed
}

// Extracted op-application implementation for page/element/condition mutations.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
