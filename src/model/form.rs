// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::ids::{ConditionId, ElementId, FormId, PageId};
use super::page::Page;
use super::IdAllocator;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate {kind} id {id}")]
pub struct DuplicateIdError {
    pub kind: &'static str,
    pub id: String,
}

/// The whole form document: pages plus the navigation conditions between them.
///
/// This is the value both editor views read and the persistence layer stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    id: FormId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    rev: u64,
}

impl FormDocument {
    pub fn new(id: FormId, title: impl Into<String>) -> Self {
        Self { id, title: title.into(), pages: Vec::new(), conditions: Vec::new(), rev: 0 }
    }

    pub fn id(&self) -> &FormId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut Vec<Page> {
        &mut self.pages
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }

    pub fn page(&self, page_id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id() == page_id)
    }

    pub fn page_mut(&mut self, page_id: &PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id() == page_id)
    }

    pub fn page_index(&self, page_id: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id() == page_id)
    }

    pub fn condition(&self, condition_id: &ConditionId) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id() == condition_id)
    }

    pub fn condition_mut(&mut self, condition_id: &ConditionId) -> Option<&mut Condition> {
        self.conditions.iter_mut().find(|c| c.id() == condition_id)
    }

    pub fn contains_element(&self, element_id: &ElementId) -> bool {
        self.pages.iter().any(|p| p.element(element_id).is_some())
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    /// An allocator guaranteed not to hand out any id already present in this document.
    pub fn id_allocator(&self) -> IdAllocator {
        let mut ids = IdAllocator::new();
        ids.observe(self.all_id_strs());
        ids
    }

    /// Page, element and condition ids must each be unique; element ids across the whole form.
    pub fn check_unique_ids(&self) -> Result<(), DuplicateIdError> {
        fn first_repeat<'a>(ids: impl Iterator<Item = &'a str>) -> Option<String> {
            let mut seen = BTreeSet::new();
            ids.into_iter().find(|id| !seen.insert(*id)).map(str::to_owned)
        }

        if let Some(id) = first_repeat(self.pages.iter().map(|p| p.id().as_str())) {
            return Err(DuplicateIdError { kind: "page", id });
        }
        let elements = self.pages.iter().flat_map(|p| p.elements()).map(|e| e.id().as_str());
        if let Some(id) = first_repeat(elements) {
            return Err(DuplicateIdError { kind: "element", id });
        }
        if let Some(id) = first_repeat(self.conditions.iter().map(|c| c.id().as_str())) {
            return Err(DuplicateIdError { kind: "condition", id });
        }
        Ok(())
    }

    fn all_id_strs(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| {
                std::iter::once(p.id().as_str()).chain(p.elements().iter().map(|e| e.id().as_str()))
            })
            .chain(self.conditions.iter().map(|c| c.id().as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::FormDocument;
    use crate::model::fixtures;
    use crate::model::{FormId, PageId};

    #[test]
    fn form_document_parses_minimal_json() {
        let form: FormDocument =
            serde_json::from_str(r#"{ "id": "f1" }"#).expect("minimal form");
        assert_eq!(form.id(), &FormId::new("f1").expect("form id"));
        assert!(form.pages().is_empty());
        assert!(form.conditions().is_empty());
        assert_eq!(form.rev(), 0);
    }

    #[test]
    fn form_document_round_trips() {
        let form = fixtures::age_gate_form();
        let json = serde_json::to_string_pretty(&form).expect("serialize");
        let parsed: FormDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, form);
    }

    #[test]
    fn lookups_by_id() {
        let form = fixtures::age_gate_form();
        let p2 = PageId::new("p2").expect("page id");
        assert_eq!(form.page_index(&p2), Some(1));
        assert_eq!(form.page(&p2).map(|p| p.title()), Some("Adults"));
        assert!(form.page(&PageId::new("nope").expect("page id")).is_none());
    }

    #[test]
    fn unique_ids_pass_the_check() {
        assert_eq!(fixtures::age_gate_form().check_unique_ids(), Ok(()));
    }

    #[test]
    fn repeated_ids_are_reported_with_their_kind() {
        let mut form = fixtures::age_gate_form();
        let page = form.pages()[2].clone();
        form.pages_mut().push(page);
        let err = form.check_unique_ids().unwrap_err();
        assert_eq!((err.kind, err.id.as_str()), ("page", "p3"));

        let mut form = fixtures::age_gate_form();
        let element = form.pages()[0].elements()[0].clone();
        form.pages_mut()[2].elements_mut().push(element);
        let err = form.check_unique_ids().unwrap_err();
        assert_eq!((err.kind, err.id.as_str()), ("element", "e1"));

        let mut form = fixtures::age_gate_form();
        let condition = form.conditions()[0].clone();
        form.conditions_mut().push(condition);
        assert_eq!(
            form.check_unique_ids().unwrap_err().to_string(),
            "duplicate condition id c1"
        );
    }

    #[test]
    fn id_allocator_skips_existing_stamps() {
        let mut form = FormDocument::new(FormId::new("f").expect("form id"), "F");
        let far_future = PageId::new(format!("page-{}", u64::MAX / 2)).expect("page id");
        form.pages_mut().push(crate::model::Page::new(far_future, "Future"));

        let mut ids = form.id_allocator();
        let next = ids.page_id();
        assert_eq!(next.as_str(), format!("page-{}", u64::MAX / 2 + 1));
    }
}
