// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Condition, ConditionId, Element, ElementId, FormDocument, Page, PageId};

/// A reference held by a condition that does not resolve to something usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConditionIssue {
    #[serde(rename_all = "camelCase")]
    MissingSourcePage { page_id: PageId },
    #[serde(rename_all = "camelCase")]
    MissingTargetPage { page_id: PageId },
    /// No element selected, or the element no longer exists on any page.
    #[serde(rename_all = "camelCase")]
    MissingElement { element_id: Option<ElementId> },
    #[serde(rename_all = "camelCase")]
    ElementNotOnSourcePage { element_id: ElementId, page_id: PageId },
    #[serde(rename_all = "camelCase")]
    ElementNotAnswerable { element_id: ElementId, element_type: String },
}

impl fmt::Display for ConditionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSourcePage { page_id } => write!(f, "source page {page_id} is missing"),
            Self::MissingTargetPage { page_id } => write!(f, "target page {page_id} is missing"),
            Self::MissingElement { element_id: None } => f.write_str("no element selected"),
            Self::MissingElement { element_id: Some(element_id) } => {
                write!(f, "element {element_id} is missing")
            }
            Self::ElementNotOnSourcePage { element_id, page_id } => {
                write!(f, "element {element_id} is not on source page {page_id}")
            }
            Self::ElementNotAnswerable { element_id, element_type } => {
                write!(f, "element {element_id} ({element_type}) takes no answer")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReport {
    pub condition_id: ConditionId,
    pub issues: Vec<ConditionIssue>,
}

/// Validates every condition against the current pages.
///
/// Only conditions with at least one issue are reported, in condition order.
pub fn condition_issues(form: &FormDocument) -> Vec<ConditionReport> {
    form.conditions()
        .iter()
        .filter_map(|condition| {
            let issues = issues_for(form.pages(), condition);
            (!issues.is_empty())
                .then(|| ConditionReport { condition_id: condition.id().clone(), issues })
        })
        .collect()
}

pub fn issues_for(pages: &[Page], condition: &Condition) -> Vec<ConditionIssue> {
    let mut issues = Vec::new();

    let source = pages.iter().find(|p| p.id() == condition.source_page_id());
    if source.is_none() {
        issues.push(ConditionIssue::MissingSourcePage {
            page_id: condition.source_page_id().clone(),
        });
    }
    if !pages.iter().any(|p| p.id() == condition.target_page_id()) {
        issues.push(ConditionIssue::MissingTargetPage {
            page_id: condition.target_page_id().clone(),
        });
    }

    let Some(element_id) = condition.element_id() else {
        issues.push(ConditionIssue::MissingElement { element_id: None });
        return issues;
    };

    let element = match source.and_then(|p| p.element(element_id)) {
        Some(element) => Some(element),
        None => {
            let elsewhere = find_element(pages, element_id);
            match (elsewhere, source) {
                (Some(_), Some(page)) => issues.push(ConditionIssue::ElementNotOnSourcePage {
                    element_id: element_id.clone(),
                    page_id: page.id().clone(),
                }),
                (Some(_), None) => {}
                (None, _) => issues.push(ConditionIssue::MissingElement {
                    element_id: Some(element_id.clone()),
                }),
            }
            elsewhere
        }
    };

    if let Some(element) = element.filter(|e| !e.kind().is_input()) {
        issues.push(ConditionIssue::ElementNotAnswerable {
            element_id: element_id.clone(),
            element_type: element.kind().type_name().to_owned(),
        });
    }

    issues
}

fn find_element<'a>(pages: &'a [Page], element_id: &ElementId) -> Option<&'a Element> {
    pages.iter().find_map(|p| p.element(element_id))
}
