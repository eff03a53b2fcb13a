// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime meaning of a condition: which page a respondent sees next.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Condition, ConditionId, ElementId, FormDocument, Operator, PageId};

/// Answers given so far, keyed by element id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Answers(BTreeMap<ElementId, String>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element_id: &ElementId) -> Option<&str> {
        self.0.get(element_id).map(String::as_str)
    }

    pub fn insert(&mut self, element_id: ElementId, answer: impl Into<String>) {
        self.0.insert(element_id, answer.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ElementId, String)> for Answers {
    fn from_iter<I: IntoIterator<Item = (ElementId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether `condition` holds for `answers`.
///
/// A condition without an element never matches. A missing answer compares as empty text.
pub fn evaluate(condition: &Condition, answers: &Answers) -> bool {
    let Some(element_id) = condition.element_id() else {
        return false;
    };
    let answer = answers.get(element_id).unwrap_or("");
    let expected = condition.value();

    match condition.operator() {
        Operator::Equals => answer == expected,
        Operator::NotEquals => answer != expected,
        Operator::Contains => answer.contains(expected),
        Operator::GreaterThan => compare_numbers(answer, expected, |a, b| a > b),
        Operator::LessThan => compare_numbers(answer, expected, |a, b| a < b),
    }
}

fn compare_numbers(answer: &str, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (answer.trim().parse::<f64>(), expected.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextPage {
    /// `None` at the end of the form.
    pub page_id: Option<PageId>,
    /// The condition that routed here, `None` for sequential flow.
    pub via: Option<ConditionId>,
}

/// Resolves where a respondent on `current` goes next.
///
/// The first matching condition sourced at `current` (insertion order) whose target page exists
/// wins; otherwise the page after `current` in page order; otherwise the form ends.
pub fn resolve_next(form: &FormDocument, current: &PageId, answers: &Answers) -> NextPage {
    let matched = form.conditions().iter().find(|c| {
        c.source_page_id() == current
            && form.page(c.target_page_id()).is_some()
            && evaluate(c, answers)
    });
    if let Some(condition) = matched {
        return NextPage {
            page_id: Some(condition.target_page_id().clone()),
            via: Some(condition.id().clone()),
        };
    }

    let page_id = form
        .page_index(current)
        .and_then(|idx| form.pages().get(idx + 1))
        .map(|p| p.id().clone());
    NextPage { page_id, via: None }
}

pub fn next_page(form: &FormDocument, current: &PageId, answers: &Answers) -> Option<PageId> {
    resolve_next(form, current, answers).page_id
}
