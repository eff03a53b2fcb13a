// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{blank_as_none, ConditionId, ElementId, PageId};

/// Comparison applied between an answer and a condition's value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::GreaterThan,
        Operator::LessThan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
        }
    }

    /// Short form used in graph labels.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "≠",
            Self::Contains => "contains",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        }
    }

    /// Cycles through [`Operator::ALL`], wrapping at both ends.
    pub fn cycle(self, step: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|op| *op == self).unwrap_or(0) as isize;
        Self::ALL[(idx + step).rem_euclid(len) as usize]
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator '{0}' (expected equals, not_equals, contains, greater_than, less_than)")]
pub struct ParseOperatorError(pub String);

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseOperatorError(s.to_owned()))
    }
}

/// "If page `source_page_id`'s element `element_id` satisfies `operator` against `value`,
/// navigate to page `target_page_id`."
///
/// Page and element ids are weak references: nothing guarantees they still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    id: ConditionId,
    source_page_id: PageId,
    #[serde(with = "blank_as_none", default)]
    #[schemars(with = "String")]
    element_id: Option<ElementId>,
    #[serde(default)]
    operator: Operator,
    #[serde(default)]
    value: String,
    target_page_id: PageId,
}

impl Condition {
    pub fn new(
        id: ConditionId,
        source_page_id: PageId,
        element_id: Option<ElementId>,
        operator: Operator,
        value: impl Into<String>,
        target_page_id: PageId,
    ) -> Self {
        Self { id, source_page_id, element_id, operator, value: value.into(), target_page_id }
    }

    pub fn id(&self) -> &ConditionId {
        &self.id
    }

    pub fn source_page_id(&self) -> &PageId {
        &self.source_page_id
    }

    pub fn set_source_page_id(&mut self, page_id: PageId) {
        self.source_page_id = page_id;
    }

    pub fn element_id(&self) -> Option<&ElementId> {
        self.element_id.as_ref()
    }

    pub fn set_element_id(&mut self, element_id: Option<ElementId>) {
        self.element_id = element_id;
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn set_operator(&mut self, operator: Operator) {
        self.operator = operator;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn target_page_id(&self) -> &PageId {
        &self.target_page_id
    }

    pub fn set_target_page_id(&mut self, page_id: PageId) {
        self.target_page_id = page_id;
    }

    pub fn references_page(&self, page_id: &PageId) -> bool {
        &self.source_page_id == page_id || &self.target_page_id == page_id
    }
}
