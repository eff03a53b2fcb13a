// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::element::Element;
use super::ids::{ElementId, PageId};

/// One screen/step of a multi-step form. Owns its elements in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    id: PageId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    elements: Vec<Element>,
}

impl Page {
    pub fn new(id: PageId, title: impl Into<String>) -> Self {
        Self { id, title: title.into(), elements: Vec::new() }
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<Element> {
        &mut self.elements
    }

    pub fn element(&self, element_id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == element_id)
    }

    pub fn element_mut(&mut self, element_id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == element_id)
    }

    pub fn first_element_id(&self) -> Option<&ElementId> {
        self.elements.first().map(Element::id)
    }
}
