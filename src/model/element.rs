// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::ElementId;

/// Free-form CSS-like style properties. Ordered so serialized documents are stable.
pub type StyleMap = BTreeMap<String, String>;

/// One field (or display block) on a form page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    id: ElementId,
    title: String,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    styles: StyleMap,
    #[serde(flatten)]
    kind: ElementKind,
}

/// Element payload keyed by the wire `type`. Each variant carries only the fields that make
/// sense for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Phone {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Checkbox {
        #[serde(default)]
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        value: Vec<String>,
    },
    Select {
        #[serde(default)]
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Rating {
        #[serde(default = "default_rating_max")]
        max: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<u8>,
    },
    YesNo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Button {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

fn default_rating_max() -> u8 {
    5
}

impl ElementKind {
    pub fn text() -> Self {
        Self::Text { placeholder: None, value: None }
    }

    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Select { options: options.into_iter().map(Into::into).collect(), value: None }
    }

    pub fn rating() -> Self {
        Self::Rating { max: default_rating_max(), value: None }
    }

    pub fn yes_no() -> Self {
        Self::YesNo { value: None }
    }

    /// The wire `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Email { .. } => "email",
            Self::Phone { .. } => "phone",
            Self::Date { .. } => "date",
            Self::Checkbox { .. } => "checkbox",
            Self::Select { .. } => "select",
            Self::Image { .. } => "image",
            Self::Rating { .. } => "rating",
            Self::YesNo { .. } => "yesno",
            Self::Link { .. } => "link",
            Self::Button { .. } => "button",
        }
    }

    /// Whether a respondent can answer this element (and a condition can test it).
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Image { .. } | Self::Link { .. } | Self::Button { .. })
    }

    /// Options offered to the respondent, for kinds that have them.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Checkbox { options, .. } | Self::Select { options, .. } => options,
            _ => &[],
        }
    }
}

impl Element {
    pub fn new(id: ElementId, title: impl Into<String>, kind: ElementKind) -> Self {
        Self { id, title: title.into(), required: false, styles: StyleMap::new(), kind }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleMap {
        &mut self.styles
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: ElementKind) {
        self.kind = kind;
    }
}
