// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A form document holds pages (each owning its elements) and a flat list of navigation
//! conditions that reference pages/elements by id.

pub mod condition;
pub mod element;
pub(crate) mod fixtures;
pub mod form;
pub mod ids;
pub mod page;

pub use condition::{Condition, Operator, ParseOperatorError};
pub use element::{Element, ElementKind, StyleMap};
pub use fixtures::demo_form;
pub use form::{DuplicateIdError, FormDocument};
pub use ids::{ConditionId, ElementId, FormId, Id, IdAllocator, IdError, PageId};
pub use page::Page;
