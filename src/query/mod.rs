// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over form documents.
//!
//! Queries provide derived views (labels, validation, navigation analysis, runtime evaluation)
//! that power the projection, the UI and the HTTP API.

pub mod evaluate;
pub mod issues;
pub mod labels;
pub mod navigation;

pub use evaluate::{evaluate, next_page, resolve_next, Answers, NextPage};
pub use issues::{condition_issues, issues_for, ConditionIssue, ConditionReport};
pub use labels::{condition_is_stale, element_title, page_title, UNKNOWN_ELEMENT, UNTITLED_PAGE};
pub use navigation::{
    dead_end_pages, degrees, page_adjacency, reachable_pages, unreachable_pages, PageDegree,
};
