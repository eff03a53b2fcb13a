// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Condition, ElementId, Page, PageId};

pub const UNTITLED_PAGE: &str = "Untitled Page";
pub const UNKNOWN_ELEMENT: &str = "Unknown Element";

/// Title of the page with `page_id`, or [`UNTITLED_PAGE`] when it is missing or blank.
pub fn page_title<'a>(pages: &'a [Page], page_id: &PageId) -> &'a str {
    pages
        .iter()
        .find(|p| p.id() == page_id)
        .map(Page::title)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(UNTITLED_PAGE)
}

/// Title of `element_id` as found on the page `page_id`.
///
/// Falls back to [`UNKNOWN_ELEMENT`] when the page, the element, or the element reference is
/// missing.
pub fn element_title<'a>(
    pages: &'a [Page],
    page_id: &PageId,
    element_id: Option<&ElementId>,
) -> &'a str {
    let Some(element_id) = element_id else {
        return UNKNOWN_ELEMENT;
    };
    pages
        .iter()
        .find(|p| p.id() == page_id)
        .and_then(|p| p.element(element_id))
        .map(|e| e.title())
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(UNKNOWN_ELEMENT)
}

/// True when any id held by `condition` no longer resolves against `pages`.
pub fn condition_is_stale(pages: &[Page], condition: &Condition) -> bool {
    let source = pages.iter().find(|p| p.id() == condition.source_page_id());
    let target_exists = pages.iter().any(|p| p.id() == condition.target_page_id());
    let element_resolves = match (source, condition.element_id()) {
        (Some(page), Some(element_id)) => page.element(element_id).is_some(),
        _ => false,
    };
    !(target_exists && element_resolves)
}
