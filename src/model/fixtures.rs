// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::condition::{Condition, Operator};
use super::element::{Element, ElementKind};
use super::form::FormDocument;
use super::ids::{ConditionId, ElementId, FormId, PageId};
use super::page::Page;

pub(crate) fn pid(value: &str) -> PageId {
    PageId::new(value).expect("page id")
}

pub(crate) fn eid(value: &str) -> ElementId {
    ElementId::new(value).expect("element id")
}

pub(crate) fn cid(value: &str) -> ConditionId {
    ConditionId::new(value).expect("condition id")
}

/// `p1` (Age, Name) -> `c1: Age > 18` -> `p2`; `p3` has no incoming or outgoing condition.
pub(crate) fn age_gate_form() -> FormDocument {
    let mut form = FormDocument::new(FormId::new("age-gate").expect("form id"), "Age gate");

    form.pages_mut().push(Page::new(pid("p1"), "About you").with_elements(vec![
        Element::new(eid("e1"), "Age", ElementKind::text()),
        Element::new(eid("e2"), "Name", ElementKind::text()),
    ]));
    form.pages_mut().push(Page::new(pid("p2"), "Adults").with_elements(vec![Element::new(
        eid("e3"),
        "Drink",
        ElementKind::select(["Beer", "Wine"]),
    )]));
    form.pages_mut().push(Page::new(pid("p3"), "Minors"));

    form.conditions_mut().push(Condition::new(
        cid("c1"),
        pid("p1"),
        Some(eid("e1")),
        Operator::GreaterThan,
        "18",
        pid("p2"),
    ));

    form
}

/// `n` pages `p1..pn` without elements or conditions.
#[cfg(test)]
pub(crate) fn linear_form(n: usize) -> FormDocument {
    let mut form = FormDocument::new(FormId::new("linear").expect("form id"), "Linear");
    for idx in 1..=n {
        form.pages_mut().push(Page::new(pid(&format!("p{idx}")), format!("Page {idx}")));
    }
    form
}

/// The built-in demo form used by `--demo`.
pub fn demo_form() -> FormDocument {
    let mut form = FormDocument::new(FormId::new("demo").expect("form id"), "Event signup");

    form.pages_mut().push(Page::new(pid("welcome"), "Welcome").with_elements(vec![
        Element::new(eid("attending"), "Attending?", ElementKind::yes_no()),
        Element::new(eid("email"), "Email", ElementKind::Email { placeholder: None, value: None }),
    ]));
    form.pages_mut().push(Page::new(pid("details"), "Details").with_elements(vec![
        Element::new(eid("guests"), "Guests", ElementKind::text()),
        Element::new(eid("diet"), "Diet", ElementKind::select(["None", "Vegetarian", "Vegan"])),
    ]));
    form.pages_mut().push(Page::new(pid("group"), "Group booking").with_elements(vec![
        Element::new(eid("company"), "Company", ElementKind::text()),
    ]));
    form.pages_mut().push(Page::new(pid("regrets"), "Sorry to miss you").with_elements(vec![
        Element::new(eid("feedback"), "Feedback", ElementKind::rating()),
    ]));
    form.pages_mut().push(Page::new(pid("done"), "Thanks"));

    form.conditions_mut().push(Condition::new(
        cid("skip-when-absent"),
        pid("welcome"),
        Some(eid("attending")),
        Operator::Equals,
        "no",
        pid("regrets"),
    ));
    form.conditions_mut().push(Condition::new(
        cid("large-party"),
        pid("details"),
        Some(eid("guests")),
        Operator::GreaterThan,
        "5",
        pid("group"),
    ));

    form
}
