// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rstest::rstest;
use tokio::sync::Mutex;

use super::{FormSummary, Workspace, WorkspaceError, WorkspaceState};
use crate::model::fixtures::{age_gate_form, cid, linear_form, pid};
use crate::model::{FormDocument, FormId};
use crate::ops::{ApplyError, ConditionField, FormOp};
use crate::store::FormFolder;
use crate::test_utils::TempDir;
use crate::ui::UiState;

fn form_id(value: &str) -> FormId {
    FormId::new(value).expect("form id")
}

#[test]
fn in_memory_state_serves_seeded_forms_and_reports_missing_ones() {
    let mut state = WorkspaceState::in_memory([age_gate_form()]);

    assert_eq!(state.form(&form_id("age-gate")).expect("form").pages().len(), 3);
    assert!(matches!(
        state.form(&form_id("nope")),
        Err(WorkspaceError::FormNotFound { form_id }) if form_id.as_str() == "nope"
    ));
}

#[test]
fn list_summarizes_forms_sorted_by_id() {
    let mut state = WorkspaceState::in_memory([linear_form(2), age_gate_form()]);

    let summaries = state.list().expect("list");
    assert_eq!(
        summaries,
        vec![
            FormSummary {
                form_id: form_id("age-gate"),
                title: "Age gate".to_owned(),
                rev: 0,
                pages: 3,
                conditions: 1,
            },
            FormSummary {
                form_id: form_id("linear"),
                title: "Linear".to_owned(),
                rev: 0,
                pages: 2,
                conditions: 0,
            },
        ]
    );
}

#[test]
fn apply_commits_on_success_and_leaves_form_untouched_on_conflict() {
    let mut state = WorkspaceState::in_memory([age_gate_form()]);
    let id = form_id("age-gate");
    let update = [FormOp::UpdateCondition {
        condition_id: cid("c1"),
        field: ConditionField::Value,
        value: "21".to_owned(),
    }];

    let result = state.apply(&id, 0, &update).expect("apply");
    assert_eq!(result.new_rev, 1);
    assert_eq!(state.form(&id).expect("form").conditions()[0].value(), "21");

    let err = state.apply(&id, 0, &update).expect_err("stale rev");
    assert!(matches!(
        err,
        WorkspaceError::Apply(ApplyError::Conflict { base_rev: 0, current_rev: 1 })
    ));
    assert_eq!(state.form(&id).expect("form").rev(), 1);
}

#[test]
fn apply_current_builds_ops_against_the_latest_revision() {
    let mut state = WorkspaceState::in_memory([age_gate_form()]);
    let id = form_id("age-gate");

    for _ in 0..2 {
        state
            .apply_current(&id, |form| {
                let condition_id = form.id_allocator().condition_id();
                Ok(vec![FormOp::AddCondition { condition_id }])
            })
            .expect("add condition");
    }

    let form = state.form(&id).expect("form");
    assert_eq!(form.rev(), 2);
    assert_eq!(form.conditions().len(), 3);
}

#[test]
fn apply_current_propagates_builder_errors() {
    let empty = FormDocument::new(form_id("empty"), "Empty");
    let mut state = WorkspaceState::in_memory([empty]);

    let err = state
        .apply_current(&form_id("empty"), |form| {
            Err(WorkspaceError::NoPages { form_id: form.id().clone() })
        })
        .expect_err("no pages");
    assert!(matches!(err, WorkspaceError::NoPages { .. }));
}

#[rstest]
#[case::newer_incoming(5, 6)]
#[case::older_incoming(0, 3)]
fn put_continues_the_revision_of_the_replaced_form(#[case] incoming: u64, #[case] expected: u64) {
    let mut existing = age_gate_form();
    existing.set_rev(2);
    let mut state = WorkspaceState::in_memory([existing]);

    let mut replacement = age_gate_form();
    replacement.set_title("Renamed");
    replacement.set_rev(incoming);

    let stored = state.put(replacement).expect("put");
    assert_eq!(stored.rev(), expected);
    assert_eq!(stored.title(), "Renamed");
}

#[test]
fn put_keeps_the_revision_of_a_new_form() {
    let mut state = WorkspaceState::in_memory([]);
    let mut form = linear_form(1);
    form.set_rev(4);

    assert_eq!(state.put(form).expect("put").rev(), 4);
}

#[test]
fn persistent_state_writes_every_mutation_through() {
    let tmp = TempDir::new("workspace");
    let folder = FormFolder::new(tmp.path());
    let mut state = WorkspaceState::persistent(folder.clone());
    let id = form_id("age-gate");

    state.put(age_gate_form()).expect("put");
    state
        .apply(&id, 0, &[FormOp::RemoveCondition { condition_id: cid("c1") }])
        .expect("remove");

    let on_disk = folder.load_form(&id).expect("load");
    assert_eq!(on_disk.rev(), 1);
    assert!(on_disk.conditions().is_empty());

    let mut reopened = WorkspaceState::persistent(folder);
    assert_eq!(reopened.form(&id).expect("lazy load").rev(), 1);
    assert_eq!(reopened.list().expect("list").len(), 1);
}

#[test]
fn delete_removes_cached_and_stored_copies() {
    let tmp = TempDir::new("workspace-delete");
    let folder = FormFolder::new(tmp.path());
    let mut state = WorkspaceState::persistent(folder.clone());
    let id = form_id("age-gate");
    state.put(age_gate_form()).expect("put");

    assert!(state.delete(&id).expect("delete"));
    assert!(!state.delete(&id).expect("second delete"));
    assert!(matches!(state.form(&id), Err(WorkspaceError::FormNotFound { .. })));
    assert!(folder.list_forms().expect("list").is_empty());
}

#[test]
fn save_writes_a_seeded_form_and_reports_missing_ones() {
    let tmp = TempDir::new("workspace-save");
    let folder = FormFolder::new(tmp.path());
    let mut state = WorkspaceState::persistent(folder.clone()).with_form(linear_form(2));
    let id = form_id("linear");

    state.save(&id).expect("save");
    assert_eq!(folder.load_form(&id).expect("load"), linear_form(2));

    let mut reopened = WorkspaceState::persistent(folder);
    reopened.save(&id).expect("save after lazy load");
    assert!(matches!(
        reopened.save(&form_id("ghost")),
        Err(WorkspaceError::FormNotFound { .. })
    ));

    let mut in_memory = WorkspaceState::in_memory([linear_form(1)]);
    in_memory.save(&id).expect("no folder, nothing to write");
}

#[test]
fn put_refuses_repeated_ids_and_keeps_the_stored_form() {
    let mut state = WorkspaceState::in_memory([age_gate_form()]);
    let mut form = age_gate_form();
    let copy = form.conditions()[0].clone();
    form.conditions_mut().push(copy);

    assert!(matches!(state.put(form), Err(WorkspaceError::InvalidForm(_))));
    assert_eq!(state.form(&form_id("age-gate")).expect("form").conditions().len(), 1);
}

#[test]
fn noop_batches_are_not_persisted() {
    let tmp = TempDir::new("workspace-noop");
    let folder = FormFolder::new(tmp.path());
    let mut state = WorkspaceState::persistent(folder.clone()).with_form(linear_form(2));

    let result = state.apply(&form_id("linear"), 0, &[]).expect("empty batch");
    assert_eq!(result.applied, 0);
    assert!(folder.list_forms().expect("list").is_empty());
}

#[test]
fn blocking_lock_and_notify_bump_the_ui_forms_rev() {
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let workspace = Workspace::new(WorkspaceState::in_memory([age_gate_form()]))
        .with_ui_state(ui_state.clone());

    {
        let mut state = workspace.blocking_lock();
        state
            .apply(
                &form_id("age-gate"),
                0,
                &[FormOp::SetConditionSourcePage { condition_id: cid("c1"), page_id: pid("p2") }],
            )
            .expect("apply");
    }
    workspace.blocking_notify_forms_changed();

    assert_eq!(ui_state.blocking_lock().forms_rev(), 1);
}

#[tokio::test]
async fn async_lock_sees_changes_made_through_clones() {
    let workspace = Workspace::new(WorkspaceState::in_memory([linear_form(3)]));
    let other = workspace.clone();

    other
        .lock()
        .await
        .apply(
            &form_id("linear"),
            0,
            &[FormOp::RenamePage { page_id: pid("p1"), title: "Intro".to_owned() }],
        )
        .expect("rename");
    other.notify_forms_changed().await;

    let mut state = workspace.lock().await;
    let form = state.form(&form_id("linear")).expect("form");
    assert_eq!(form.pages()[0].title(), "Intro");
}
