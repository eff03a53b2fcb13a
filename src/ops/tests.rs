// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;
use serde_json::json;

use crate::model::fixtures::{age_gate_form, cid, eid, linear_form, pid};
use crate::model::{Element, ElementKind, FormDocument, FormId, Operator, Page};

use super::{
    add_condition, apply_ops, default_condition, remove_condition, update_condition,
    update_source_page, ApplyError, ConditionField, ElementPatch, FormObjectRef, FormOp,
    ObjectKind, StaleConditionPolicy,
};

#[test]
fn add_condition_with_two_or_more_pages_targets_the_second_page() {
    for n in 2..6 {
        let mut form = linear_form(n);
        let condition = add_condition(&mut form, cid("c")).expect("pages exist").clone();

        assert_eq!(condition.source_page_id(), &pid("p1"));
        assert_eq!(condition.target_page_id(), &pid("p2"));
        assert_eq!(condition.element_id(), None);
        assert_eq!(condition.operator(), Operator::Equals);
        assert_eq!(condition.value(), "");
        assert_eq!(form.conditions().len(), 1);
    }
}

#[test]
fn add_condition_with_one_page_is_a_self_loop() {
    let mut form = linear_form(1);
    let condition = add_condition(&mut form, cid("c")).expect("one page").clone();
    assert_eq!(condition.source_page_id(), condition.target_page_id());
}

#[test]
fn add_condition_defaults_element_to_first_element_of_first_page() {
    let mut form = age_gate_form();
    let condition = add_condition(&mut form, cid("c2")).expect("pages exist").clone();
    assert_eq!(condition.element_id(), Some(&eid("e1")));
    assert_eq!(form.conditions().last().map(|c| c.id()), Some(&cid("c2")));
}

#[test]
fn add_condition_without_pages_is_a_no_op() {
    let mut form = linear_form(0);
    assert!(add_condition(&mut form, cid("c")).is_none());
    assert!(form.conditions().is_empty());
    assert!(default_condition(form.pages(), cid("c")).is_none());
}

#[test]
fn remove_condition_ignores_unknown_ids() {
    let mut form = age_gate_form();
    assert_eq!(remove_condition(&mut form, &cid("missing")), 0);
    assert_eq!(form.conditions().len(), 1);

    assert_eq!(remove_condition(&mut form, &cid("c1")), 1);
    assert!(form.conditions().is_empty());
}

#[test]
fn remove_condition_drops_every_record_sharing_the_id() {
    let mut form = age_gate_form();
    let copy = form.conditions()[0].clone();
    form.conditions_mut().push(copy);

    assert_eq!(remove_condition(&mut form, &cid("c1")), 2);
    assert!(form.condition(&cid("c1")).is_none());
}

#[test]
fn updates_reach_every_record_sharing_the_id() {
    let mut form = age_gate_form();
    let copy = form.conditions()[0].clone();
    form.conditions_mut().push(copy);

    assert!(update_condition(&mut form, &cid("c1"), ConditionField::Value, "30"));
    assert!(form.conditions().iter().all(|c| c.value() == "30"));

    assert!(update_source_page(&mut form, &cid("c1"), pid("p2")));
    assert!(form
        .conditions()
        .iter()
        .all(|c| c.source_page_id() == &pid("p2") && c.element_id() == Some(&eid("e3"))));
}

#[rstest]
#[case(ConditionField::Value, "21")]
#[case(ConditionField::Operator, "less_than")]
#[case(ConditionField::TargetPageId, "p3")]
#[case(ConditionField::ElementId, "e2")]
#[case(ConditionField::ElementId, "")]
#[case(ConditionField::SourcePageId, "p2")]
fn update_condition_replaces_one_field(#[case] field: ConditionField, #[case] value: &str) {
    let mut form = age_gate_form();
    let before = form.conditions()[0].clone();

    assert!(update_condition(&mut form, &cid("c1"), field, value));
    let after = &form.conditions()[0];

    let as_wire = serde_json::to_value(after).expect("serialize");
    let key = serde_json::to_value(field).expect("field name");
    let key = key.as_str().expect("field is a string");
    assert_eq!(as_wire[key], json!(value));

    // Everything else stays put, including the element on a raw source page change.
    for other in ConditionField::ALL.into_iter().filter(|f| *f != field) {
        let other_key = serde_json::to_value(other).expect("field name");
        let other_key = other_key.as_str().expect("field is a string");
        let before_wire = serde_json::to_value(&before).expect("serialize");
        assert_eq!(as_wire[other_key], before_wire[other_key], "{other_key} changed");
    }
}

#[rstest]
#[case(ConditionField::Operator, "roughly")]
#[case(ConditionField::SourcePageId, "")]
#[case(ConditionField::TargetPageId, "a/b")]
fn update_condition_ignores_unparseable_values(
    #[case] field: ConditionField,
    #[case] value: &str,
) {
    let mut form = age_gate_form();
    let before = form.clone();
    assert!(!update_condition(&mut form, &cid("c1"), field, value));
    assert_eq!(form, before);
}

#[test]
fn update_condition_on_missing_condition_is_a_no_op() {
    let mut form = age_gate_form();
    let before = form.clone();
    assert!(!update_condition(&mut form, &cid("nope"), ConditionField::Value, "x"));
    assert_eq!(form, before);
}

#[test]
fn update_source_page_resets_element_for_every_page_and_prior_element() {
    let base = age_gate_form();
    let prior_elements = [None, Some(eid("e1")), Some(eid("e2")), Some(eid("e3")), Some(eid("x"))];

    for page in base.pages() {
        for prior in &prior_elements {
            let mut form = base.clone();
            form.condition_mut(&cid("c1")).expect("c1").set_element_id(prior.clone());

            update_source_page(&mut form, &cid("c1"), page.id().clone());

            let condition = form.condition(&cid("c1")).expect("c1");
            assert_eq!(condition.source_page_id(), page.id());
            assert_eq!(condition.element_id(), page.first_element_id());
            if let Some(element_id) = condition.element_id() {
                assert!(page.element(element_id).is_some());
            }
        }
    }
}

#[test]
fn update_source_page_to_unknown_page_clears_element() {
    let mut form = age_gate_form();
    assert!(update_source_page(&mut form, &cid("c1"), pid("ghost")));
    let condition = form.condition(&cid("c1")).expect("c1");
    assert_eq!(condition.source_page_id(), &pid("ghost"));
    assert_eq!(condition.element_id(), None);
}

#[test]
fn apply_ops_bumps_rev_and_reports_delta() {
    let mut form = age_gate_form();
    let ops = [
        FormOp::AddCondition { condition_id: cid("c2") },
        FormOp::UpdateCondition {
            condition_id: cid("c2"),
            field: ConditionField::Value,
            value: "x".to_owned(),
        },
        FormOp::RenamePage { page_id: pid("p3"), title: "Kids".to_owned() },
    ];

    let result = apply_ops(&mut form, 0, &ops).expect("apply");
    assert_eq!(result.new_rev, 1);
    assert_eq!(result.applied, 3);
    assert_eq!(form.rev(), 1);
    assert_eq!(result.delta.added, vec![FormObjectRef::Condition { condition_id: cid("c2") }]);
    assert_eq!(result.delta.updated, vec![FormObjectRef::Page { page_id: pid("p3") }]);
    assert!(result.delta.removed.is_empty());
    assert_eq!(form.condition(&cid("c2")).map(|c| c.value()), Some("x"));
}

#[test]
fn apply_ops_rejects_stale_base_rev() {
    let mut form = age_gate_form();
    form.set_rev(4);
    let err = apply_ops(&mut form, 3, &[FormOp::RemoveCondition { condition_id: cid("c1") }])
        .unwrap_err();
    assert_eq!(err, ApplyError::Conflict { base_rev: 3, current_rev: 4 });
    assert_eq!(form.conditions().len(), 1);
}

#[test]
fn apply_ops_is_atomic() {
    let mut form = age_gate_form();
    let before = form.clone();
    let ops = [
        FormOp::RemoveCondition { condition_id: cid("c1") },
        FormOp::RenamePage { page_id: pid("missing"), title: "x".to_owned() },
    ];

    let err = apply_ops(&mut form, 0, &ops).unwrap_err();
    assert_eq!(err, ApplyError::NotFound { kind: ObjectKind::Page, id: "missing".to_owned() });
    assert_eq!(form, before);
}

#[test]
fn apply_ops_empty_batch_keeps_rev() {
    let mut form = age_gate_form();
    let result = apply_ops(&mut form, 0, &[]).expect("apply");
    assert_eq!(result.new_rev, 0);
    assert!(result.delta.is_empty());
}

#[test]
fn add_condition_op_without_pages_applies_nothing() {
    let mut form = FormDocument::new(FormId::new("empty").expect("form id"), "Empty");
    let result =
        apply_ops(&mut form, 0, &[FormOp::AddCondition { condition_id: cid("c") }]).expect("apply");
    assert!(result.delta.is_empty());
    assert!(form.conditions().is_empty());
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut form = age_gate_form();
    let err = apply_ops(&mut form, 0, &[FormOp::AddCondition { condition_id: cid("c1") }])
        .unwrap_err();
    assert_eq!(err, ApplyError::AlreadyExists { kind: ObjectKind::Condition, id: "c1".to_owned() });

    let err = apply_ops(
        &mut form,
        0,
        &[FormOp::AddElement {
            page_id: pid("p3"),
            element: Element::new(eid("e1"), "Dup", ElementKind::text()),
            index: None,
        }],
    )
    .unwrap_err();
    assert_eq!(err, ApplyError::AlreadyExists { kind: ObjectKind::Element, id: "e1".to_owned() });
}

#[test]
fn remove_page_cascades_dependent_conditions() {
    let mut form = age_gate_form();
    let ops =
        [FormOp::RemovePage { page_id: pid("p2"), policy: StaleConditionPolicy::Cascade }];
    let result = apply_ops(&mut form, 0, &ops).expect("apply");

    assert!(form.conditions().is_empty());
    assert!(form.page(&pid("p2")).is_none());
    assert!(result.delta.removed.contains(&FormObjectRef::Condition { condition_id: cid("c1") }));
    assert!(result
        .delta
        .removed
        .contains(&FormObjectRef::Element { page_id: pid("p2"), element_id: eid("e3") }));
}

#[test]
fn remove_page_can_keep_stale_conditions() {
    let mut form = age_gate_form();
    let ops = [FormOp::RemovePage { page_id: pid("p2"), policy: StaleConditionPolicy::Keep }];
    apply_ops(&mut form, 0, &ops).expect("apply");

    assert_eq!(form.conditions().len(), 1);
    assert_eq!(form.conditions()[0].target_page_id(), &pid("p2"));
}

#[test]
fn remove_element_cascades_only_conditions_on_that_element() {
    let mut form = age_gate_form();
    form.conditions_mut().push(crate::model::Condition::new(
        cid("c2"),
        pid("p1"),
        Some(eid("e2")),
        Operator::Contains,
        "Bo",
        pid("p3"),
    ));

    let ops = [FormOp::RemoveElement {
        page_id: pid("p1"),
        element_id: eid("e1"),
        policy: StaleConditionPolicy::Cascade,
    }];
    apply_ops(&mut form, 0, &ops).expect("apply");

    let remaining = form.conditions().iter().map(|c| c.id().clone()).collect::<Vec<_>>();
    assert_eq!(remaining, vec![cid("c2")]);
}

#[test]
fn move_page_and_element_clamp_indices() {
    let mut form = age_gate_form();
    let ops = [
        FormOp::MovePage { page_id: pid("p1"), to_index: 99 },
        FormOp::MoveElement { page_id: pid("p1"), element_id: eid("e2"), to_index: 0 },
    ];
    let result = apply_ops(&mut form, 0, &ops).expect("apply");

    let order = form.pages().iter().map(|p| p.id().as_str()).collect::<Vec<_>>();
    assert_eq!(order, ["p2", "p3", "p1"]);
    assert_eq!(form.pages()[2].first_element_id(), Some(&eid("e2")));
    assert_eq!(result.delta.updated.len(), 2);
}

#[test]
fn add_then_remove_in_one_batch_leaves_no_trace_in_delta() {
    let mut form = age_gate_form();
    let ops = [
        FormOp::AddPage { page_id: pid("tmp"), title: "Tmp".to_owned(), index: Some(0) },
        FormOp::RemovePage { page_id: pid("tmp"), policy: StaleConditionPolicy::Cascade },
    ];
    let result = apply_ops(&mut form, 0, &ops).expect("apply");
    assert!(result.delta.is_empty());
    assert_eq!(form.pages().len(), 3);
}

#[test]
fn update_element_applies_patch_fields() {
    let mut form = age_gate_form();
    let patch = ElementPatch {
        title: Some("Years".to_owned()),
        required: Some(true),
        kind: Some(ElementKind::rating()),
        ..ElementPatch::default()
    };
    apply_ops(
        &mut form,
        0,
        &[FormOp::UpdateElement { page_id: pid("p1"), element_id: eid("e1"), patch }],
    )
    .expect("apply");

    let page: &Page = form.page(&pid("p1")).expect("p1");
    let element = page.element(&eid("e1")).expect("e1");
    assert_eq!(element.title(), "Years");
    assert!(element.required());
    assert_eq!(element.kind().type_name(), "rating");
}

#[test]
fn form_ops_parse_from_wire_json() {
    let ops: Vec<FormOp> = serde_json::from_value(json!([
        { "op": "add_condition", "conditionId": "c9" },
        { "op": "update_condition", "conditionId": "c9", "field": "operator", "value": "contains" },
        { "op": "set_condition_source_page", "conditionId": "c9", "pageId": "p2" },
        { "op": "remove_page", "pageId": "p3" },
    ]))
    .expect("ops");

    assert_eq!(
        ops[3],
        FormOp::RemovePage { page_id: pid("p3"), policy: StaleConditionPolicy::Cascade }
    );

    let mut form = age_gate_form();
    apply_ops(&mut form, 0, &ops).expect("apply");
    let c9 = form.condition(&cid("c9")).expect("c9");
    assert_eq!(c9.operator(), Operator::Contains);
    assert_eq!(c9.source_page_id(), &pid("p2"));
    assert_eq!(c9.element_id(), Some(&eid("e3")));
}
