// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Page/element/condition mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types, reducers and orchestration.
fn apply_form_op(
    form: &mut FormDocument,
    op: &FormOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        FormOp::AddCondition { condition_id } => {
            if form.condition(condition_id).is_some() {
                return Err(ApplyError::AlreadyExists {
                    kind: ObjectKind::Condition,
                    id: condition_id.to_string(),
                });
            }
            if add_condition(form, condition_id.clone()).is_some() {
                delta.record_added(FormObjectRef::condition(condition_id));
            } else {
                tracing::warn!(%condition_id, "add condition ignored: form has no pages");
            }
            Ok(())
        }
        FormOp::RemoveCondition { condition_id } => {
            if remove_condition(form, condition_id) > 0 {
                delta.record_removed(FormObjectRef::condition(condition_id));
            }
            Ok(())
        }
        FormOp::UpdateCondition { condition_id, field, value } => {
            if update_condition(form, condition_id, *field, value) {
                delta.record_updated(FormObjectRef::condition(condition_id));
            }
            Ok(())
        }
        FormOp::SetConditionSourcePage { condition_id, page_id } => {
            if update_source_page(form, condition_id, page_id.clone()) {
                delta.record_updated(FormObjectRef::condition(condition_id));
            }
            Ok(())
        }
        FormOp::AddPage { page_id, title, index } => {
            if form.page(page_id).is_some() {
                return Err(ApplyError::AlreadyExists {
                    kind: ObjectKind::Page,
                    id: page_id.to_string(),
                });
            }
            let pages = form.pages_mut();
            let at = index.unwrap_or(pages.len()).min(pages.len());
            pages.insert(at, Page::new(page_id.clone(), title.clone()));
            delta.record_added(FormObjectRef::page(page_id));
            Ok(())
        }
        FormOp::RenamePage { page_id, title } => {
            let page = existing_page_mut(form, page_id)?;
            page.set_title(title.clone());
            delta.record_updated(FormObjectRef::page(page_id));
            Ok(())
        }
        FormOp::RemovePage { page_id, policy } => {
            let Some(index) = form.page_index(page_id) else {
                return Err(not_found_page(page_id));
            };
            let page = form.pages_mut().remove(index);
            for element in page.elements() {
                delta.record_removed(FormObjectRef::element(page_id, element.id()));
            }
            delta.record_removed(FormObjectRef::page(page_id));

            if *policy == StaleConditionPolicy::Cascade {
                let element_ids =
                    page.elements().iter().map(|e| e.id().clone()).collect::<BTreeSet<_>>();
                retain_conditions(form, delta, |c| {
                    !c.references_page(page_id)
                        && !c.element_id().is_some_and(|e| element_ids.contains(e))
                });
            }
            Ok(())
        }
        FormOp::MovePage { page_id, to_index } => {
            let Some(from) = form.page_index(page_id) else {
                return Err(not_found_page(page_id));
            };
            let pages = form.pages_mut();
            let page = pages.remove(from);
            let to = (*to_index).min(pages.len());
            pages.insert(to, page);
            if from != to {
                delta.record_updated(FormObjectRef::page(page_id));
            }
            Ok(())
        }
        FormOp::AddElement { page_id, element, index } => {
            if form.contains_element(element.id()) {
                return Err(ApplyError::AlreadyExists {
                    kind: ObjectKind::Element,
                    id: element.id().to_string(),
                });
            }
            let elements = existing_page_mut(form, page_id)?.elements_mut();
            let at = index.unwrap_or(elements.len()).min(elements.len());
            elements.insert(at, element.clone());
            delta.record_added(FormObjectRef::element(page_id, element.id()));
            Ok(())
        }
        FormOp::UpdateElement { page_id, element_id, patch } => {
            let page = existing_page_mut(form, page_id)?;
            let Some(element) = page.element_mut(element_id) else {
                return Err(not_found_element(element_id));
            };
            if let Some(title) = &patch.title {
                element.set_title(title.clone());
            }
            if let Some(required) = patch.required {
                element.set_required(required);
            }
            if let Some(styles) = &patch.styles {
                *element.styles_mut() = styles.clone();
            }
            if let Some(kind) = &patch.kind {
                element.set_kind(kind.clone());
            }
            delta.record_updated(FormObjectRef::element(page_id, element_id));
            Ok(())
        }
        FormOp::RemoveElement { page_id, element_id, policy } => {
            let elements = existing_page_mut(form, page_id)?.elements_mut();
            let Some(index) = elements.iter().position(|e| e.id() == element_id) else {
                return Err(not_found_element(element_id));
            };
            elements.remove(index);
            delta.record_removed(FormObjectRef::element(page_id, element_id));

            if *policy == StaleConditionPolicy::Cascade {
                retain_conditions(form, delta, |c| c.element_id() != Some(element_id));
            }
            Ok(())
        }
        FormOp::MoveElement { page_id, element_id, to_index } => {
            let elements = existing_page_mut(form, page_id)?.elements_mut();
            let Some(from) = elements.iter().position(|e| e.id() == element_id) else {
                return Err(not_found_element(element_id));
            };
            let element = elements.remove(from);
            let to = (*to_index).min(elements.len());
            elements.insert(to, element);
            if from != to {
                delta.record_updated(FormObjectRef::element(page_id, element_id));
            }
            Ok(())
        }
    }
}

fn retain_conditions(
    form: &mut FormDocument,
    delta: &mut DeltaBuilder,
    keep: impl Fn(&Condition) -> bool,
) {
    let removed = form
        .conditions()
        .iter()
        .filter(|c| !keep(*c))
        .map(|c| c.id().clone())
        .collect::<Vec<_>>();
    form.conditions_mut().retain(|c| keep(c));
    for condition_id in removed {
        delta.record_removed(FormObjectRef::condition(&condition_id));
    }
}

fn existing_page_mut<'a>(
    form: &'a mut FormDocument,
    page_id: &PageId,
) -> Result<&'a mut Page, ApplyError> {
    form.page_mut(page_id).ok_or_else(|| not_found_page(page_id))
}

fn not_found_page(page_id: &PageId) -> ApplyError {
    ApplyError::NotFound { kind: ObjectKind::Page, id: page_id.to_string() }
}

fn not_found_element(element_id: &ElementId) -> ApplyError {
    ApplyError::NotFound { kind: ObjectKind::Element, id: element_id.to_string() }
}
