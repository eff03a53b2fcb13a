// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared UI state for cross-component coordination.
//!
//! This lightweight state propagates the editor's selection to the HTTP API and lets the TUI
//! notice form changes made over HTTP without diffing documents.

use crate::model::{ConditionId, FormId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    rev: u64,
    active_form_id: Option<FormId>,
    active_condition_id: Option<ConditionId>,
    forms_rev: u64,
}

impl UiState {
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn active_form_id(&self) -> Option<&FormId> {
        self.active_form_id.as_ref()
    }

    pub fn active_condition_id(&self) -> Option<&ConditionId> {
        self.active_condition_id.as_ref()
    }

    /// Bumped whenever any form in the workspace changes.
    pub fn forms_rev(&self) -> u64 {
        self.forms_rev
    }

    pub fn set_selection(
        &mut self,
        active_form_id: Option<FormId>,
        active_condition_id: Option<ConditionId>,
    ) {
        if self.active_form_id == active_form_id && self.active_condition_id == active_condition_id
        {
            return;
        }

        self.active_form_id = active_form_id;
        self.active_condition_id = active_condition_id;
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn bump_forms_rev(&mut self) {
        self.forms_rev = self.forms_rev.wrapping_add(1);
        self.rev = self.rev.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::UiState;
    use crate::model::fixtures::cid;
    use crate::model::FormId;

    #[test]
    fn selection_changes_bump_rev_once() {
        let mut state = UiState::default();
        let form_id = FormId::new("f").expect("form id");

        state.set_selection(Some(form_id.clone()), Some(cid("c1")));
        assert_eq!(state.rev(), 1);
        state.set_selection(Some(form_id), Some(cid("c1")));
        assert_eq!(state.rev(), 1);
        assert_eq!(state.active_condition_id().map(|id| id.as_str()), Some("c1"));
    }

    #[test]
    fn forms_rev_bumps_both_counters() {
        let mut state = UiState::default();
        state.bump_forms_rev();
        assert_eq!((state.rev(), state.forms_rev()), (1, 1));
    }
}
