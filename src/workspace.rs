// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Forms shared between the TUI and the HTTP API.
//!
//! A [`Workspace`] owns the in-memory copies of every open form behind one async mutex. Each
//! mutation runs against a candidate copy, is persisted through the [`FormFolder`] (when there
//! is one), and only then replaces the cached form.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::model::{ConditionId, DuplicateIdError, FormDocument, FormId};
use crate::ops::{apply_ops, ApplyError, ApplyResult, FormOp};
use crate::projection::ProjectionOptions;
use crate::store::{FormFolder, StoreError};
use crate::ui::UiState;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("form not found (id={form_id})")]
    FormNotFound { form_id: FormId },
    #[error("condition not found (id={condition_id})")]
    ConditionNotFound { condition_id: ConditionId },
    #[error("form {form_id} has no pages")]
    NoPages { form_id: FormId },
    #[error("form id mismatch: path has {expected}, body has {found}")]
    FormIdMismatch { expected: FormId, found: FormId },
    #[error(transparent)]
    InvalidForm(#[from] DuplicateIdError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub form_id: FormId,
    pub title: String,
    pub rev: u64,
    pub pages: usize,
    pub conditions: usize,
}

impl FormSummary {
    fn of(form: &FormDocument) -> Self {
        Self {
            form_id: form.id().clone(),
            title: form.title().to_owned(),
            rev: form.rev(),
            pages: form.pages().len(),
            conditions: form.conditions().len(),
        }
    }
}

#[derive(Debug)]
pub struct WorkspaceState {
    forms: BTreeMap<FormId, FormDocument>,
    folder: Option<FormFolder>,
    projection: ProjectionOptions,
}

impl WorkspaceState {
    /// A state that never touches the disk (demo mode, tests).
    pub fn in_memory(forms: impl IntoIterator<Item = FormDocument>) -> Self {
        Self {
            forms: forms.into_iter().map(|form| (form.id().clone(), form)).collect(),
            folder: None,
            projection: ProjectionOptions::default(),
        }
    }

    pub fn persistent(folder: FormFolder) -> Self {
        Self {
            forms: BTreeMap::new(),
            folder: Some(folder),
            projection: ProjectionOptions::default(),
        }
    }

    /// Seeds the cache with an already loaded form.
    pub fn with_form(mut self, form: FormDocument) -> Self {
        self.forms.insert(form.id().clone(), form);
        self
    }

    pub fn with_projection_options(mut self, projection: ProjectionOptions) -> Self {
        self.projection = projection;
        self
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        self.projection
    }

    pub fn set_projection_options(&mut self, projection: ProjectionOptions) {
        self.projection = projection;
    }

    pub fn folder(&self) -> Option<&FormFolder> {
        self.folder.as_ref()
    }

    /// Returns the form, loading it from disk on first access.
    pub fn form(&mut self, form_id: &FormId) -> Result<&FormDocument, WorkspaceError> {
        self.ensure_loaded(form_id)?;
        self.forms
            .get(form_id)
            .ok_or_else(|| WorkspaceError::FormNotFound { form_id: form_id.clone() })
    }

    /// Cached forms plus every form stored on disk, sorted by id.
    pub fn list(&mut self) -> Result<Vec<FormSummary>, WorkspaceError> {
        let mut ids = self.forms.keys().cloned().collect::<BTreeSet<_>>();
        if let Some(folder) = &self.folder {
            ids.extend(folder.list_forms()?);
        }

        let mut summaries = Vec::with_capacity(ids.len());
        for form_id in ids {
            match self.form(&form_id) {
                Ok(form) => summaries.push(FormSummary::of(form)),
                Err(err) => {
                    tracing::warn!(form_id = %form_id, error = %err, "skipping unreadable form");
                }
            }
        }
        Ok(summaries)
    }

    /// Replaces the whole document (last write wins). Documents with repeated ids are refused.
    ///
    /// The stored revision continues from the replaced document, so clients holding the old
    /// revision see a conflict on their next ops batch.
    pub fn put(&mut self, mut form: FormDocument) -> Result<&FormDocument, WorkspaceError> {
        form.check_unique_ids()?;
        let form_id = form.id().clone();
        let previous_rev = match self.ensure_loaded(&form_id) {
            Ok(()) => self.forms.get(&form_id).map(FormDocument::rev),
            Err(WorkspaceError::FormNotFound { .. }) => None,
            Err(err) => return Err(err),
        };
        if let Some(rev) = previous_rev {
            form.set_rev(rev.max(form.rev()).saturating_add(1));
        }

        self.commit(form)?;
        self.form(&form_id)
    }

    pub fn delete(&mut self, form_id: &FormId) -> Result<bool, WorkspaceError> {
        let cached = self.forms.remove(form_id).is_some();
        let stored = match &self.folder {
            Some(folder) => folder.delete_form(form_id)?,
            None => false,
        };
        Ok(cached || stored)
    }

    /// Applies an ops batch gated by `base_rev`.
    pub fn apply(
        &mut self,
        form_id: &FormId,
        base_rev: u64,
        ops: &[FormOp],
    ) -> Result<ApplyResult, WorkspaceError> {
        let mut candidate = self.form(form_id)?.clone();
        let result = apply_ops(&mut candidate, base_rev, ops)?;
        if result.applied > 0 {
            self.commit(candidate)?;
        }
        Ok(result)
    }

    /// Applies ops built from the current document, against its current revision.
    pub fn apply_current(
        &mut self,
        form_id: &FormId,
        build: impl FnOnce(&FormDocument) -> Result<Vec<FormOp>, WorkspaceError>,
    ) -> Result<ApplyResult, WorkspaceError> {
        let form = self.form(form_id)?;
        let base_rev = form.rev();
        let ops = build(form)?;
        self.apply(form_id, base_rev, &ops)
    }

    /// Writes the cached form to disk again. A no-op without a form folder.
    pub fn save(&mut self, form_id: &FormId) -> Result<(), WorkspaceError> {
        self.ensure_loaded(form_id)?;
        let form = self
            .forms
            .get(form_id)
            .ok_or_else(|| WorkspaceError::FormNotFound { form_id: form_id.clone() })?;
        if let Some(folder) = &self.folder {
            folder.save_form(form)?;
        }
        Ok(())
    }

    fn ensure_loaded(&mut self, form_id: &FormId) -> Result<(), WorkspaceError> {
        if self.forms.contains_key(form_id) {
            return Ok(());
        }
        let Some(folder) = &self.folder else {
            return Err(WorkspaceError::FormNotFound { form_id: form_id.clone() });
        };
        match folder.load_form(form_id) {
            Ok(form) => {
                self.forms.insert(form_id.clone(), form);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                Err(WorkspaceError::FormNotFound { form_id: form_id.clone() })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn commit(&mut self, form: FormDocument) -> Result<(), WorkspaceError> {
        if let Some(folder) = &self.folder {
            folder.save_form(&form)?;
        }
        self.forms.insert(form.id().clone(), form);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    state: Arc<Mutex<WorkspaceState>>,
    ui_state: Option<Arc<Mutex<UiState>>>,
}

impl Workspace {
    pub fn new(state: WorkspaceState) -> Self {
        Self { state: Arc::new(Mutex::new(state)), ui_state: None }
    }

    pub fn with_ui_state(mut self, ui_state: Arc<Mutex<UiState>>) -> Self {
        self.ui_state = Some(ui_state);
        self
    }

    pub fn ui_state(&self) -> Option<&Arc<Mutex<UiState>>> {
        self.ui_state.as_ref()
    }

    pub async fn lock(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state.lock().await
    }

    /// Locks from a thread outside the async runtime (the TUI thread).
    pub fn blocking_lock(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state.blocking_lock()
    }

    pub async fn notify_forms_changed(&self) {
        if let Some(ui_state) = &self.ui_state {
            ui_state.lock().await.bump_forms_rev();
        }
    }

    pub fn blocking_notify_forms_changed(&self) {
        if let Some(ui_state) = &self.ui_state {
            ui_state.blocking_lock().bump_forms_rev();
        }
    }
}

#[cfg(test)]
mod tests;
