// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::format::mermaid::export_mermaid;
use crate::model::{DuplicateIdError, FormDocument, FormId, Page};
use crate::projection::{project_form, ProjectionOptions};

const FORMS_DIR: &str = "forms";
const FORM_JSON_SUFFIX: &str = ".form.json";
const FORM_MERMAID_SUFFIX: &str = ".mmd";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("form file {path:?} holds form {found}, expected {expected}")]
    FormIdMismatch { path: PathBuf, expected: FormId, found: FormId },
    #[error("invalid form file {path:?}: {source}")]
    InvalidForm {
        path: PathBuf,
        #[source]
        source: DuplicateIdError,
    },
    #[error("invalid relative path for {field}: {value:?}")]
    InvalidRelativePath { field: &'static str, value: PathBuf },
    #[error("path is outside form folder: root={root:?} path={path:?}")]
    PathOutsideRoot { root: PathBuf, path: PathBuf },
    #[error("refusing to write through symlink at {path:?}")]
    SymlinkRefused { path: PathBuf },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Form documents on disk: `<root>/forms/<form-id>.form.json`, plus a Mermaid export of the
/// navigation graph next to each form.
///
/// Saving is last-write-wins. Two writers saving the same form race and the later rename wins.
#[derive(Debug, Clone)]
pub struct FormFolder {
    root: PathBuf,
    durability: WriteDurability,
    projection: ProjectionOptions,
}

impl FormFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
            projection: ProjectionOptions::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    /// Options used for the Mermaid side export.
    pub fn with_projection_options(mut self, projection: ProjectionOptions) -> Self {
        self.projection = projection;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn forms_dir(&self) -> PathBuf {
        self.root.join(FORMS_DIR)
    }

    pub fn form_json_path(&self, form_id: &FormId) -> PathBuf {
        let file_stem = encode_persisted_id_segment(form_id.as_str());
        self.forms_dir().join(format!("{file_stem}{FORM_JSON_SUFFIX}"))
    }

    /// Returns the path of the Mermaid export.
    ///
    /// This file is a best-effort export written after every successful save. A failed export
    /// never fails the save.
    pub fn form_mermaid_path(&self, form_id: &FormId) -> PathBuf {
        let file_stem = encode_persisted_id_segment(form_id.as_str());
        self.forms_dir().join(format!("{file_stem}{FORM_MERMAID_SUFFIX}"))
    }

    pub fn load_form(&self, form_id: &FormId) -> Result<FormDocument, StoreError> {
        let path = self.form_json_path(form_id);
        let raw = fs::read_to_string(&path)
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        let form: FormDocument = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;

        if form.id() != form_id {
            return Err(StoreError::FormIdMismatch {
                path,
                expected: form_id.clone(),
                found: form.id().clone(),
            });
        }

        form.check_unique_ids().map_err(|source| StoreError::InvalidForm { path, source })?;

        tracing::debug!(
            form_id = %form_id,
            rev = form.rev(),
            pages = form.pages().len(),
            conditions = form.conditions().len(),
            "loaded form"
        );
        Ok(form)
    }

    pub fn save_form(&self, form: &FormDocument) -> Result<(), StoreError> {
        let path = self.form_json_path(form.id());
        let mut json = serde_json::to_string_pretty(form)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        json.push('\n');
        write_atomic_in_root(&self.root, &path, json.as_bytes(), self.durability)?;
        tracing::info!(form_id = %form.id(), rev = form.rev(), path = ?path, "saved form");

        self.export_mermaid_best_effort(form);
        Ok(())
    }

    /// Loads `form_id`, or seeds and saves a fresh one-page form when it does not exist yet.
    pub fn load_or_init_form(&self, form_id: &FormId) -> Result<FormDocument, StoreError> {
        match self.load_form(form_id) {
            Ok(form) => Ok(form),
            Err(err) if err.is_not_found() => {
                let form = initial_form(form_id);
                self.save_form(&form)?;
                tracing::info!(form_id = %form_id, "initialized new form");
                Ok(form)
            }
            Err(err) => Err(err),
        }
    }

    /// Ids of all stored forms, sorted. A missing forms directory lists nothing.
    pub fn list_forms(&self) -> Result<Vec<FormId>, StoreError> {
        let dir = self.forms_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: dir.clone(), source })?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(FORM_JSON_SUFFIX))
            else {
                continue;
            };
            let Some(raw) = decode_persisted_id_segment(stem) else {
                tracing::warn!(file = %stem, "skipping form file with undecodable name");
                continue;
            };
            match FormId::new(raw) {
                Ok(form_id) => ids.push(form_id),
                Err(err) => tracing::warn!(file = %stem, error = %err, "skipping form file"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Removes the form and its Mermaid export. Returns whether the form existed.
    pub fn delete_form(&self, form_id: &FormId) -> Result<bool, StoreError> {
        let json_path = self.form_json_path(form_id);
        let existed = match fs::remove_file(&json_path) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(source) => return Err(StoreError::Io { path: json_path, source }),
        };

        let mmd_path = self.form_mermaid_path(form_id);
        if let Err(err) = fs::remove_file(&mmd_path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = ?mmd_path, error = %err, "cannot remove mermaid export");
            }
        }

        if existed {
            tracing::info!(form_id = %form_id, "deleted form");
        }
        Ok(existed)
    }

    fn export_mermaid_best_effort(&self, form: &FormDocument) {
        let path = self.form_mermaid_path(form.id());
        let mermaid = export_mermaid(&project_form(form, self.projection));
        let written = write_atomic_in_root(&self.root, &path, mermaid.as_bytes(), self.durability);
        if let Err(err) = written {
            tracing::warn!(form_id = %form.id(), error = %err, "mermaid export failed");
        }
    }
}

fn initial_form(form_id: &FormId) -> FormDocument {
    let mut form = FormDocument::new(form_id.clone(), "Untitled form");
    let mut ids = form.id_allocator();
    form.pages_mut().push(Page::new(ids.page_id(), "Page 1"));
    form
}

// Extracted filesystem helpers for `FormFolder`.
include!("form_folder/helpers.rs");

#[cfg(test)]
mod tests;
