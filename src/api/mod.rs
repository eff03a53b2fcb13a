// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON-over-HTTP access to the forms of a [`Workspace`].
//!
//! Every route works on the same shared state the TUI edits, so changes made here show up in
//! the terminal on its next refresh and vice versa.

mod types;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::format::mermaid::export_mermaid;
use crate::model::{ConditionId, FormDocument, FormId, PageId};
use crate::ops::{ApplyError, ApplyResult, FormOp};
use crate::projection::{project_form, ProjectionOptions};
use crate::query::{condition_issues, dead_end_pages, resolve_next, unreachable_pages};
use crate::workspace::{Workspace, WorkspaceError, WorkspaceState};

pub use types::{
    ApplyOpsRequest, ConditionResponse, DeleteConditionResponse, DeleteFormResponse, ErrorBody,
    GraphQuery, GraphResponse, IssuesResponse, ListFormsResponse, NavigateRequest,
    NavigateResponse, SchemaResponse, SetSourcePageRequest, UiSelectionResponse,
    UpdateConditionRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error("page not found (id={page_id})")]
    PageNotFound { page_id: PageId },
    #[error(transparent)]
    Body(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Workspace(err) => match err {
                WorkspaceError::FormNotFound { .. } | WorkspaceError::ConditionNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                WorkspaceError::NoPages { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                WorkspaceError::FormIdMismatch { .. } | WorkspaceError::InvalidForm(_) => {
                    StatusCode::BAD_REQUEST
                }
                WorkspaceError::Apply(ApplyError::Conflict { .. })
                | WorkspaceError::Apply(ApplyError::AlreadyExists { .. }) => StatusCode::CONFLICT,
                WorkspaceError::Apply(ApplyError::NotFound { .. }) => StatusCode::NOT_FOUND,
                WorkspaceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::PageNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Body(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(workspace: Workspace) -> Router {
    Router::new()
        .route("/api/schema", get(schema))
        .route("/api/ui", get(ui_selection))
        .route("/api/forms", get(list_forms))
        .route("/api/forms/{form_id}", get(get_form).put(put_form).delete(delete_form))
        .route("/api/forms/{form_id}/ops", post(apply_ops))
        .route("/api/forms/{form_id}/conditions", post(add_condition))
        .route(
            "/api/forms/{form_id}/conditions/{condition_id}",
            axum::routing::patch(update_condition).delete(delete_condition),
        )
        .route(
            "/api/forms/{form_id}/conditions/{condition_id}/source-page",
            put(set_condition_source_page),
        )
        .route("/api/forms/{form_id}/graph", get(graph))
        .route("/api/forms/{form_id}/issues", get(issues))
        .route("/api/forms/{form_id}/mermaid", get(mermaid))
        .route("/api/forms/{form_id}/navigate", post(navigate))
        .with_state(workspace)
}

async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse::generate())
}

async fn ui_selection(State(workspace): State<Workspace>) -> Json<UiSelectionResponse> {
    let Some(ui_state) = workspace.ui_state() else {
        return Json(UiSelectionResponse {
            active_form_id: None,
            active_condition_id: None,
            forms_rev: 0,
        });
    };
    let ui_state = ui_state.lock().await;
    Json(UiSelectionResponse {
        active_form_id: ui_state.active_form_id().cloned(),
        active_condition_id: ui_state.active_condition_id().cloned(),
        forms_rev: ui_state.forms_rev(),
    })
}

async fn list_forms(State(workspace): State<Workspace>) -> ApiResult<Json<ListFormsResponse>> {
    let forms = workspace.lock().await.list()?;
    Ok(Json(ListFormsResponse { forms }))
}

async fn get_form(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
) -> ApiResult<Json<FormDocument>> {
    let form = workspace.lock().await.form(&form_id)?.clone();
    Ok(Json(form))
}

async fn put_form(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
    body: Result<Json<FormDocument>, JsonRejection>,
) -> ApiResult<Json<FormDocument>> {
    let Json(form) = body?;
    if form.id() != &form_id {
        return Err(WorkspaceError::FormIdMismatch { expected: form_id, found: form.id().clone() }
            .into());
    }

    let stored = workspace.lock().await.put(form)?.clone();
    tracing::info!(form_id = %form_id, rev = stored.rev(), "replaced form");
    workspace.notify_forms_changed().await;
    Ok(Json(stored))
}

async fn delete_form(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
) -> ApiResult<Json<DeleteFormResponse>> {
    let deleted = workspace.lock().await.delete(&form_id)?;
    if !deleted {
        return Err(WorkspaceError::FormNotFound { form_id }.into());
    }

    tracing::info!(form_id = %form_id, "deleted form");
    workspace.notify_forms_changed().await;
    Ok(Json(DeleteFormResponse { form_id, deleted }))
}

async fn apply_ops(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
    body: Result<Json<ApplyOpsRequest>, JsonRejection>,
) -> ApiResult<Json<ApplyResult>> {
    let Json(request) = body?;
    let result = workspace.lock().await.apply(&form_id, request.base_rev, &request.ops)?;
    if result.applied > 0 {
        workspace.notify_forms_changed().await;
    }
    Ok(Json(result))
}

async fn add_condition(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
) -> ApiResult<(StatusCode, Json<ConditionResponse>)> {
    let response = {
        let mut state = workspace.lock().await;
        let mut added = None;
        state.apply_current(&form_id, |form| {
            if form.pages().is_empty() {
                tracing::warn!(form_id = %form_id, "add condition refused: form has no pages");
                return Err(WorkspaceError::NoPages { form_id: form_id.clone() });
            }
            let condition_id = form.id_allocator().condition_id();
            added = Some(condition_id.clone());
            Ok(vec![FormOp::AddCondition { condition_id }])
        })?;
        let Some(condition_id) = added else {
            return Err(WorkspaceError::NoPages { form_id }.into());
        };
        condition_response(&mut state, &form_id, &condition_id)?
    };

    workspace.notify_forms_changed().await;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_condition(
    State(workspace): State<Workspace>,
    Path((form_id, condition_id)): Path<(FormId, ConditionId)>,
    body: Result<Json<UpdateConditionRequest>, JsonRejection>,
) -> ApiResult<Json<ConditionResponse>> {
    let Json(request) = body?;
    let response = {
        let mut state = workspace.lock().await;
        state.apply_current(&form_id, |form| {
            require_condition(form, &condition_id)?;
            Ok(vec![FormOp::UpdateCondition {
                condition_id: condition_id.clone(),
                field: request.field,
                value: request.value,
            }])
        })?;
        condition_response(&mut state, &form_id, &condition_id)?
    };

    workspace.notify_forms_changed().await;
    Ok(Json(response))
}

async fn set_condition_source_page(
    State(workspace): State<Workspace>,
    Path((form_id, condition_id)): Path<(FormId, ConditionId)>,
    body: Result<Json<SetSourcePageRequest>, JsonRejection>,
) -> ApiResult<Json<ConditionResponse>> {
    let Json(request) = body?;
    let response = {
        let mut state = workspace.lock().await;
        state.apply_current(&form_id, |form| {
            require_condition(form, &condition_id)?;
            Ok(vec![FormOp::SetConditionSourcePage {
                condition_id: condition_id.clone(),
                page_id: request.page_id,
            }])
        })?;
        condition_response(&mut state, &form_id, &condition_id)?
    };

    workspace.notify_forms_changed().await;
    Ok(Json(response))
}

async fn delete_condition(
    State(workspace): State<Workspace>,
    Path((form_id, condition_id)): Path<(FormId, ConditionId)>,
) -> ApiResult<Json<DeleteConditionResponse>> {
    let result = workspace.lock().await.apply_current(&form_id, |form| {
        require_condition(form, &condition_id)?;
        Ok(vec![FormOp::RemoveCondition { condition_id: condition_id.clone() }])
    })?;

    workspace.notify_forms_changed().await;
    Ok(Json(DeleteConditionResponse { rev: result.new_rev, condition_id }))
}

async fn graph(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
    Query(query): Query<GraphQuery>,
) -> ApiResult<Json<GraphResponse>> {
    let mut state = workspace.lock().await;
    let options = effective_options(&state, &query);
    let form = state.form(&form_id)?;
    Ok(Json(GraphResponse {
        rev: form.rev(),
        fallthrough_edges: options.fallthrough_edges,
        graph: project_form(form, options),
        dead_end_pages: dead_end_pages(form, options),
        unreachable_pages: unreachable_pages(form, options),
    }))
}

async fn issues(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
) -> ApiResult<Json<IssuesResponse>> {
    let mut state = workspace.lock().await;
    let form = state.form(&form_id)?;
    Ok(Json(IssuesResponse { rev: form.rev(), conditions: condition_issues(form) }))
}

async fn mermaid(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
    Query(query): Query<GraphQuery>,
) -> ApiResult<String> {
    let mut state = workspace.lock().await;
    let options = effective_options(&state, &query);
    let form = state.form(&form_id)?;
    Ok(export_mermaid(&project_form(form, options)))
}

async fn navigate(
    State(workspace): State<Workspace>,
    Path(form_id): Path<FormId>,
    body: Result<Json<NavigateRequest>, JsonRejection>,
) -> ApiResult<Json<NavigateResponse>> {
    let Json(request) = body?;
    let mut state = workspace.lock().await;
    let form = state.form(&form_id)?;
    if form.page(&request.current_page_id).is_none() {
        return Err(ApiError::PageNotFound { page_id: request.current_page_id });
    }

    let next = resolve_next(form, &request.current_page_id, &request.answers);
    let end_of_form = next.page_id.is_none();
    Ok(Json(NavigateResponse { next, end_of_form }))
}

fn effective_options(state: &WorkspaceState, query: &GraphQuery) -> ProjectionOptions {
    match query.fallthrough {
        Some(fallthrough_edges) => ProjectionOptions { fallthrough_edges },
        None => state.projection_options(),
    }
}

fn require_condition(
    form: &FormDocument,
    condition_id: &ConditionId,
) -> Result<(), WorkspaceError> {
    if form.condition(condition_id).is_none() {
        return Err(WorkspaceError::ConditionNotFound { condition_id: condition_id.clone() });
    }
    Ok(())
}

fn condition_response(
    state: &mut WorkspaceState,
    form_id: &FormId,
    condition_id: &ConditionId,
) -> Result<ConditionResponse, WorkspaceError> {
    let form = state.form(form_id)?;
    let condition = form
        .condition(condition_id)
        .cloned()
        .ok_or_else(|| WorkspaceError::ConditionNotFound { condition_id: condition_id.clone() })?;
    Ok(ConditionResponse { rev: form.rev(), condition })
}
