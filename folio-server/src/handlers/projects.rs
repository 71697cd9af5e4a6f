use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

use folio_model::{Project, ProjectId};

use super::multipart::read_project_form;
use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Ids that do not parse can never match a project.
fn parse_project_id(raw: &str) -> AppResult<ProjectId> {
    raw.parse()
        .map_err(|_| AppError::not_found("Project not found"))
}

pub async fn list_projects(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list().await?))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Project>> {
    let id = parse_project_id(&id)?;
    Ok(Json(state.projects.get(id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Project>)> {
    let form = read_project_form(multipart).await?;
    let project = state.projects.create(form).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<Project>> {
    let id = parse_project_id(&id)?;
    let form = read_project_form(multipart).await?;
    Ok(Json(state.projects.update(id, form).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_project_id(&id)?;
    state.projects.delete(id).await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
