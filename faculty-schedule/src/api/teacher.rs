use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::{AppState, require_id};
use crate::{
    dto::TeacherDto,
    error::{EntityKind, Error, Result},
};

fn body(
    payload: std::result::Result<Json<TeacherDto>, JsonRejection>,
) -> Result<TeacherDto> {
    payload
        .map(|Json(teacher)| teacher)
        .map_err(|e| Error::RequiredFieldMissing {
            entity: EntityKind::Teacher,
            reason: e.body_text(),
        })
}

pub(super) async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherDto>>> {
    Ok(Json(state.teachers.find_all().await?))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TeacherDto>> {
    let id = require_id(Some(id), EntityKind::Teacher)?;
    Ok(Json(state.teachers.find_by_id(id).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TeacherDto>, JsonRejection>,
) -> Result<(StatusCode, Json<TeacherDto>)> {
    let teacher = body(payload)?;
    let saved = state.teachers.create(teacher).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<TeacherDto>, JsonRejection>,
) -> Result<Json<TeacherDto>> {
    let id = require_id(Some(id), EntityKind::Teacher)?;
    let teacher = body(payload)?;
    Ok(Json(state.teachers.update(id, teacher).await?))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let id = require_id(Some(id), EntityKind::Teacher)?;
    state.teachers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
