use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::{AppState, require_id};
use crate::{
    dto::StudyGroupDto,
    error::{EntityKind, Error, Result},
};

fn body(
    payload: std::result::Result<Json<StudyGroupDto>, JsonRejection>,
) -> Result<StudyGroupDto> {
    payload
        .map(|Json(group)| group)
        .map_err(|e| Error::RequiredFieldMissing {
            entity: EntityKind::Group,
            reason: e.body_text(),
        })
}

pub(super) async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudyGroupDto>>> {
    Ok(Json(state.groups.find_all().await?))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudyGroupDto>> {
    let id = require_id(Some(id), EntityKind::Group)?;
    Ok(Json(state.groups.find_by_id(id).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StudyGroupDto>, JsonRejection>,
) -> Result<(StatusCode, Json<StudyGroupDto>)> {
    let group = body(payload)?;
    let saved = state.groups.create(group).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<StudyGroupDto>, JsonRejection>,
) -> Result<Json<StudyGroupDto>> {
    let id = require_id(Some(id), EntityKind::Group)?;
    let group = body(payload)?;
    Ok(Json(state.groups.update(id, group).await?))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let id = require_id(Some(id), EntityKind::Group)?;
    state.groups.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
