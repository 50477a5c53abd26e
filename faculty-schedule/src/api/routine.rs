use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{AppState, require_id};
use crate::{
    dto::RoutineDto,
    error::{EntityKind, Error, Result},
    validation::is_blank,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TeacherWorkloadParams {
    teacher_name: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GroupWorkloadParams {
    group_id: Option<i64>,
}

fn body(
    payload: std::result::Result<Json<RoutineDto>, JsonRejection>,
) -> Result<RoutineDto> {
    payload
        .map(|Json(routine)| routine)
        .map_err(|e| Error::RequiredFieldMissing {
            entity: EntityKind::Routine,
            reason: e.body_text(),
        })
}

fn workload_params<T>(
    params: std::result::Result<Query<T>, QueryRejection>,
) -> Result<T> {
    params
        .map(|Query(params)| params)
        .map_err(|e| Error::AggregationInputInvalid(e.body_text()))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(value) if !is_blank(Some(value)) => Ok(value),
        _ => Err(Error::AggregationInputInvalid(format!("{name} is required"))),
    }
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        Error::AggregationInputInvalid(format!("{name} `{value}`: {e}"))
    })
}

pub(super) async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoutineDto>>> {
    Ok(Json(state.routines.get_all().await?))
}

pub(super) async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RoutineDto>> {
    let id = require_id(Some(id), EntityKind::Routine)?;
    Ok(Json(state.routines.get_by_id(id).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RoutineDto>, JsonRejection>,
) -> Result<(StatusCode, Json<RoutineDto>)> {
    let routine = body(payload)?;
    let saved = state.routines.create(routine).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<RoutineDto>, JsonRejection>,
) -> Result<Json<RoutineDto>> {
    let id = require_id(Some(id), EntityKind::Routine)?;
    let routine = body(payload)?;
    Ok(Json(state.routines.update(id, routine).await?))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let id = require_id(Some(id), EntityKind::Routine)?;
    state.routines.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn teacher_workload(
    State(state): State<AppState>,
    params: std::result::Result<Query<TeacherWorkloadParams>, QueryRejection>,
) -> Result<Json<i64>> {
    let params = workload_params(params)?;
    let teacher_name = required(params.teacher_name.as_deref(), "teacherName")?;
    let start = parse_date(
        required(params.start_date.as_deref(), "startDate")?,
        "startDate",
    )?;
    let end =
        parse_date(required(params.end_date.as_deref(), "endDate")?, "endDate")?;

    let hours = state
        .routines
        .calculate_teacher_workload(teacher_name, start, end)
        .await?;
    Ok(Json(hours))
}

pub(super) async fn group_workload(
    State(state): State<AppState>,
    params: std::result::Result<Query<GroupWorkloadParams>, QueryRejection>,
) -> Result<Json<i64>> {
    let params = workload_params(params)?;
    let group_id = require_id(params.group_id, EntityKind::Group)?;
    Ok(Json(state.routines.calculate_group_workload(group_id).await?))
}
