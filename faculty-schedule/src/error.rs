use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveTime;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Teacher,
    Group,
    Routine,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Teacher => "teacher",
            EntityKind::Group => "group",
            EntityKind::Routine => "routine",
        })
    }
}

/// How a teacher was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeacherRef {
    Id(i64),
    Name(String),
}

impl fmt::Display for TeacherRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeacherRef::Id(id) => write!(f, "id: {id}"),
            TeacherRef::Name(name) => write!(f, "name: {name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Id is not valid or defined for {entity}")]
    IdInvalid { entity: EntityKind },

    #[error("Teacher not found with {0}")]
    TeacherNotFound(TeacherRef),

    #[error("Group not found with id: {0}")]
    GroupNotFound(i64),

    #[error("Routine not found with id: {0}")]
    RoutineNotFound(i64),

    #[error("{entity} resource is missing or unreadable: {reason}")]
    RequiredFieldMissing { entity: EntityKind, reason: String },

    #[error("Invalid workload parameters: {0}")]
    AggregationInputInvalid(String),

    #[error("Routine end time {end} must be after start time {start}")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("Error while accessing {entity} records: {source}")]
    Storage {
        entity: EntityKind,
        #[source]
        source: faculty::Error,
    },

    #[error("Internal Server Error: {0}")]
    Unclassified(#[from] faculty::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Every domain fault is reported as not found; only faults nothing
    /// classified become a server error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IdInvalid { .. }
            | Error::TeacherNotFound(_)
            | Error::GroupNotFound(_)
            | Error::RoutineNotFound(_)
            | Error::RequiredFieldMissing { .. }
            | Error::AggregationInputInvalid(_)
            | Error::InvalidTimeRange { .. }
            | Error::Storage { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::warn!(%message, "request failed");
        }
        (status, Json(serde_json::json!({ "message": message })))
            .into_response()
    }
}

/// Tags a framework failure with the entity it happened on.
pub trait StorageContext<T> {
    fn storage(self, entity: EntityKind) -> Result<T>;
}

impl<T> StorageContext<T> for faculty::Result<T> {
    fn storage(self, entity: EntityKind) -> Result<T> {
        self.map_err(|source| Error::Storage { entity, source })
    }
}
