//! HTTP surface: routes, shared state and request shape checks.

mod group;
mod routine;
mod teacher;

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{Next, from_fn},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use faculty::{
    db::AppDbPool,
    http::middleware::{response_mapper_layer, trace_layer},
};
use tracing::Instrument;

use crate::{
    error::{EntityKind, Error, Result},
    infra::{
        RoutineRepositoryImpl, StudyGroupRepositoryImpl, TeacherRepositoryImpl,
    },
    service::{
        RoutineService, RoutineServiceImpl, StudyGroupService,
        StudyGroupServiceImpl, TeacherService, TeacherServiceImpl,
    },
    validation::is_id_invalid,
};

#[derive(Clone)]
pub struct AppState {
    pub teachers: Arc<dyn TeacherService>,
    pub groups: Arc<dyn StudyGroupService>,
    pub routines: Arc<dyn RoutineService>,
}

impl AppState {
    /// Wires the sqlite-backed services onto `pool`.
    pub fn new(pool: AppDbPool) -> Self {
        let teacher_repo = Arc::new(TeacherRepositoryImpl);
        let group_repo = Arc::new(StudyGroupRepositoryImpl);
        Self {
            teachers: Arc::new(TeacherServiceImpl::new(
                pool.clone(),
                teacher_repo.clone(),
            )),
            groups: Arc::new(StudyGroupServiceImpl::new(
                pool.clone(),
                group_repo.clone(),
            )),
            routines: Arc::new(RoutineServiceImpl::new(
                pool,
                Arc::new(RoutineRepositoryImpl),
                teacher_repo,
                group_repo,
            )),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/teachers", get(teacher::list).post(teacher::create))
        .route(
            "/api/teachers/{id}",
            get(teacher::fetch).put(teacher::update).delete(teacher::delete),
        )
        .route("/api/teacher/workload", get(routine::teacher_workload))
        .route("/api/groups", get(group::list).post(group::create))
        .route(
            "/api/groups/{id}",
            get(group::fetch).put(group::update).delete(group::delete),
        )
        .route("/api/group/workload", get(routine::group_workload))
        .route("/api/routines", get(routine::list))
        .route("/api/routine", post(routine::create))
        .route(
            "/api/routine/{id}",
            get(routine::fetch).put(routine::update).delete(routine::delete),
        )
        .with_state(state)
        .layer(from_fn(contain_panics))
        .layer(from_fn(response_mapper_layer))
        .layer(from_fn(trace_layer))
}

/// Rejects identifiers that can never name a stored record.
fn require_id(id: Option<i64>, entity: EntityKind) -> Result<i64> {
    match id {
        Some(id) if !is_id_invalid(Some(id)) => Ok(id),
        _ => Err(Error::IdInvalid { entity }),
    }
}

/// Runs the rest of the request on its own task so a panicking handler
/// answers with `Unclassified` instead of dropping the connection.
async fn contain_panics(request: Request, next: Next) -> Response {
    let failure = match tokio::spawn(next.run(request).in_current_span()).await
    {
        Ok(response) => return response,
        Err(e) if e.is_panic() => {
            let payload = e.into_panic();
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string payload".to_owned());
            anyhow::anyhow!("request handler panicked: {detail}")
        }
        Err(e) => anyhow::anyhow!("request handler was cancelled: {e}"),
    };
    Error::Unclassified(faculty::Error::Internal(failure)).into_response()
}
