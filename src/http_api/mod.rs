use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::enrollment::{self, EnrollmentError};
use crate::persistence::{MemoryStore, PersistenceError, SectionStore, TimetableStore};
use crate::section::{NewSection, Section, SectionStatus};
use crate::timetable::TimetableEntry;
use crate::weekly::{self, DaySummary, DayView};

pub trait RecordStore: SectionStore + TimetableStore {}

impl<T: SectionStore + TimetableStore> RecordStore for T {}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new<S: RecordStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn with_shared(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Invalid(&'static str, String),
    Internal(String),
}

impl ApiError {
    fn section_not_found(id: Uuid) -> Self {
        ApiError::NotFound("not_found", format!("section {id} not found"))
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid("invalid_request", message.into())
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(value: EnrollmentError) -> Self {
        let kind = value.kind();
        match value {
            EnrollmentError::NotEnrolled { .. } => ApiError::NotFound(kind, value.to_string()),
            EnrollmentError::CapacityExceeded { .. }
            | EnrollmentError::SectionInactive { .. }
            | EnrollmentError::DuplicateEnrollment { .. } => {
                ApiError::Conflict(kind, value.to_string())
            }
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Enrollment(err) => ApiError::from(err),
            PersistenceError::SectionNotFound(id) => ApiError::section_not_found(id),
            PersistenceError::Timetable(err) => ApiError::Invalid(err.kind(), err.to_string()),
            PersistenceError::InvalidData(message) => ApiError::invalid(message),
            other => {
                error!("record store failure: {other}");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(kind, message) => (StatusCode::NOT_FOUND, kind, message),
            ApiError::Conflict(kind, message) => (StatusCode::CONFLICT, kind, message),
            ApiError::Invalid(kind, message) => (StatusCode::BAD_REQUEST, kind, message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: SectionStatus,
}

#[derive(Debug, Deserialize)]
struct EnrollPayload {
    student_id: String,
}

/// Grouped week returned for a student's timetable.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimetableResponse {
    pub student_id: String,
    pub days: Vec<DayView>,
    pub week: DaySummary,
    pub week_label: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sections", get(list_sections).post(create_section))
        .route("/sections/:id", get(get_section).delete(delete_section))
        .route("/sections/:id/status", put(set_section_status))
        .route("/sections/:id/students", post(enroll_student))
        .route("/sections/:id/students/:student_id", delete(unenroll_student))
        .route(
            "/students/:id/timetable",
            get(get_timetable).put(replace_timetable),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("school-schedule HTTP API listening on http://{addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_sections(State(state): State<AppState>) -> Result<Json<Vec<Section>>, ApiError> {
    info!("GET /sections");
    Ok(Json(state.store().list_sections()?))
}

async fn create_section(
    State(state): State<AppState>,
    Json(new): Json<NewSection>,
) -> Result<(StatusCode, Json<Section>), ApiError> {
    info!("POST /sections ({})", new.section_code);
    let section = Section::create(new).map_err(|err| ApiError::invalid(err.to_string()))?;
    state.store().insert_section(&section)?;
    Ok((StatusCode::CREATED, Json(section)))
}

async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Section>, ApiError> {
    info!("GET /sections/{id}");
    match state.store().get_section(id)? {
        Some(section) => Ok(Json(section)),
        None => Err(ApiError::section_not_found(id)),
    }
}

async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!("DELETE /sections/{id}");
    if !state.store().delete_section(id)? {
        return Err(ApiError::section_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn set_section_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Section>, ApiError> {
    info!("PUT /sections/{id}/status ({})", payload.status);
    let updated = state
        .store()
        .update_section(id, &|section| Ok(enrollment::set_status(section, payload.status)))?;
    Ok(Json(updated))
}

async fn enroll_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnrollPayload>,
) -> Result<Json<Section>, ApiError> {
    info!("POST /sections/{id}/students ({})", payload.student_id);
    let student_id = payload.student_id.trim();
    if student_id.is_empty() {
        return Err(ApiError::invalid("student_id must not be empty"));
    }
    let updated = state
        .store()
        .update_section(id, &|section| enrollment::enroll(section, student_id))?;
    Ok(Json(updated))
}

async fn unenroll_student(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(Uuid, String)>,
) -> Result<Json<Section>, ApiError> {
    info!("DELETE /sections/{id}/students/{student_id}");
    let updated = state
        .store()
        .update_section(id, &|section| enrollment::unenroll(section, &student_id))?;
    Ok(Json(updated))
}

async fn get_timetable(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<TimetableResponse>, ApiError> {
    info!("GET /students/{student_id}/timetable");
    let entries = state.store().timetable_for_student(&student_id)?;
    Ok(Json(timetable_response(student_id, entries)?))
}

async fn replace_timetable(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(entries): Json<Vec<TimetableEntry>>,
) -> Result<Json<TimetableResponse>, ApiError> {
    info!(
        "PUT /students/{student_id}/timetable ({} entries)",
        entries.len()
    );
    state.store().replace_timetable(&student_id, &entries)?;
    Ok(Json(timetable_response(student_id, entries)?))
}

fn timetable_response(
    student_id: String,
    entries: Vec<TimetableEntry>,
) -> Result<TimetableResponse, ApiError> {
    let week = weekly::group_by_day(entries)
        .map_err(|err| ApiError::Invalid(err.kind(), err.to_string()))?;
    let total = week.week_summary();
    Ok(TimetableResponse {
        student_id,
        days: week.day_views(),
        week: total,
        week_label: total.label(),
    })
}
