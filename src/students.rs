//! HTTP handlers for student records.
//!
//! Each handler is a thin mapping from an HTTP verb to store calls. The
//! response body is always JSON; failures carry `{ "message": ... }`.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::dashboard::build_dashboard;
use crate::downloader;
use crate::graph::{self, ChartKind};
use crate::loader::{self, ImportReport, ImportRow};
use crate::query::{self, SearchAttribute};
use crate::record::{Student, StudentPayload};
use crate::store::StudentStore;

/// `{ "message": ... }` body used by every non-list response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A failed request, rendered as a status code and a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    // Logs the underlying error; the client only sees `message`.
    fn internal(message: &str, error: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", message, error);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(MessageResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(MessageResponse {
            message: text.to_string(),
        }),
    )
        .into_response()
}

/// Query parameters accepted by the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub attribute: Option<String>,
    pub search: Option<String>,
}

/// Save a new student, overwriting any record with the same id
///
/// Every field, the id included, must be present.
///
/// # Arguments
/// * `store` - Backend to write to
/// * `payload` - The submitted record
///
/// # Returns
/// * `Result<String, ApiError>` - The saved id, or 400/500
pub async fn create_student(
    store: &dyn StudentStore,
    payload: &StudentPayload,
) -> Result<String, ApiError> {
    let id = match payload.id_text() {
        Some(id) if payload.missing_fields().is_empty() => id,
        _ => return Err(ApiError::bad_request("All fields are required")),
    };

    store
        .put_fields(&id, &payload.present_fields())
        .await
        .map_err(|e| ApiError::internal("Failed to save student", e))?;

    Ok(id)
}

/// Read every student, sorted by id
pub async fn load_students(store: &dyn StudentStore) -> Result<Vec<Student>, ApiError> {
    let hashes = store
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch students", e))?;

    let mut students: Vec<Student> = hashes
        .iter()
        .map(|(id, hash)| Student::from_hash(id, hash))
        .collect();
    query::sort_by_id(&mut students);

    Ok(students)
}

/// `POST /students`
pub async fn handle_create_student(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let id = create_student(state.store.as_ref(), &payload).await?;
    log::info!("Saved student {}", id);

    Ok(message(StatusCode::CREATED, "Student saved successfully"))
}

/// `GET /students/:id`
pub async fn handle_get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let hash = state
        .store
        .get(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch student", e))?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    Ok(Json(Student::from_hash(&id, &hash)))
}

/// `GET /students`, optionally filtered with `?attribute=...&search=...`
pub async fn handle_list_students(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = load_students(state.store.as_ref()).await?;

    let search = params.search.unwrap_or_default();
    if search.is_empty() {
        return Ok(Json(students));
    }

    let attribute = match params.attribute.as_deref() {
        Some(name) => name
            .parse::<SearchAttribute>()
            .map_err(ApiError::bad_request)?,
        None => SearchAttribute::default(),
    };

    Ok(Json(query::filter_students(&students, attribute, &search)))
}

/// `PUT /students/:id`
///
/// Only the fields present in the body are written. The id in the path
/// wins over any id in the body.
pub async fn handle_update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let fields = payload.present_fields();
    if fields.is_empty() {
        return Err(ApiError::bad_request(
            "At least one field is required to update",
        ));
    }

    let existing = state
        .store
        .get(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to update student", e))?;
    if existing.is_none() {
        return Err(ApiError::not_found("Student not found"));
    }

    state
        .store
        .put_fields(&id, &fields)
        .await
        .map_err(|e| ApiError::internal("Failed to update student", e))?;
    log::info!("Updated {} field(s) of student {}", fields.len(), id);

    Ok(message(StatusCode::OK, "Student updated successfully"))
}

/// `DELETE /students/:id`
pub async fn handle_delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .store
        .delete(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete student", e))?;
    log::info!("Deleted student {}", id);

    Ok(message(StatusCode::OK, "Student deleted successfully"))
}

// Pulls the `file` field out of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?;
        return Ok((filename, data));
    }

    Err(ApiError::bad_request("No file selected."))
}

async fn parse_upload(multipart: Multipart) -> Result<Vec<ImportRow>, ApiError> {
    let (filename, data) = read_upload(multipart).await?;

    loader::read_uploaded_csv(&filename, &data).map_err(|e| match e {
        crate::error::Error::InvalidFormat(_) => {
            ApiError::bad_request("Invalid file format. Please upload a CSV file.")
        }
        other => ApiError::bad_request(format!("Could not read CSV: {}", other)),
    })
}

/// Query parameters of the import preview
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// Return every parsed row instead of only the first few
    #[serde(default)]
    pub all: bool,
}

/// `POST /students/import/preview`
///
/// With `?all=true` the `rows` list holds every parsed row; the browser
/// uses that to send one create request per row.
pub async fn handle_import_preview(
    Query(params): Query<PreviewQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let rows = parse_upload(multipart).await?;

    let mut preview = loader::preview(&rows);
    if params.all {
        preview.rows = rows;
    }
    Ok(Json(preview).into_response())
}

/// `POST /students/import`
///
/// Rows are created one after another; the first failing row stops the
/// import and the rows before it stay saved.
pub async fn handle_import(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let rows = parse_upload(multipart).await?;
    let total = rows.len();

    for (index, row) in rows.iter().enumerate() {
        if let Err(e) = create_student(state.store.as_ref(), &row.to_payload()).await {
            log::warn!("Import stopped at row {}: {}", index + 1, e.message);
            let report = ImportReport {
                message: "Failed to upload file.".to_string(),
                created: index,
                total,
                failed_row: Some(index + 1),
                reason: Some(e.message),
            };
            return Ok((e.status, Json(report)).into_response());
        }
    }

    log::info!("Imported {} students", total);
    let report = ImportReport {
        message: "File uploaded successfully!".to_string(),
        created: total,
        total,
        failed_row: None,
        reason: None,
    };
    Ok((StatusCode::CREATED, Json(report)).into_response())
}

/// `GET /students/export/:format` with `csv` or `xlsx`
pub async fn handle_export(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let students = load_students(state.store.as_ref()).await?;

    let (content_type, body) = match format.as_str() {
        "csv" => {
            let csv = downloader::to_csv(&students)
                .map_err(|e| ApiError::internal("Failed to export students", e))?;
            ("text/csv; charset=utf-8", csv.into_bytes())
        }
        "xlsx" => {
            let xlsx = downloader::to_xlsx(&students)
                .map_err(|e| ApiError::internal("Failed to export students", e))?;
            (
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                xlsx,
            )
        }
        other => {
            return Err(ApiError::bad_request(format!(
                "Unsupported export format: {}",
                other
            )));
        }
    };

    let disposition = format!("attachment; filename=\"students.{}\"", format);
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// `GET /dashboard`
pub async fn handle_dashboard(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let students = load_students(state.store.as_ref()).await?;
    Ok(Json(build_dashboard(&students)).into_response())
}

/// `GET /dashboard/charts/:chart`
pub async fn handle_chart(
    State(state): State<Arc<AppState>>,
    Path(chart): Path<String>,
) -> Result<Response, ApiError> {
    let kind: ChartKind = chart.parse().map_err(ApiError::not_found)?;

    let students = load_students(state.store.as_ref()).await?;
    let data = build_dashboard(&students).ok_or_else(|| ApiError::not_found("No data available"))?;

    let png = tokio::task::spawn_blocking(move || graph::render_chart(kind, &data))
        .await
        .map_err(|e| ApiError::internal("Failed to render chart", e))?
        .map_err(|e| match e {
            crate::error::Error::Chart(ref reason) if reason.starts_with("no data") => {
                ApiError::not_found("No data available")
            }
            other => ApiError::internal("Failed to render chart", other),
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png,
    )
        .into_response())
}
