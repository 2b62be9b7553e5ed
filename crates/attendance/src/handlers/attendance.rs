//! Attendance marking handlers.

use axum::{
    Extension, Router,
    extract::{Path, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    errors::{AppError, AttendanceError},
    marker::{MarkOutcome, SharedAttendanceMarker},
    models::{AttendanceRecord, LectureSummary},
};

/// Body of a QR scan submission.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    /// Raw text decoded from the lecture's QR code.
    pub qr_code_data: Option<String>,
    pub student_id: Option<String>,
    pub location: Option<String>,
    pub device_info: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAttendanceResponse {
    pub success: bool,
    pub attendance: AttendanceRecord,
    pub lecture: LectureSummary,
    pub message: String,
}

impl From<MarkOutcome> for MarkAttendanceResponse {
    fn from(outcome: MarkOutcome) -> Self {
        let message = outcome.message().to_string();
        Self {
            success: true,
            attendance: outcome.record,
            lecture: outcome.lecture,
            message,
        }
    }
}

/// Routes that only need the attendance marker.
pub fn attendance_routes(marker: SharedAttendanceMarker) -> Router {
    Router::new()
        .route("/attendance/mark", post(mark_attendance))
        .route(
            "/lectures/{id}/attendance/{student_id}",
            get(get_student_lecture_attendance),
        )
        .layer(Extension(marker))
}

/// Mark attendance from a scanned lecture QR code.
#[utoipa::path(
    post,
    path = "/attendance/mark",
    tag = "attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Attendance marked or updated", body = MarkAttendanceResponse),
        (status = 400, description = "Malformed payload, missing field or lecture not active"),
        (status = 403, description = "Student not enrolled in the course"),
        (status = 404, description = "Lecture not found"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn mark_attendance(
    Extension(marker): Extension<SharedAttendanceMarker>,
    payload: Result<Json<MarkAttendanceRequest>, JsonRejection>,
) -> Result<Json<MarkAttendanceResponse>, AttendanceError> {
    let Json(body) = payload.map_err(|e| AttendanceError::MalformedBody(e.body_text()))?;

    let outcome = marker
        .mark_attendance(
            body.qr_code_data.as_deref().unwrap_or_default(),
            body.student_id.as_deref().unwrap_or_default(),
            body.location,
            body.device_info,
        )
        .await?;

    Ok(Json(outcome.into()))
}

/// Get one student's attendance record for a lecture.
#[utoipa::path(
    get,
    path = "/lectures/{id}/attendance/{student_id}",
    tag = "attendance",
    params(
        ("id" = Uuid, Path, description = "Lecture ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceRecord),
        (status = 404, description = "No attendance recorded")
    )
)]
pub async fn get_student_lecture_attendance(
    Extension(marker): Extension<SharedAttendanceMarker>,
    Path((lecture_id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let record = marker
        .attendance_store()
        .find_by_lecture_and_student(lecture_id, student_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(record))
}
