//! Lecture scheduling, QR codes and attendance reports.

use axum::{
    Extension,
    extract::Path,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{courses::require_course, validate_request};
use crate::{
    database::Database,
    errors::AppError,
    models::{AttendanceSummary, Lecture, LectureSummary, RosterEntry},
    qr::generate_qr_payload,
};

/// Lecture creation request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    pub lecture_id: Uuid,
    pub qr_code_data: String,
}

/// Attendance report for one lecture.
#[derive(Debug, Serialize, ToSchema)]
pub struct LectureAttendanceReport {
    pub lecture: LectureSummary,
    pub summary: AttendanceSummary,
    pub students: Vec<RosterEntry>,
}

async fn require_lecture(db: &Database, id: Uuid) -> Result<Lecture, AppError> {
    db.get_lecture(id).await?.ok_or(AppError::NotFound)
}

/// Schedule a lecture for a course and issue its QR code.
#[utoipa::path(
    post,
    path = "/courses/{id}/lectures",
    tag = "lectures",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CreateLectureRequest,
    responses(
        (status = 201, description = "Lecture created", body = Lecture),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_lecture(
    Extension(db): Extension<Database>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<CreateLectureRequest>,
) -> Result<(StatusCode, Json<Lecture>), AppError> {
    validate_request(&req)?;
    if req.start_time >= req.end_time {
        return Err(AppError::InvalidInput(
            "Lecture must start before it ends".to_string(),
        ));
    }
    require_course(&db, course_id).await?;

    let id = Uuid::new_v4();
    let title = req.title.trim();
    let qr_code_data = generate_qr_payload(id, title, OffsetDateTime::now_utc());

    let lecture = db
        .create_lecture(id, course_id, title, req.start_time, req.end_time, &qr_code_data)
        .await?;

    tracing::info!(lecture_id = %lecture.id, %course_id, "Lecture created");
    Ok((StatusCode::CREATED, Json(lecture)))
}

/// List a course's lectures in chronological order.
#[utoipa::path(
    get,
    path = "/courses/{id}/lectures",
    tag = "lectures",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Lectures", body = Vec<Lecture>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn list_course_lectures(
    Extension(db): Extension<Database>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Lecture>>, AppError> {
    require_course(&db, course_id).await?;
    Ok(Json(db.list_course_lectures(course_id).await?))
}

/// Get a lecture by ID.
#[utoipa::path(
    get,
    path = "/lectures/{id}",
    tag = "lectures",
    params(("id" = Uuid, Path, description = "Lecture ID")),
    responses(
        (status = 200, description = "Lecture", body = Lecture),
        (status = 404, description = "Lecture not found")
    )
)]
pub async fn get_lecture(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lecture>, AppError> {
    Ok(Json(require_lecture(&db, id).await?))
}

/// Issue a fresh QR code for a lecture. Previously printed codes keep
/// working since only the lecture ID is checked.
#[utoipa::path(
    post,
    path = "/lectures/{id}/qr",
    tag = "lectures",
    params(("id" = Uuid, Path, description = "Lecture ID")),
    responses(
        (status = 200, description = "New QR payload", body = QrCodeResponse),
        (status = 404, description = "Lecture not found")
    )
)]
pub async fn regenerate_qr_code(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<QrCodeResponse>, AppError> {
    let lecture = require_lecture(&db, id).await?;
    let qr_code_data = generate_qr_payload(lecture.id, &lecture.title, OffsetDateTime::now_utc());

    if !db.update_lecture_qr(lecture.id, &qr_code_data).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(QrCodeResponse {
        lecture_id: lecture.id,
        qr_code_data,
    }))
}

/// Attendance of every enrolled student; students without a record are
/// reported as absent.
#[utoipa::path(
    get,
    path = "/lectures/{id}/attendance",
    tag = "lectures",
    params(("id" = Uuid, Path, description = "Lecture ID")),
    responses(
        (status = 200, description = "Attendance report", body = LectureAttendanceReport),
        (status = 404, description = "Lecture not found")
    )
)]
pub async fn get_lecture_attendance(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<LectureAttendanceReport>, AppError> {
    let lecture = require_lecture(&db, id).await?;
    let students = db.lecture_roster(lecture.id, lecture.course_id).await?;

    Ok(Json(LectureAttendanceReport {
        lecture: lecture.summary(),
        summary: AttendanceSummary::tally(&students),
        students,
    }))
}
