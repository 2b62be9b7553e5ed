//! Per-student attendance history.

use axum::{
    Extension,
    extract::{Path, Query},
    response::Json,
};
use uuid::Uuid;

use super::pagination::{PaginatedResponse, PaginationQuery};
use crate::{database::Database, errors::AppError, models::StudentAttendanceEntry};

/// Get a student's attendance history, most recent lecture first.
#[utoipa::path(
    get,
    path = "/students/{id}/attendance",
    tag = "students",
    params(
        ("id" = Uuid, Path, description = "Student ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Attendance history", body = PaginatedResponse<StudentAttendanceEntry>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student_attendance(
    Extension(db): Extension<Database>,
    Path(student_id): Path<Uuid>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<StudentAttendanceEntry>>, AppError> {
    db.get_user(student_id).await?.ok_or(AppError::NotFound)?;

    let (limit, offset) = page.normalized();
    let items = db.student_history(student_id, limit, offset).await?;
    let total_count = db.count_student_records(student_id).await?;

    Ok(Json(PaginatedResponse::new(items, total_count, limit, offset)))
}
