//! Course and enrollment handlers.

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

use super::validate_request;
use crate::{
    database::Database,
    errors::AppError,
    models::{Course, Enrollment, Role, User},
};

/// Course creation request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 20, message = "Code must be between 1 and 20 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    pub teacher_id: Uuid,
}

/// Enrollment request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollStudentRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollStudentResponse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    /// `false` when the student was already enrolled.
    pub enrolled: bool,
}

pub(crate) async fn require_course(db: &Database, id: Uuid) -> Result<Course, AppError> {
    db.get_course(id).await?.ok_or(AppError::NotFound)
}

async fn require_user_with_role(
    db: &Database,
    id: Uuid,
    allowed: &[Role],
    what: &str,
) -> Result<User, AppError> {
    match db.get_user(id).await? {
        Some(user) if allowed.contains(&user.role) => Ok(user),
        Some(_) => Err(AppError::InvalidInput(format!("User {id} is not a {what}"))),
        None => Err(AppError::InvalidInput(format!("Unknown {what}: {id}"))),
    }
}

/// Create a course taught by an existing teacher.
#[utoipa::path(
    post,
    path = "/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Course code already exists")
    )
)]
pub async fn create_course(
    Extension(db): Extension<Database>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    validate_request(&req)?;
    require_user_with_role(&db, req.teacher_id, &[Role::Teacher, Role::Admin], "teacher").await?;

    let course = Course {
        id: Uuid::new_v4(),
        code: req.code.trim().to_uppercase(),
        name: req.name.trim().to_string(),
        teacher_id: req.teacher_id,
        created_at: OffsetDateTime::now_utc(),
    };
    db.create_course(&course).await?;

    tracing::info!(course_id = %course.id, code = %course.code, "Course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// List all courses.
#[utoipa::path(
    get,
    path = "/courses",
    tag = "courses",
    responses(
        (status = 200, description = "All courses", body = Vec<Course>)
    )
)]
pub async fn list_courses(
    Extension(db): Extension<Database>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(db.list_courses().await?))
}

/// Enroll a student in a course. Enrolling twice is a no-op.
#[utoipa::path(
    post,
    path = "/courses/{id}/enrollments",
    tag = "courses",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = EnrollStudentRequest,
    responses(
        (status = 200, description = "Enrollment state", body = EnrollStudentResponse),
        (status = 400, description = "Unknown student"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn enroll_student(
    Extension(db): Extension<Database>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<EnrollStudentRequest>,
) -> Result<Json<EnrollStudentResponse>, AppError> {
    require_course(&db, course_id).await?;
    require_user_with_role(&db, req.student_id, &[Role::Student], "student").await?;

    let enrolled = db.enroll_student(req.student_id, course_id).await?;
    let enrollment = db
        .get_enrollment(req.student_id, course_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(EnrollStudentResponse {
        enrollment,
        enrolled,
    }))
}

/// List the students enrolled in a course.
#[utoipa::path(
    get,
    path = "/courses/{id}/students",
    tag = "courses",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled students", body = Vec<User>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn list_course_students(
    Extension(db): Extension<Database>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<User>>, AppError> {
    require_course(&db, course_id).await?;
    Ok(Json(db.list_course_students(course_id).await?))
}
