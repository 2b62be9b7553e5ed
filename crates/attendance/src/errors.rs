use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::stores::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Unavailable(msg) => {
                error!("Store unavailable: {msg}");
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(e) => {
                error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Rejections produced while marking attendance.
///
/// Everything except [`AttendanceError::Store`] is a definitive business-rule
/// rejection; retrying with the same input yields the same answer.
#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Invalid QR code data")]
    InvalidPayload,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field: {0}")]
    InvalidField(&'static str),

    #[error("Lecture not found")]
    LectureNotFound,

    #[error("Lecture is not active for attendance")]
    LectureNotActive,

    #[error("Student is not enrolled in this course")]
    NotEnrolled,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AttendanceError {
    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceError::MalformedBody(_) => "malformed_body",
            AttendanceError::InvalidPayload => "invalid_payload",
            AttendanceError::MissingField(_) => "missing_field",
            AttendanceError::InvalidField(_) => "invalid_field",
            AttendanceError::LectureNotFound => "lecture_not_found",
            AttendanceError::LectureNotActive => "lecture_not_active",
            AttendanceError::NotEnrolled => "not_enrolled",
            AttendanceError::Store(_) => "store_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::MalformedBody(_)
            | AttendanceError::InvalidPayload
            | AttendanceError::MissingField(_)
            | AttendanceError::InvalidField(_)
            | AttendanceError::LectureNotActive => StatusCode::BAD_REQUEST,
            AttendanceError::NotEnrolled => StatusCode::FORBIDDEN,
            AttendanceError::LectureNotFound => StatusCode::NOT_FOUND,
            AttendanceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AttendanceError::Store(_))
    }
}

impl IntoResponse for AttendanceError {
    fn into_response(self) -> Response {
        let message = match &self {
            AttendanceError::Store(e) => {
                error!("Attendance store error: {e}");
                "Failed to record attendance".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": self.code(),
            "message": message,
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_status_codes() {
        let cases = [
            (AttendanceError::InvalidPayload, StatusCode::BAD_REQUEST),
            (AttendanceError::MissingField("studentId"), StatusCode::BAD_REQUEST),
            (AttendanceError::InvalidField("studentId"), StatusCode::BAD_REQUEST),
            (AttendanceError::LectureNotActive, StatusCode::BAD_REQUEST),
            (AttendanceError::NotEnrolled, StatusCode::FORBIDDEN),
            (AttendanceError::LectureNotFound, StatusCode::NOT_FOUND),
            (
                AttendanceError::Store(StoreError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_only_store_errors_are_retryable() {
        assert!(AttendanceError::Store(StoreError::Unavailable("x".to_string())).is_retryable());
        assert!(!AttendanceError::NotEnrolled.is_retryable());
        assert!(!AttendanceError::LectureNotActive.is_retryable());
    }

    #[test]
    fn test_store_error_hides_details() {
        let response = AttendanceError::Store(StoreError::Unavailable(
            "postgres://user:secret@db".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
