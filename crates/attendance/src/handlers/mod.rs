//! HTTP request handlers for the attendance API.
//!
//! This module re-exports handlers from focused submodules organized by domain.

// Utility submodules
pub mod pagination;

// Handler modules
pub mod attendance;
pub mod courses;
pub mod health;
pub mod lectures;
pub mod students;
pub mod users;

use validator::Validate;

use crate::errors::AppError;

// Re-export handlers from submodules (including utoipa __path types for OpenAPI)
pub use attendance::{
    __path_get_student_lecture_attendance, __path_mark_attendance, MarkAttendanceRequest,
    MarkAttendanceResponse, attendance_routes, get_student_lecture_attendance, mark_attendance,
};
pub use courses::{
    __path_create_course, __path_enroll_student, __path_list_course_students,
    __path_list_courses, CreateCourseRequest, EnrollStudentRequest, EnrollStudentResponse,
    create_course, enroll_student, list_course_students, list_courses,
};
pub use health::{__path_health_check, health_check};
pub use lectures::{
    __path_create_lecture, __path_get_lecture, __path_get_lecture_attendance,
    __path_list_course_lectures, __path_regenerate_qr_code, CreateLectureRequest,
    LectureAttendanceReport, QrCodeResponse, create_lecture, get_lecture, get_lecture_attendance,
    list_course_lectures, regenerate_qr_code,
};
pub use students::{__path_get_student_attendance, get_student_attendance};
pub use users::{__path_all_users, __path_create_user, CreateUserRequest, all_users, create_user};

/// Run `validator` rules and flatten field messages into one input error.
pub(crate) fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|e| {
        let messages: Vec<String> = e
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| {
                errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            })
            .collect();
        AppError::InvalidInput(messages.join(", "))
    })
}
