//! Entity generators for test data.
//!
//! This module provides generators for creating realistic test entities:
//! - [`UserGenerator`]: Generate admins, teachers and students
//! - [`CourseGenerator`]: Create courses and enrollments
//! - [`LectureGenerator`]: Lay out weekly lecture schedules with QR payloads
//! - [`AttendanceGenerator`]: Simulate scans that the service would accept

pub mod attendance;
pub mod course;
pub mod user;

pub use attendance::{AttendanceGenConfig, AttendanceGenerator, GeneratedAttendance};
pub use course::{
    CourseGenerator, GeneratedCourse, GeneratedEnrollment, GeneratedLecture, LectureGenerator,
};
pub use user::{GeneratedUser, UserGenConfig, UserGenerator};
