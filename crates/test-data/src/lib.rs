//! Test data generation for the attendance service.
//!
//! This crate generates users, courses, lecture schedules, enrollments and
//! simulated QR scans to support manual verification and integration testing.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let result = ScenarioBuilder::new()
//!     .with_teachers(3)
//!     .with_students(60)
//!     .with_courses(4)
//!     .with_lectures_per_course(10)
//!     .with_attendance_rate(0.85)
//!     .build(&pool, &mut rng)
//!     .await?;
//! ```

pub mod builders;
pub mod config;
pub mod db;
pub mod generators;

// Re-export core types from the attendance crate
pub use attendance::marker::AttendancePolicy;
pub use attendance::models::{AttendanceStatus, Role};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{ScenarioBuilder, ScenarioResult};
    pub use crate::config::{ScanTiming, SeedConfig};
    pub use crate::db::Seeder;
    pub use crate::generators::{
        AttendanceGenerator, CourseGenerator, LectureGenerator, UserGenerator,
    };
    pub use crate::{AttendancePolicy, AttendanceStatus, Role};
}
