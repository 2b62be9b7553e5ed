//! Configuration types for test data generation.

use serde::{Deserialize, Serialize};

/// How simulated students time their scans relative to the lecture start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ScanTiming {
    /// Uniform across the whole eligibility window.
    Uniform,
    /// Normal distribution around the start, in minutes.
    /// Negative means before the lecture starts.
    Normal { mean_minutes: f64, std_dev_minutes: f64 },
}

impl Default for ScanTiming {
    fn default() -> Self {
        // Most students arrive just before or right at the start, a tail runs late.
        Self::Normal {
            mean_minutes: 1.0,
            std_dev_minutes: 7.0,
        }
    }
}

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Email of the single administrator account.
    pub admin_email: String,

    /// Number of teachers to generate.
    pub teacher_count: usize,

    /// Number of students to generate.
    pub student_count: usize,

    /// Number of courses, assigned round-robin to teachers.
    pub course_count: usize,

    /// Weekly lectures generated per course.
    pub lectures_per_course: usize,

    /// Probability (0.0-1.0) that a student is enrolled in a given course.
    pub enrollment_rate: f64,

    /// Probability (0.0-1.0) that an enrolled student scans a past lecture.
    pub attendance_rate: f64,

    /// Scan timing distribution.
    pub scan_timing: ScanTiming,

    /// Batch size for database insertions.
    pub batch_size: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@example.com".to_string(),
            teacher_count: 3,
            student_count: 60,
            course_count: 4,
            lectures_per_course: 8,
            enrollment_rate: 0.5,
            attendance_rate: 0.85,
            scan_timing: ScanTiming::default(),
            batch_size: 50,
        }
    }
}
