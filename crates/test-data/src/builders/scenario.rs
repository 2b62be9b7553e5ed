//! Fluent builder for constructing test scenarios.

use rand::Rng;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use attendance::marker::AttendancePolicy;
use attendance::models::{AttendanceStatus, Role};

use crate::config::{ScanTiming, SeedConfig};
use crate::db::{SeedError, Seeder};
use crate::generators::{
    AttendanceGenConfig, AttendanceGenerator, CourseGenerator, GeneratedAttendance,
    GeneratedCourse, GeneratedEnrollment, GeneratedLecture, GeneratedUser, LectureGenerator,
    UserGenerator,
};

/// Result of building and seeding a scenario.
#[derive(Debug)]
pub struct ScenarioResult {
    pub admin: GeneratedUser,
    pub teachers: Vec<GeneratedUser>,
    pub students: Vec<GeneratedUser>,
    pub courses: Vec<GeneratedCourse>,
    pub enrollments: Vec<GeneratedEnrollment>,
    pub lectures: Vec<GeneratedLecture>,
    pub attendance: Vec<GeneratedAttendance>,
}

impl ScenarioResult {
    /// Number of records with the given status.
    pub fn count_status(&self, status: AttendanceStatus) -> usize {
        self.attendance.iter().filter(|a| a.status == status).count()
    }
}

/// Builder for creating complete test scenarios.
///
/// # Example
///
/// ```rust,ignore
/// let result = ScenarioBuilder::new()
///     .with_students(120)
///     .with_courses(6)
///     .with_scan_timing(ScanTiming::Uniform)
///     .build(&pool, &mut rng)
///     .await?;
/// ```
pub struct ScenarioBuilder {
    config: SeedConfig,
    policy: AttendancePolicy,
    now: Option<OffsetDateTime>,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// Creates a new scenario builder with default settings.
    pub fn new() -> Self {
        Self::from_config(SeedConfig::default())
    }

    pub fn from_config(config: SeedConfig) -> Self {
        Self {
            config,
            policy: AttendancePolicy::default(),
            now: None,
        }
    }

    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.config.admin_email = email.into();
        self
    }

    pub fn with_teachers(mut self, count: usize) -> Self {
        self.config.teacher_count = count;
        self
    }

    pub fn with_students(mut self, count: usize) -> Self {
        self.config.student_count = count;
        self
    }

    pub fn with_courses(mut self, count: usize) -> Self {
        self.config.course_count = count;
        self
    }

    pub fn with_lectures_per_course(mut self, count: usize) -> Self {
        self.config.lectures_per_course = count;
        self
    }

    pub fn with_enrollment_rate(mut self, rate: f64) -> Self {
        self.config.enrollment_rate = rate;
        self
    }

    pub fn with_attendance_rate(mut self, rate: f64) -> Self {
        self.config.attendance_rate = rate;
        self
    }

    pub fn with_scan_timing(mut self, timing: ScanTiming) -> Self {
        self.config.scan_timing = timing;
        self
    }

    /// Uses a custom attendance policy, matching a server configured with
    /// non-default buffer or late threshold.
    pub fn with_policy(mut self, policy: AttendancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pins "now" for reproducible schedules. Defaults to the current time.
    pub fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Builds the scenario (generates data but doesn't seed database).
    pub fn build_data(&self, rng: &mut impl Rng) -> ScenarioResult {
        let now = self.now.unwrap_or_else(OffsetDateTime::now_utc);

        let user_gen = UserGenerator::new();
        let admin = user_gen.admin(&self.config.admin_email);
        let teachers = user_gen.generate_batch(Role::Teacher, self.config.teacher_count, rng);
        let students = user_gen.generate_batch(Role::Student, self.config.student_count, rng);

        let teacher_ids: Vec<Uuid> = teachers.iter().map(|u| u.id).collect();
        let student_ids: Vec<Uuid> = students.iter().map(|u| u.id).collect();

        let course_gen = CourseGenerator::new();
        let courses = course_gen.generate_batch(self.config.course_count, &teacher_ids);
        let enrollments = course_gen.generate_enrollments(
            &courses,
            &student_ids,
            self.config.enrollment_rate,
            rng,
        );

        let lecture_gen = LectureGenerator::new();
        let lectures: Vec<GeneratedLecture> = courses
            .iter()
            .flat_map(|course| {
                lecture_gen.generate_for_course(course, self.config.lectures_per_course, now)
            })
            .collect();

        let attendance_gen = AttendanceGenerator::with_config(
            AttendanceGenConfig {
                attendance_rate: self.config.attendance_rate,
                timing: self.config.scan_timing,
                ..AttendanceGenConfig::default()
            },
            self.policy,
        );
        let attendance = lectures
            .iter()
            .flat_map(|lecture| attendance_gen.generate_for_lecture(lecture, &enrollments, now, rng))
            .collect();

        ScenarioResult {
            admin,
            teachers,
            students,
            courses,
            enrollments,
            lectures,
            attendance,
        }
    }

    /// Builds and seeds the scenario into the database.
    pub async fn build(
        self,
        pool: &PgPool,
        rng: &mut impl Rng,
    ) -> Result<ScenarioResult, SeedError> {
        let seeder = Seeder::new(pool.clone()).with_batch_size(self.config.batch_size);
        seeder.ensure_empty(&self.config.admin_email).await?;

        let result = self.build_data(rng);

        // Seed in dependency order
        seeder
            .seed_users(std::slice::from_ref(&result.admin))
            .await?;
        seeder.seed_users(&result.teachers).await?;
        seeder.seed_users(&result.students).await?;
        seeder.seed_courses(&result.courses).await?;
        seeder.seed_enrollments(&result.enrollments).await?;
        seeder.seed_lectures(&result.lectures).await?;
        seeder.seed_attendance(&result.attendance).await?;

        Ok(result)
    }
}

/// Preset scenarios for common testing needs.
impl ScenarioBuilder {
    /// A single small course, useful for clicking through the API by hand.
    ///
    /// - 1 teacher, 12 students, all enrolled
    /// - 4 past lectures
    pub fn small_class() -> Self {
        Self::new()
            .with_teachers(1)
            .with_students(12)
            .with_courses(1)
            .with_lectures_per_course(4)
            .with_enrollment_rate(1.0)
    }

    /// A full term across several departments.
    ///
    /// - 6 teachers, 300 students, 12 courses
    /// - 12 weekly lectures per course
    pub fn full_term() -> Self {
        Self::new()
            .with_teachers(6)
            .with_students(300)
            .with_courses(12)
            .with_lectures_per_course(12)
            .with_enrollment_rate(0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use time::macros::datetime;

    #[test]
    fn test_build_data_is_consistent() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(12345);
        let result = ScenarioBuilder::small_class()
            .at(datetime!(2025-03-10 12:00 UTC))
            .build_data(&mut rng);

        assert_eq!(result.admin.role, Role::Admin);
        assert_eq!(result.teachers.len(), 1);
        assert_eq!(result.students.len(), 12);
        assert_eq!(result.courses.len(), 1);
        assert_eq!(result.enrollments.len(), 12);
        assert_eq!(result.lectures.len(), 4);

        // Every scan belongs to an enrolled student and a generated lecture
        let enrolled: HashSet<_> = result
            .enrollments
            .iter()
            .map(|e| (e.student_id, e.course_id))
            .collect();
        for scan in &result.attendance {
            let lecture = result
                .lectures
                .iter()
                .find(|l| l.id == scan.lecture_id)
                .unwrap();
            assert!(enrolled.contains(&(scan.student_id, lecture.course_id)));
        }

        // At most one record per (lecture, student)
        let pairs: HashSet<_> = result
            .attendance
            .iter()
            .map(|a| (a.lecture_id, a.student_id))
            .collect();
        assert_eq!(pairs.len(), result.attendance.len());
        assert_eq!(result.count_status(AttendanceStatus::Absent), 0);
    }

    #[test]
    fn test_no_teachers_means_no_courses() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(12345);
        let result = ScenarioBuilder::new()
            .with_teachers(0)
            .build_data(&mut rng);

        assert!(result.courses.is_empty());
        assert!(result.lectures.is_empty());
        assert!(result.attendance.is_empty());
    }
}
