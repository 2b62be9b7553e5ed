//! Database seeding utilities.

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::generators::{
    GeneratedAttendance, GeneratedCourse, GeneratedEnrollment, GeneratedLecture, GeneratedUser,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database already seeded: user {0} exists")]
    AlreadySeeded(String),
}

/// Database seeder for inserting generated test data.
pub struct Seeder {
    pool: PgPool,
    batch_size: usize,
}

impl Seeder {
    /// Creates a new seeder with the given database pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_size: 50,
        }
    }

    /// Sets the batch size for bulk operations.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Fails with [`SeedError::AlreadySeeded`] when the administrator account
    /// is already present. Course codes and emails are unique, so a second
    /// run would otherwise collide halfway through.
    pub async fn ensure_empty(&self, admin_email: &str) -> Result<(), SeedError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(admin_email)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            return Err(SeedError::AlreadySeeded(admin_email.to_string()));
        }
        Ok(())
    }

    /// Seeds users into the database.
    pub async fn seed_users(&self, users: &[GeneratedUser]) -> Result<(), SeedError> {
        info!("Seeding {} users...", users.len());

        for chunk in users.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;
            for user in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO users (id, name, email, role, created_at)
                    VALUES ($1, $2, $3, $4, NOW())
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.email)
                .bind(user.role)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} users", users.len());
        Ok(())
    }

    /// Seeds courses. Teachers must already exist.
    pub async fn seed_courses(&self, courses: &[GeneratedCourse]) -> Result<(), SeedError> {
        info!("Seeding {} courses...", courses.len());

        for course in courses {
            sqlx::query(
                r#"
                INSERT INTO courses (id, code, name, teacher_id, created_at)
                VALUES ($1, $2, $3, $4, NOW())
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(course.id)
            .bind(&course.code)
            .bind(&course.name)
            .bind(course.teacher_id)
            .execute(&self.pool)
            .await?;
        }

        info!("Seeded {} courses", courses.len());
        Ok(())
    }

    /// Seeds enrollments.
    pub async fn seed_enrollments(
        &self,
        enrollments: &[GeneratedEnrollment],
    ) -> Result<(), SeedError> {
        info!("Seeding {} enrollments...", enrollments.len());

        for chunk in enrollments.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;
            for enrollment in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO enrollments (student_id, course_id)
                    VALUES ($1, $2)
                    ON CONFLICT (student_id, course_id) DO NOTHING
                    "#,
                )
                .bind(enrollment.student_id)
                .bind(enrollment.course_id)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} enrollments", enrollments.len());
        Ok(())
    }

    /// Seeds lectures with their QR payloads.
    pub async fn seed_lectures(&self, lectures: &[GeneratedLecture]) -> Result<(), SeedError> {
        info!("Seeding {} lectures...", lectures.len());

        for chunk in lectures.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;
            for lecture in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO lectures (id, course_id, title, start_time, end_time, qr_code_data)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(lecture.id)
                .bind(lecture.course_id)
                .bind(&lecture.title)
                .bind(lecture.start_time)
                .bind(lecture.end_time)
                .bind(&lecture.qr_code_data)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} lectures", lectures.len());
        Ok(())
    }

    /// Seeds attendance records. Existing (lecture, student) pairs are kept.
    pub async fn seed_attendance(&self, records: &[GeneratedAttendance]) -> Result<(), SeedError> {
        info!("Seeding {} attendance records...", records.len());

        for (i, chunk) in records.chunks(self.batch_size).enumerate() {
            let mut tx = self.pool.begin().await?;
            for record in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO attendance_records
                        (id, lecture_id, student_id, status, marked_at, location, device_info,
                         created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $5, $5)
                    ON CONFLICT (lecture_id, student_id) DO NOTHING
                    "#,
                )
                .bind(record.id)
                .bind(record.lecture_id)
                .bind(record.student_id)
                .bind(record.status)
                .bind(record.marked_at)
                .bind(&record.location)
                .bind(&record.device_info)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;

            let done = ((i + 1) * self.batch_size).min(records.len());
            if done < records.len() {
                info!("  Seeded {}/{} attendance records", done, records.len());
            }
        }

        info!("Seeded {} attendance records", records.len());
        Ok(())
    }

    /// Clears all seeded test data.
    ///
    /// **WARNING**: This deletes all data from the tables. Use with caution.
    pub async fn clear_all(&self) -> Result<(), SeedError> {
        info!("Clearing all seeded data...");

        // Order matters due to foreign key constraints
        sqlx::query("DELETE FROM attendance_records")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM lectures")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM enrollments")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM courses")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;

        info!("All data cleared");
        Ok(())
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
