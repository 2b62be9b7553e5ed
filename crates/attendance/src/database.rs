use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    AttendanceRecord, Course, Enrollment, Lecture, NewAttendanceRecord, RosterEntry,
    StudentAttendanceEntry, User,
};
use crate::stores::{AttendanceStore, EnrollmentStore, LectureStore, StoreError, Upserted};

const LECTURE_COLUMNS: &str = r#"
    l.id, l.course_id, c.name AS course_name, l.title,
    l.start_time, l.end_time, l.qr_code_data, l.created_at
"#;

const RECORD_COLUMNS: &str =
    "id, lecture_id, student_id, status, marked_at, location, device_info";

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    record: AttendanceRecord,
    created: bool,
}

fn unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Users

    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(())
    }

    pub async fn all_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as(
            r#"
            SELECT id, name, email, role, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(
            r#"
            SELECT id, name, email, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Courses and enrollments

    pub async fn create_course(&self, course: &Course) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, code, name, teacher_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(course.id)
        .bind(&course.code)
        .bind(&course.name)
        .bind(course.teacher_id)
        .bind(course.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e) {
                AppError::Conflict("Course code already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(())
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as(
            r#"
            SELECT id, code, name, teacher_id, created_at
            FROM courses
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    pub async fn get_course(&self, id: Uuid) -> Result<Option<Course>, AppError> {
        let course = sqlx::query_as(
            r#"
            SELECT id, code, name, teacher_id, created_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    /// Enroll a student. Returns `false` when the enrollment already existed.
    pub async fn enroll_student(&self, student_id: Uuid, course_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (student_id, course_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError> {
        let enrollment = sqlx::query_as(
            r#"
            SELECT student_id, course_id, enrolled_at
            FROM enrollments
            WHERE student_id = $1 AND course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }

    pub async fn list_course_students(&self, course_id: Uuid) -> Result<Vec<User>, AppError> {
        let students = sqlx::query_as(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.created_at
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.course_id = $1
            ORDER BY u.name
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    // Lectures

    pub async fn create_lecture(
        &self,
        id: Uuid,
        course_id: Uuid,
        title: &str,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        qr_code_data: &str,
    ) -> Result<Lecture, AppError> {
        let sql = format!(
            r#"
            WITH l AS (
                INSERT INTO lectures (id, course_id, title, start_time, end_time, qr_code_data)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT {LECTURE_COLUMNS}
            FROM l
            JOIN courses c ON c.id = l.course_id
            "#
        );

        let lecture = sqlx::query_as(&sql)
            .bind(id)
            .bind(course_id)
            .bind(title)
            .bind(start_time)
            .bind(end_time)
            .bind(qr_code_data)
            .fetch_one(&self.pool)
            .await?;

        Ok(lecture)
    }

    pub async fn get_lecture(&self, id: Uuid) -> Result<Option<Lecture>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {LECTURE_COLUMNS}
            FROM lectures l
            JOIN courses c ON c.id = l.course_id
            WHERE l.id = $1
            "#
        );

        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_course_lectures(&self, course_id: Uuid) -> Result<Vec<Lecture>, AppError> {
        let sql = format!(
            r#"
            SELECT {LECTURE_COLUMNS}
            FROM lectures l
            JOIN courses c ON c.id = l.course_id
            WHERE l.course_id = $1
            ORDER BY l.start_time
            "#
        );

        let lectures = sqlx::query_as(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lectures)
    }

    /// Replace the QR payload of a lecture. The only lecture field that may
    /// change once attendance has started.
    pub async fn update_lecture_qr(&self, id: Uuid, qr_code_data: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE lectures SET qr_code_data = $2 WHERE id = $1")
            .bind(id)
            .bind(qr_code_data)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Reports

    /// Every student enrolled in the lecture's course, with `absent` for
    /// those who never scanned.
    pub async fn lecture_roster(
        &self,
        lecture_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<RosterEntry>, AppError> {
        let entries = sqlx::query_as(
            r#"
            SELECT u.id AS student_id, u.name, u.email,
                   COALESCE(ar.status, 'absent'::attendance_status) AS status,
                   ar.marked_at
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            LEFT JOIN attendance_records ar
                   ON ar.lecture_id = $1 AND ar.student_id = e.student_id
            WHERE e.course_id = $2
            ORDER BY u.name
            "#,
        )
        .bind(lecture_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn student_history(
        &self,
        student_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StudentAttendanceEntry>, AppError> {
        let entries = sqlx::query_as(
            r#"
            SELECT ar.lecture_id, l.title AS lecture_title, c.name AS course_name,
                   ar.status, ar.marked_at, l.start_time
            FROM attendance_records ar
            JOIN lectures l ON l.id = ar.lecture_id
            JOIN courses c ON c.id = l.course_id
            WHERE ar.student_id = $1
            ORDER BY l.start_time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count_student_records(&self, student_id: Uuid) -> Result<i64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM attendance_records WHERE student_id = $1")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl LectureStore for Database {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lecture>, StoreError> {
        Ok(self.get_lecture(id).await?)
    }
}

#[async_trait]
impl EnrollmentStore for Database {
    async fn exists(&self, student_id: Uuid, course_id: Uuid) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2
            )
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl AttendanceStore for Database {
    async fn find_by_lecture_and_student(
        &self,
        lecture_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE lecture_id = $1 AND student_id = $2"
        );

        let record = sqlx::query_as(&sql)
            .bind(lecture_id)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn upsert(&self, record: NewAttendanceRecord) -> Result<Upserted, StoreError> {
        // xmax is zero only for a freshly inserted tuple.
        let sql = format!(
            r#"
            INSERT INTO attendance_records
                (id, lecture_id, student_id, status, marked_at, location, device_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (lecture_id, student_id) DO UPDATE SET
                status = EXCLUDED.status,
                marked_at = EXCLUDED.marked_at,
                location = EXCLUDED.location,
                device_info = EXCLUDED.device_info,
                updated_at = NOW()
            RETURNING {RECORD_COLUMNS}, (xmax = 0) AS created
            "#
        );

        let row: UpsertRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(record.lecture_id)
            .bind(record.student_id)
            .bind(record.status)
            .bind(record.marked_at)
            .bind(&record.location)
            .bind(&record.device_info)
            .fetch_one(&self.pool)
            .await?;

        Ok(Upserted {
            record: row.record,
            created: row.created,
        })
    }
}
