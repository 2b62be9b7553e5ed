//! Storage ports consumed by the attendance marker.
//!
//! The marker only depends on these traits; [`crate::database::Database`]
//! implements all of them over PostgreSQL.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AttendanceRecord, Lecture, NewAttendanceRecord};

/// Failure reported by a storage adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result of an attendance upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub record: AttendanceRecord,
    /// `true` when the row was inserted, `false` when an existing row was overwritten.
    pub created: bool,
}

#[async_trait]
pub trait LectureStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lecture>, StoreError>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn exists(&self, student_id: Uuid, course_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_by_lecture_and_student(
        &self,
        lecture_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Atomically insert or overwrite the record for the (lecture, student) pair.
    async fn upsert(&self, record: NewAttendanceRecord) -> Result<Upserted, StoreError>;
}
