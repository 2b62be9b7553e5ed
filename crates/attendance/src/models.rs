use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub teacher_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A scheduled class session. Always read joined with its course so the
/// course name is available for summaries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_name: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub qr_code_data: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Lecture {
    pub fn summary(&self) -> LectureSummary {
        LectureSummary {
            id: self.id,
            title: self.title.clone(),
            course_name: self.course_name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Denormalized lecture view returned alongside attendance results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LectureSummary {
    pub id: Uuid,
    pub title: String,
    pub course_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub enrolled_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    /// Only ever produced by reports for enrolled students without a record.
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub lecture_id: Uuid,
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub marked_at: OffsetDateTime,
    pub location: Option<String>,
    pub device_info: Option<String>,
}

/// Attendance values to write for one (lecture, student) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRecord {
    pub lecture_id: Uuid,
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub marked_at: OffsetDateTime,
    pub location: Option<String>,
    pub device_info: Option<String>,
}

impl NewAttendanceRecord {
    pub fn into_record(self, id: Uuid) -> AttendanceRecord {
        AttendanceRecord {
            id,
            lecture_id: self.lecture_id,
            student_id: self.student_id,
            status: self.status,
            marked_at: self.marked_at,
            location: self.location,
            device_info: self.device_info,
        }
    }
}

/// One row of a lecture attendance report.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub student_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub marked_at: Option<OffsetDateTime>,
}

/// Status totals for a lecture report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub total: i64,
}

impl AttendanceSummary {
    pub fn tally(entries: &[RosterEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Absent => summary.absent += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// A student's attendance for one lecture, used by the history listing.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceEntry {
    pub lecture_id: Uuid,
    pub lecture_title: String,
    pub course_name: String,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub marked_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: AttendanceStatus) -> RosterEntry {
        RosterEntry {
            student_id: Uuid::new_v4(),
            name: "Student".to_string(),
            email: "student@example.com".to_string(),
            status,
            marked_at: None,
        }
    }

    #[test]
    fn test_summary_tally() {
        let entries = vec![
            entry(AttendanceStatus::Present),
            entry(AttendanceStatus::Late),
            entry(AttendanceStatus::Absent),
            entry(AttendanceStatus::Present),
        ];
        let summary = AttendanceSummary::tally(&entries);
        assert_eq!(
            summary,
            AttendanceSummary {
                present: 2,
                late: 1,
                absent: 1,
                total: 4,
            }
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AttendanceStatus::Late).unwrap();
        assert_eq!(json, "\"late\"");
        assert_eq!(AttendanceStatus::Present.as_str(), "present");
    }
}
