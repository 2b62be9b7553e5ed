//! The attendance marking decision.
//!
//! A scan is accepted when the QR payload names an existing lecture, the
//! scan falls inside the lecture's eligibility window and the student is
//! enrolled in the lecture's course. Accepted scans are written with a
//! single upsert so repeated or concurrent scans converge on one record.

use std::sync::Arc;

use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    database::Database,
    errors::AttendanceError,
    models::{AttendanceRecord, AttendanceStatus, Lecture, LectureSummary, NewAttendanceRecord},
    stores::{AttendanceStore, EnrollmentStore, LectureStore},
};

/// Minutes before start and after end during which scans are accepted.
pub const ELIGIBILITY_BUFFER_MINUTES: i64 = 15;

/// Minutes after start after which a scan counts as late.
pub const LATE_THRESHOLD_MINUTES: i64 = 10;

/// Timing rules applied to every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePolicy {
    pub buffer: Duration,
    pub late_threshold: Duration,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            buffer: Duration::minutes(ELIGIBILITY_BUFFER_MINUTES),
            late_threshold: Duration::minutes(LATE_THRESHOLD_MINUTES),
        }
    }
}

impl AttendancePolicy {
    /// Inclusive `[start - buffer, end + buffer]` bounds.
    pub fn window(&self, lecture: &Lecture) -> (OffsetDateTime, OffsetDateTime) {
        (
            lecture.start_time - self.buffer,
            lecture.end_time + self.buffer,
        )
    }

    pub fn is_active(&self, lecture: &Lecture, now: OffsetDateTime) -> bool {
        let (opens, closes) = self.window(lecture);
        opens <= now && now <= closes
    }

    /// Instant after which scans are late, clamped to the lecture end for
    /// lectures shorter than the threshold.
    pub fn late_after(&self, lecture: &Lecture) -> OffsetDateTime {
        (lecture.start_time + self.late_threshold).min(lecture.end_time)
    }

    pub fn status_at(&self, lecture: &Lecture, now: OffsetDateTime) -> AttendanceStatus {
        if now > self.late_after(lecture) {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}

#[derive(Debug, Deserialize)]
struct QrPayload {
    #[serde(rename = "lectureId")]
    lecture_id: Option<String>,
}

/// Extract the lecture id from a scanned QR payload.
///
/// The payload must be a JSON object carrying a string `lectureId`; any
/// other fields are ignored.
pub fn parse_qr_payload(raw: &str) -> Result<Uuid, AttendanceError> {
    let payload: QrPayload =
        serde_json::from_str(raw).map_err(|_| AttendanceError::InvalidPayload)?;

    let lecture_id = payload
        .lecture_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(AttendanceError::InvalidPayload)?;

    Uuid::parse_str(lecture_id.trim()).map_err(|_| AttendanceError::InvalidPayload)
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AttendanceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AttendanceError::MissingField(field));
    }
    Ok(trimmed)
}

/// Outcome of an accepted scan.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkOutcome {
    pub record: AttendanceRecord,
    pub lecture: LectureSummary,
    /// `false` when an earlier record for the same lecture was overwritten.
    pub created: bool,
}

impl MarkOutcome {
    pub fn message(&self) -> &'static str {
        if self.created {
            "Attendance marked successfully"
        } else {
            "Attendance updated successfully"
        }
    }
}

pub struct AttendanceMarker<L: ?Sized, E: ?Sized, A: ?Sized> {
    lectures: Arc<L>,
    enrollments: Arc<E>,
    attendance: Arc<A>,
    policy: AttendancePolicy,
}

impl<L: ?Sized, E: ?Sized, A: ?Sized> Clone for AttendanceMarker<L, E, A> {
    fn clone(&self) -> Self {
        Self {
            lectures: Arc::clone(&self.lectures),
            enrollments: Arc::clone(&self.enrollments),
            attendance: Arc::clone(&self.attendance),
            policy: self.policy,
        }
    }
}

/// Marker over type-erased stores, as shared by the HTTP handlers.
pub type SharedAttendanceMarker =
    AttendanceMarker<dyn LectureStore, dyn EnrollmentStore, dyn AttendanceStore>;

impl SharedAttendanceMarker {
    pub fn from_database(db: Database, policy: AttendancePolicy) -> Self {
        let db = Arc::new(db);
        let lectures: Arc<dyn LectureStore> = db.clone();
        let enrollments: Arc<dyn EnrollmentStore> = db.clone();
        let attendance: Arc<dyn AttendanceStore> = db;
        Self::new(lectures, enrollments, attendance, policy)
    }
}

impl<L, E, A> AttendanceMarker<L, E, A>
where
    L: LectureStore + ?Sized,
    E: EnrollmentStore + ?Sized,
    A: AttendanceStore + ?Sized,
{
    pub fn new(
        lectures: Arc<L>,
        enrollments: Arc<E>,
        attendance: Arc<A>,
        policy: AttendancePolicy,
    ) -> Self {
        Self {
            lectures,
            enrollments,
            attendance,
            policy,
        }
    }

    pub fn attendance_store(&self) -> &A {
        &self.attendance
    }

    /// Mark attendance for a scan happening now.
    pub async fn mark_attendance(
        &self,
        qr_payload: &str,
        student_id: &str,
        location: Option<String>,
        device_info: Option<String>,
    ) -> Result<MarkOutcome, AttendanceError> {
        self.mark_attendance_at(
            qr_payload,
            student_id,
            location,
            device_info,
            OffsetDateTime::now_utc(),
        )
        .await
    }

    /// Mark attendance for a scan evaluated at `now`.
    pub async fn mark_attendance_at(
        &self,
        qr_payload: &str,
        student_id: &str,
        location: Option<String>,
        device_info: Option<String>,
        now: OffsetDateTime,
    ) -> Result<MarkOutcome, AttendanceError> {
        // Input is fully validated before touching any store.
        let qr_payload = required(qr_payload, "qrCodeData")?;
        let student_id = required(student_id, "studentId")?;
        let lecture_id = parse_qr_payload(qr_payload)?;
        let student_id =
            Uuid::parse_str(student_id).map_err(|_| AttendanceError::InvalidField("studentId"))?;

        let lecture = self
            .lectures
            .get_by_id(lecture_id)
            .await?
            .ok_or(AttendanceError::LectureNotFound)?;

        if !self.policy.is_active(&lecture, now) {
            debug!(%lecture_id, %student_id, "Scan outside the eligibility window");
            return Err(AttendanceError::LectureNotActive);
        }

        if !self.enrollments.exists(student_id, lecture.course_id).await? {
            debug!(%lecture_id, %student_id, course_id = %lecture.course_id, "Student not enrolled");
            return Err(AttendanceError::NotEnrolled);
        }

        let status = self.policy.status_at(&lecture, now);

        let upserted = self
            .attendance
            .upsert(NewAttendanceRecord {
                lecture_id,
                student_id,
                status,
                marked_at: now,
                location: non_blank(location),
                device_info: non_blank(device_info),
            })
            .await?;

        info!(
            %lecture_id,
            %student_id,
            status = status.as_str(),
            created = upserted.created,
            "Attendance recorded"
        );

        Ok(MarkOutcome {
            record: upserted.record,
            lecture: lecture.summary(),
            created: upserted.created,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
