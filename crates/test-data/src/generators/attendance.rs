//! Simulated QR scans for past lectures.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use attendance::marker::AttendancePolicy;
use attendance::models::{AttendanceStatus, Lecture};

use super::course::{GeneratedEnrollment, GeneratedLecture};
use crate::config::ScanTiming;

/// Generated attendance record ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedAttendance {
    pub id: Uuid,
    pub lecture_id: Uuid,
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub marked_at: OffsetDateTime,
    pub location: Option<String>,
    pub device_info: Option<String>,
}

/// Configuration for scan generation.
#[derive(Debug, Clone)]
pub struct AttendanceGenConfig {
    /// Probability that an enrolled student scans a lecture.
    pub attendance_rate: f64,
    /// When students scan relative to the lecture start.
    pub timing: ScanTiming,
    /// Probability that the client reported a location.
    pub location_rate: f64,
}

impl Default for AttendanceGenConfig {
    fn default() -> Self {
        Self {
            attendance_rate: 0.85,
            timing: ScanTiming::default(),
            location_rate: 0.6,
        }
    }
}

const ROOMS: &[&str] = &["Hall A", "Hall B", "Room 101", "Room 204", "Lab 3"];
const DEVICES: &[&str] = &[
    "Chrome on Android",
    "Safari on iOS",
    "Firefox on Android",
    "Samsung Internet",
];

/// Generates scans that the attendance service would have accepted.
///
/// Scan times are clamped into the eligibility window and statuses come from
/// the same [`AttendancePolicy`] the service uses, so seeded data is
/// indistinguishable from real scans.
pub struct AttendanceGenerator {
    config: AttendanceGenConfig,
    policy: AttendancePolicy,
}

impl AttendanceGenerator {
    /// Creates a new generator with default configuration and policy.
    pub fn new() -> Self {
        Self {
            config: AttendanceGenConfig::default(),
            policy: AttendancePolicy::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: AttendanceGenConfig, policy: AttendancePolicy) -> Self {
        Self { config, policy }
    }

    /// Generates scans for every enrolled student of the lecture's course.
    /// Lectures whose window has not closed by `now` are skipped.
    pub fn generate_for_lecture(
        &self,
        lecture: &GeneratedLecture,
        enrollments: &[GeneratedEnrollment],
        now: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedAttendance> {
        let lecture = as_lecture(lecture);
        let (opens, closes) = self.policy.window(&lecture);
        if closes > now {
            return Vec::new();
        }

        let rate = self.config.attendance_rate.clamp(0.0, 1.0);
        let location_rate = self.config.location_rate.clamp(0.0, 1.0);
        let mut scans = Vec::new();

        for enrollment in enrollments.iter().filter(|e| e.course_id == lecture.course_id) {
            if !rng.gen_bool(rate) {
                continue;
            }

            let marked_at = self.scan_time(&lecture, opens, closes, rng);
            let location = rng
                .gen_bool(location_rate)
                .then(|| ROOMS[rng.gen_range(0..ROOMS.len())].to_string());

            scans.push(GeneratedAttendance {
                id: Uuid::new_v4(),
                lecture_id: lecture.id,
                student_id: enrollment.student_id,
                status: self.policy.status_at(&lecture, marked_at),
                marked_at,
                location,
                device_info: Some(DEVICES[rng.gen_range(0..DEVICES.len())].to_string()),
            });
        }

        scans
    }

    fn scan_time(
        &self,
        lecture: &Lecture,
        opens: OffsetDateTime,
        closes: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> OffsetDateTime {
        let window_seconds = (closes - opens).whole_seconds();
        let at = match self.config.timing {
            ScanTiming::Uniform => opens + Duration::seconds(rng.gen_range(0..=window_seconds)),
            ScanTiming::Normal {
                mean_minutes,
                std_dev_minutes,
            } => {
                let minutes = Normal::new(mean_minutes, std_dev_minutes.max(0.0))
                    .map(|normal| normal.sample(rng))
                    .unwrap_or(mean_minutes);
                // Bounded to the window before building a Duration, which
                // panics on NaN or out-of-range seconds.
                let earliest = (opens - lecture.start_time).as_seconds_f64() / 60.0;
                let latest = (closes - lecture.start_time).as_seconds_f64() / 60.0;
                let minutes = if minutes.is_finite() {
                    minutes.clamp(earliest, latest)
                } else {
                    0.0
                };
                lecture.start_time + Duration::seconds_f64(minutes * 60.0)
            }
        };
        at.clamp(opens, closes)
    }
}

impl Default for AttendanceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn as_lecture(lecture: &GeneratedLecture) -> Lecture {
    Lecture {
        id: lecture.id,
        course_id: lecture.course_id,
        course_name: lecture.course_name.clone(),
        title: lecture.title.clone(),
        start_time: lecture.start_time,
        end_time: lecture.end_time,
        qr_code_data: Some(lecture.qr_code_data.clone()),
        created_at: lecture.start_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use time::macros::datetime;

    fn lecture() -> GeneratedLecture {
        let start = datetime!(2025-03-03 10:00 UTC);
        GeneratedLecture {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            course_name: "Databases".to_string(),
            title: "1: Relational Model".to_string(),
            start_time: start,
            end_time: start + Duration::minutes(90),
            qr_code_data: String::new(),
        }
    }

    fn enroll(lecture: &GeneratedLecture, count: usize) -> Vec<GeneratedEnrollment> {
        (0..count)
            .map(|_| GeneratedEnrollment {
                student_id: Uuid::new_v4(),
                course_id: lecture.course_id,
            })
            .collect()
    }

    #[test]
    fn test_scans_fall_inside_window_with_policy_status() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(12345);
        let lecture = lecture();
        let enrollments = enroll(&lecture, 200);
        let generator = AttendanceGenerator::with_config(
            AttendanceGenConfig {
                attendance_rate: 1.0,
                timing: ScanTiming::Uniform,
                location_rate: 0.5,
            },
            AttendancePolicy::default(),
        );

        let scans = generator.generate_for_lecture(
            &lecture,
            &enrollments,
            datetime!(2025-03-04 00:00 UTC),
            &mut rng,
        );

        assert_eq!(scans.len(), 200);
        let policy = AttendancePolicy::default();
        let as_model = as_lecture(&lecture);
        for scan in &scans {
            assert!(policy.is_active(&as_model, scan.marked_at));
            assert_eq!(scan.status, policy.status_at(&as_model, scan.marked_at));
        }
        assert!(scans.iter().any(|s| s.status == AttendanceStatus::Late));
        assert!(scans.iter().any(|s| s.status == AttendanceStatus::Present));
    }

    #[test]
    fn test_open_lecture_is_skipped() {
        let mut rng = rand::thread_rng();
        let lecture = lecture();
        let enrollments = enroll(&lecture, 5);

        let scans = AttendanceGenerator::new().generate_for_lecture(
            &lecture,
            &enrollments,
            datetime!(2025-03-03 10:30 UTC),
            &mut rng,
        );

        assert!(scans.is_empty());
    }

    #[test]
    fn test_other_course_enrollments_ignored() {
        let mut rng = rand::thread_rng();
        let lecture = lecture();
        let strangers: Vec<_> = (0..5)
            .map(|_| GeneratedEnrollment {
                student_id: Uuid::new_v4(),
                course_id: Uuid::new_v4(),
            })
            .collect();

        let scans = AttendanceGenerator::new().generate_for_lecture(
            &lecture,
            &strangers,
            datetime!(2025-03-04 00:00 UTC),
            &mut rng,
        );

        assert!(scans.is_empty());
    }

    #[test]
    fn test_degenerate_normal_timing_stays_in_window() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let lecture = lecture();
        let enrollments = enroll(&lecture, 20);
        let policy = AttendancePolicy::default();
        let as_model = as_lecture(&lecture);

        for (mean_minutes, std_dev_minutes) in [
            (f64::NAN, 5.0),
            (f64::INFINITY, 5.0),
            (f64::MAX, 0.0),
            (-1e300, 1e300),
            (1.0, f64::NAN),
        ] {
            let generator = AttendanceGenerator::with_config(
                AttendanceGenConfig {
                    attendance_rate: 1.0,
                    timing: ScanTiming::Normal {
                        mean_minutes,
                        std_dev_minutes,
                    },
                    location_rate: 0.0,
                },
                policy,
            );

            let scans = generator.generate_for_lecture(
                &lecture,
                &enrollments,
                datetime!(2025-03-04 00:00 UTC),
                &mut rng,
            );

            assert_eq!(scans.len(), 20);
            for scan in &scans {
                assert!(policy.is_active(&as_model, scan.marked_at), "mean {mean_minutes}");
            }
        }
    }
}
