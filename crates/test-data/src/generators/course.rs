//! Course, enrollment and lecture schedule generation.

use rand::{Rng, seq::SliceRandom};
use time::{Duration, OffsetDateTime, Time, macros::time};
use uuid::Uuid;

use attendance::qr::generate_qr_payload;

/// Subject catalogue used for course names and lecture titles.
const SUBJECTS: &[(&str, &str, &[&str])] = &[
    (
        "CS",
        "Operating Systems",
        &["Processes", "Scheduling", "Virtual Memory", "File Systems", "Deadlocks"],
    ),
    (
        "CS",
        "Databases",
        &["Relational Model", "SQL", "Indexing", "Transactions", "Recovery"],
    ),
    (
        "CS",
        "Computer Networks",
        &["Physical Layer", "Routing", "TCP", "Congestion Control", "DNS"],
    ),
    (
        "MATH",
        "Linear Algebra",
        &["Vector Spaces", "Matrices", "Determinants", "Eigenvalues", "Orthogonality"],
    ),
    (
        "MATH",
        "Probability",
        &["Counting", "Random Variables", "Expectation", "Limit Theorems", "Markov Chains"],
    ),
    (
        "PHYS",
        "Classical Mechanics",
        &["Kinematics", "Newton's Laws", "Energy", "Momentum", "Oscillations"],
    ),
];

/// Generated course data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedCourse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub teacher_id: Uuid,
    /// Index into the subject catalogue, used to title lectures.
    subject: usize,
}

/// Generated enrollment (student, course) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratedEnrollment {
    pub student_id: Uuid,
    pub course_id: Uuid,
}

/// Generated lecture data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedLecture {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_name: String,
    pub title: String,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub qr_code_data: String,
}

/// Generates courses and their enrollments.
#[derive(Default)]
pub struct CourseGenerator;

impl CourseGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates `count` courses, assigning teachers round-robin. Codes are
    /// unique within the batch.
    pub fn generate_batch(&self, count: usize, teacher_ids: &[Uuid]) -> Vec<GeneratedCourse> {
        if teacher_ids.is_empty() {
            return Vec::new();
        }

        (0..count)
            .map(|i| {
                let subject = i % SUBJECTS.len();
                let (prefix, name, _) = SUBJECTS[subject];

                GeneratedCourse {
                    id: Uuid::new_v4(),
                    code: format!("{prefix}{}", 101 + i),
                    name: name.to_string(),
                    teacher_id: teacher_ids[i % teacher_ids.len()],
                    subject,
                }
            })
            .collect()
    }

    /// Enrolls each student in each course with probability `rate`.
    /// Every course gets at least one student when any exist.
    pub fn generate_enrollments(
        &self,
        courses: &[GeneratedCourse],
        student_ids: &[Uuid],
        rate: f64,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedEnrollment> {
        let rate = rate.clamp(0.0, 1.0);
        let mut enrollments = Vec::new();

        for course in courses {
            let before = enrollments.len();
            for &student_id in student_ids {
                if rng.gen_bool(rate) {
                    enrollments.push(GeneratedEnrollment {
                        student_id,
                        course_id: course.id,
                    });
                }
            }
            if enrollments.len() == before {
                if let Some(&student_id) = student_ids.choose(rng) {
                    enrollments.push(GeneratedEnrollment {
                        student_id,
                        course_id: course.id,
                    });
                }
            }
        }

        enrollments
    }
}

/// Generates weekly lecture schedules.
pub struct LectureGenerator {
    /// Length of each lecture.
    pub duration: Duration,
    /// Time of day lectures start, in UTC.
    pub start_of_day: Time,
}

impl Default for LectureGenerator {
    fn default() -> Self {
        Self {
            duration: Duration::minutes(90),
            start_of_day: time!(9:00),
        }
    }
}

impl LectureGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates `count` weekly lectures for a course, the last one falling
    /// on the week of `anchor`. Courses are spread across weekdays and time
    /// slots so schedules don't all collide.
    pub fn generate_for_course(
        &self,
        course: &GeneratedCourse,
        count: usize,
        anchor: OffsetDateTime,
    ) -> Vec<GeneratedLecture> {
        let (_, _, topics) = SUBJECTS[course.subject];
        let day_offset = (course.subject % 5) as i64;
        let slot = Duration::hours(2 * (course.subject / 5) as i64);
        let last_start = anchor.replace_time(self.start_of_day) + Duration::days(day_offset) + slot
            - Duration::weeks(1);

        (0..count)
            .map(|i| {
                let weeks_back = (count - 1 - i) as i64;
                let start_time = last_start - Duration::weeks(weeks_back);
                let id = Uuid::new_v4();
                let title = format!("{}: {}", i + 1, topics[i % topics.len()]);
                let qr_code_data = generate_qr_payload(id, &title, start_time);

                GeneratedLecture {
                    id,
                    course_id: course.id,
                    course_name: course.name.clone(),
                    title,
                    start_time,
                    end_time: start_time + self.duration,
                    qr_code_data,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use time::macros::datetime;

    #[test]
    fn test_courses_assigned_round_robin() {
        let teachers = [Uuid::new_v4(), Uuid::new_v4()];
        let courses = CourseGenerator::new().generate_batch(8, &teachers);

        assert_eq!(courses.len(), 8);
        assert_eq!(courses[0].teacher_id, teachers[0]);
        assert_eq!(courses[1].teacher_id, teachers[1]);
        assert_eq!(courses[2].teacher_id, teachers[0]);

        let codes: std::collections::HashSet<_> = courses.iter().map(|c| &c.code).collect();
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn test_no_teachers_no_courses() {
        assert!(CourseGenerator::new().generate_batch(3, &[]).is_empty());
    }

    #[test]
    fn test_every_course_gets_a_student() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(12345);
        let generator = CourseGenerator::new();
        let courses = generator.generate_batch(4, &[Uuid::new_v4()]);
        let students: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let enrollments = generator.generate_enrollments(&courses, &students, 0.0, &mut rng);

        assert_eq!(enrollments.len(), courses.len());
        for course in &courses {
            assert!(enrollments.iter().any(|e| e.course_id == course.id));
        }
    }

    #[test]
    fn test_weekly_schedule() {
        let courses = CourseGenerator::new().generate_batch(1, &[Uuid::new_v4()]);
        let anchor = datetime!(2025-03-10 12:00 UTC);

        let lectures = LectureGenerator::new().generate_for_course(&courses[0], 4, anchor);

        assert_eq!(lectures.len(), 4);
        for pair in lectures.windows(2) {
            assert_eq!(pair[1].start_time - pair[0].start_time, Duration::weeks(1));
        }
        for lecture in &lectures {
            assert!(lecture.start_time < lecture.end_time);
            assert!(lecture.end_time < anchor);
            assert_eq!(
                attendance::marker::parse_qr_payload(&lecture.qr_code_data).unwrap(),
                lecture.id
            );
        }
    }
}
