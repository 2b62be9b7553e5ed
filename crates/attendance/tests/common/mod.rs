//! In-memory implementations of the storage ports shared by integration tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use attendance::{
    marker::{AttendanceMarker, AttendancePolicy, SharedAttendanceMarker},
    models::{AttendanceRecord, Lecture, NewAttendanceRecord},
    stores::{AttendanceStore, EnrollmentStore, LectureStore, StoreError, Upserted},
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    lectures: Mutex<HashMap<Uuid, Lecture>>,
    enrollments: Mutex<HashSet<(Uuid, Uuid)>>,
    records: Mutex<HashMap<(Uuid, Uuid), AttendanceRecord>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_lecture(&self, start: OffsetDateTime, end: OffsetDateTime) -> Lecture {
        let lecture = Lecture {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            course_name: "Operating Systems".to_string(),
            title: "Scheduling".to_string(),
            start_time: start,
            end_time: end,
            qr_code_data: None,
            created_at: start - Duration::days(7),
        };
        self.lectures
            .lock()
            .unwrap()
            .insert(lecture.id, lecture.clone());
        lecture
    }

    pub fn enroll(&self, student_id: Uuid, course_id: Uuid) {
        self.enrollments
            .lock()
            .unwrap()
            .insert((student_id, course_id));
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail as if the database were down.
    pub fn go_down(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn touch(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "connection refused: postgres://attendance:secret@db".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LectureStore for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lecture>, StoreError> {
        self.touch()?;
        Ok(self.lectures.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryStore {
    async fn exists(&self, student_id: Uuid, course_id: Uuid) -> Result<bool, StoreError> {
        self.touch()?;
        Ok(self
            .enrollments
            .lock()
            .unwrap()
            .contains(&(student_id, course_id)))
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn find_by_lecture_and_student(
        &self,
        lecture_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.touch()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(lecture_id, student_id))
            .cloned())
    }

    async fn upsert(&self, record: NewAttendanceRecord) -> Result<Upserted, StoreError> {
        self.touch()?;
        let mut records = self.records.lock().unwrap();
        let key = (record.lecture_id, record.student_id);
        let (id, created) = match records.get(&key) {
            Some(existing) => (existing.id, false),
            None => (Uuid::new_v4(), true),
        };
        let stored = record.into_record(id);
        records.insert(key, stored.clone());
        Ok(Upserted {
            record: stored,
            created,
        })
    }
}

pub fn marker(store: &Arc<InMemoryStore>) -> SharedAttendanceMarker {
    marker_with_policy(store, AttendancePolicy::default())
}

pub fn marker_with_policy(
    store: &Arc<InMemoryStore>,
    policy: AttendancePolicy,
) -> SharedAttendanceMarker {
    let lectures: Arc<dyn LectureStore> = store.clone();
    let enrollments: Arc<dyn EnrollmentStore> = store.clone();
    let attendance: Arc<dyn AttendanceStore> = store.clone();
    AttendanceMarker::new(lectures, enrollments, attendance, policy)
}

pub fn qr_for(lecture: &Lecture) -> String {
    format!(
        r#"{{"lectureId":"{}","title":"{}","timestamp":1741000000}}"#,
        lecture.id, lecture.title
    )
}
