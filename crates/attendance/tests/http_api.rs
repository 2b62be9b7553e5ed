//! HTTP-level tests of the attendance routes, backed by in-memory stores.

mod common;

use attendance::{handlers::attendance_routes, request_id::REQUEST_ID_HEADER, with_common_layers};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{InMemoryStore, marker, qr_for};
use serde_json::{Value, json};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

fn app(store: &Arc<InMemoryStore>) -> Router {
    with_common_layers(attendance_routes(marker(store)))
}

/// A lecture that started five minutes ago with one enrolled student.
fn running_lecture() -> (Arc<InMemoryStore>, attendance::models::Lecture, Uuid) {
    let store = InMemoryStore::new();
    let now = OffsetDateTime::now_utc();
    let lecture = store.add_lecture(now - Duration::minutes(5), now + Duration::minutes(55));
    let student = Uuid::new_v4();
    store.enroll(student, lecture.course_id);
    (store, lecture, student)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_mark_attendance_success() {
    let (store, lecture, student) = running_lecture();

    let (status, body) = post_json(
        app(&store),
        "/attendance/mark",
        json!({
            "qrCodeData": qr_for(&lecture),
            "studentId": student.to_string(),
            "location": "Hall B",
            "deviceInfo": "Firefox on Android",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Attendance marked successfully");
    assert_eq!(body["attendance"]["status"], "present");
    assert_eq!(body["attendance"]["studentId"], student.to_string());
    assert_eq!(body["attendance"]["location"], "Hall B");
    assert_eq!(body["lecture"]["id"], lecture.id.to_string());
    assert_eq!(body["lecture"]["courseName"], "Operating Systems");
}

#[tokio::test]
async fn test_second_scan_reports_update() {
    let (store, lecture, student) = running_lecture();
    let request = json!({
        "qrCodeData": qr_for(&lecture),
        "studentId": student.to_string(),
    });

    let (status, _) = post_json(app(&store), "/attendance/mark", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post_json(app(&store), "/attendance/mark", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Attendance updated successfully");
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_error_statuses() {
    let (store, lecture, student) = running_lecture();
    let finished = {
        let now = OffsetDateTime::now_utc();
        store.add_lecture(now - Duration::hours(3), now - Duration::hours(2))
    };
    store.enroll(student, finished.course_id);

    let cases = [
        (
            json!({ "studentId": student.to_string() }),
            StatusCode::BAD_REQUEST,
            "missing_field",
        ),
        (
            json!({ "qrCodeData": "https://example.com/lecture", "studentId": student.to_string() }),
            StatusCode::BAD_REQUEST,
            "invalid_payload",
        ),
        (
            json!({ "qrCodeData": qr_for(&finished), "studentId": student.to_string() }),
            StatusCode::BAD_REQUEST,
            "lecture_not_active",
        ),
        (
            json!({ "qrCodeData": qr_for(&lecture), "studentId": Uuid::new_v4().to_string() }),
            StatusCode::FORBIDDEN,
            "not_enrolled",
        ),
        (
            json!({
                "qrCodeData": json!({ "lectureId": Uuid::new_v4().to_string() }).to_string(),
                "studentId": student.to_string(),
            }),
            StatusCode::NOT_FOUND,
            "lecture_not_found",
        ),
        (
            json!({ "qrCodeData": 12, "studentId": student.to_string() }),
            StatusCode::BAD_REQUEST,
            "malformed_body",
        ),
    ];

    for (request, expected_status, expected_code) in cases {
        let (status, body) = post_json(app(&store), "/attendance/mark", request).await;
        assert_eq!(status, expected_status, "{body}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], expected_code);
    }
}

#[tokio::test]
async fn test_store_error_does_not_leak_details() {
    let (store, lecture, student) = running_lecture();
    store.go_down();

    let (status, body) = post_json(
        app(&store),
        "/attendance/mark",
        json!({ "qrCodeData": qr_for(&lecture), "studentId": student.to_string() }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store_error");
    assert!(!body.to_string().contains("secret"));
}

#[tokio::test]
async fn test_get_single_record() {
    let (store, lecture, student) = running_lecture();
    let uri = format!("/lectures/{}/attendance/{}", lecture.id, student);

    let response = app(&store)
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    post_json(
        app(&store),
        "/attendance/mark",
        json!({ "qrCodeData": qr_for(&lecture), "studentId": student.to_string() }),
    )
    .await;

    let response = app(&store)
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["lectureId"], lecture.id.to_string());
    assert_eq!(body["status"], "present");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (store, _, _) = running_lecture();
    let uri = format!("/lectures/{}/attendance/{}", Uuid::new_v4(), Uuid::new_v4());

    let response = app(&store)
        .oneshot(
            Request::builder()
                .uri(&uri)
                .header(&REQUEST_ID_HEADER, "scan-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[&REQUEST_ID_HEADER], "scan-42");

    let response = app(&store)
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers()[&REQUEST_ID_HEADER].to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());
}
