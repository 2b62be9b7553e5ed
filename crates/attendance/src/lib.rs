pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod marker;
pub mod models;
pub mod qr;
pub mod request_id;
pub mod stores;

use axum::{
    Extension, Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    database::Database,
    handlers::{
        all_users, attendance_routes, create_course, create_lecture, create_user,
        enroll_student, get_lecture, get_lecture_attendance, get_student_attendance,
        health_check, list_course_lectures, list_course_students, list_courses,
        regenerate_qr_code,
    },
    marker::{AttendancePolicy, SharedAttendanceMarker},
    request_id::request_id_middleware,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "QR Attendance API", version = "0.1.0"),
    paths(
        handlers::attendance::mark_attendance,
        handlers::attendance::get_student_lecture_attendance,
        handlers::health::health_check,
        handlers::users::create_user,
        handlers::users::all_users,
        handlers::courses::create_course,
        handlers::courses::list_courses,
        handlers::courses::enroll_student,
        handlers::courses::list_course_students,
        handlers::lectures::create_lecture,
        handlers::lectures::list_course_lectures,
        handlers::lectures::get_lecture,
        handlers::lectures::regenerate_qr_code,
        handlers::lectures::get_lecture_attendance,
        handlers::students::get_student_attendance,
    ),
    tags(
        (name = "attendance", description = "QR attendance marking"),
        (name = "lectures", description = "Lecture scheduling and reports"),
        (name = "courses", description = "Courses and enrollments"),
        (name = "students", description = "Student attendance history"),
        (name = "users", description = "User management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Request id tracing, CORS, compression and security headers shared by
/// every route.
pub fn with_common_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

pub fn create_router(pool: PgPool, policy: AttendancePolicy) -> Router {
    let db = Database::new(pool);
    let marker = SharedAttendanceMarker::from_database(db.clone(), policy);

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        // User routes
        .route("/users", get(all_users).post(create_user))
        // Course routes
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}/students", get(list_course_students))
        .route("/courses/{id}/enrollments", post(enroll_student))
        .route(
            "/courses/{id}/lectures",
            get(list_course_lectures).post(create_lecture),
        )
        // Lecture routes
        .route("/lectures/{id}", get(get_lecture))
        .route("/lectures/{id}/qr", post(regenerate_qr_code))
        .route("/lectures/{id}/attendance", get(get_lecture_attendance))
        // Student routes
        .route("/students/{id}/attendance", get(get_student_attendance))
        .layer(Extension(db))
        .merge(attendance_routes(marker));

    with_common_layers(api)
}

pub async fn run_server(pool: PgPool, config: &Config) -> anyhow::Result<()> {
    let app = create_router(pool, config.policy);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(
        port = config.port,
        buffer_minutes = config.policy.buffer.whole_minutes(),
        late_minutes = config.policy.late_threshold.whole_minutes(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves once `signal` fires. A listener that fails to install never
/// resolves, so the server keeps running instead of shutting down at once.
async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
