//! Default seed script - creates an admin, teachers, students, courses and
//! a few weeks of simulated attendance.
//!
//! Run with:
//! ```
//! cargo run -p test-data --bin seed
//! ```
//!
//! Pass `--clear` to wipe existing data first.

use attendance::config::Config;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;
use test_data::builders::ScenarioBuilder;
use test_data::db::Seeder;
use test_data::AttendanceStatus;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Same environment as the server, so seeded statuses match its policy.
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../attendance/migrations").run(&pool).await?;

    if std::env::args().any(|arg| arg == "--clear") {
        Seeder::new(pool.clone()).clear_all().await?;
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(12345); // Reproducible data

    let result = ScenarioBuilder::new()
        .with_policy(config.policy)
        .build(&pool, &mut rng)
        .await?;

    // Summary output
    tracing::info!("Seed completed!");
    tracing::info!("  Admin: {}", result.admin.email);
    tracing::info!("  Teachers: {}", result.teachers.len());
    tracing::info!("  Students: {}", result.students.len());
    tracing::info!("  Courses: {}", result.courses.len());
    tracing::info!("  Enrollments: {}", result.enrollments.len());
    tracing::info!("  Lectures: {}", result.lectures.len());
    tracing::info!(
        "  Attendance: {} ({} present, {} late)",
        result.attendance.len(),
        result.count_status(AttendanceStatus::Present),
        result.count_status(AttendanceStatus::Late)
    );

    Ok(())
}
