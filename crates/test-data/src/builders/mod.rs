//! Fluent builder APIs for test scenarios.
//!
//! The [`ScenarioBuilder`] provides a convenient way to construct complete
//! test scenarios with users, courses, lectures and attendance.

mod scenario;

pub use scenario::{ScenarioBuilder, ScenarioResult};
