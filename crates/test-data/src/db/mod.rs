//! Database integration for seeding test data.
//!
//! The [`Seeder`] inserts generated test data into the database in batches,
//! in foreign-key order.

mod seeder;

pub use seeder::{SeedError, Seeder};
