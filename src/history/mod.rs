//! Installation history and persistence layer.
//!
//! Reads projects, technicians and past installations from PostgreSQL, and
//! turns past installations into lessons for new jobs.

mod analytics;
mod store;

pub use analytics::{LessonsLearned, lessons_learned};
pub use store::Store;
