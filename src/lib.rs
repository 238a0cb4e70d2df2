//! install-advisor - installation scheduling advisor for window, blind and
//! awning projects.
//!
//! Given a project's line items, the advisor recommends labor hours, a
//! technician crew, the tools to bring and an installation date. It reads
//! from three collaborators (projects, personnel, installation history) and
//! never writes back.
//!
//! # Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use install_advisor::{Advisor, InMemoryArchive, InMemoryDirectory, InMemoryProjects};
//!
//! let advisor = Advisor::with_fallbacks(
//!     Arc::new(InMemoryProjects::new(projects)),
//!     Arc::new(InMemoryDirectory::default()),
//!     Arc::new(InMemoryArchive::default()),
//!     std::time::Duration::from_secs(5),
//! );
//! let bundle = advisor.generate_installation_suggestions("p-1").await?;
//! println!("{} h, start {}", bundle.time.estimated_hours, bundle.date.start_time);
//! ```
//!
//! # Project Structure
//!
//! - [`advisor`]: the recommendation pipeline and the [`Advisor`] entry point
//! - [`db`]: collaborator traits, in-memory implementations and fallbacks
//! - [`history`]: PostgreSQL store and lessons-learned analytics
//! - [`records`]: project documents, technicians and historical samples

pub mod advisor;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod records;

pub use advisor::{
    AdviceInputs, Advisor, AlternateEstimate, RecommendationBundle, SuggestionRequest,
};
pub use config::AdvisorConfig;
pub use db::{
    FixtureData, HistoricalArchive, InMemoryArchive, InMemoryDirectory, InMemoryProjects,
    PersonnelDirectory, ProjectRepository, SampleHistory, StaticRoster, WithFallback,
};
pub use error::{AdvisorError, ConfigError, DatabaseError, Result};
pub use history::Store;
pub use records::{CrewMember, HistoricalSample, ProjectRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
