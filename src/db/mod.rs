//! Collaborator interfaces.
//!
//! The advisor reads from three external sources: the project repository,
//! the personnel directory and the historical archive. All three are
//! read-only from the advisor's point of view.

mod fallback;
mod memory;

pub use fallback::WithFallback;
pub use memory::{
    FixtureData, InMemoryArchive, InMemoryDirectory, InMemoryProjects, SampleHistory, StaticRoster,
};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::records::{CrewMember, HistoricalSample, ProjectRecord};

/// Source of project aggregates.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Fetch a project by id. `Ok(None)` means it does not exist.
    async fn find_project(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError>;
}

/// Source of technicians.
#[async_trait]
pub trait PersonnelDirectory: Send + Sync {
    /// Active technicians with their specialties.
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError>;
}

/// Source of past installations.
#[async_trait]
pub trait HistoricalArchive: Send + Sync {
    /// Up to `limit` most recent completed or in-progress installations
    /// sharing a product type with `product_types`. An empty result is valid.
    async fn recent_installations(
        &self,
        product_types: &[String],
        limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError>;
}

#[async_trait]
impl<T: ProjectRepository + ?Sized> ProjectRepository for Arc<T> {
    async fn find_project(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        (**self).find_project(id).await
    }
}

#[async_trait]
impl<T: PersonnelDirectory + ?Sized> PersonnelDirectory for Arc<T> {
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        (**self).technicians().await
    }
}

#[async_trait]
impl<T: HistoricalArchive + ?Sized> HistoricalArchive for Arc<T> {
    async fn recent_installations(
        &self,
        product_types: &[String],
        limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        (**self).recent_installations(product_types, limit).await
    }
}
