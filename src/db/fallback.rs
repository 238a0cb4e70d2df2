//! Primary-with-fallback collaborator wrapper.
//!
//! The advisor never checks whether a collaborator is reachable. It talks to
//! a [`WithFallback`], which calls the primary under a deadline and, on
//! failure, logs a warning and answers from the fallback instead.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::db::{HistoricalArchive, PersonnelDirectory};
use crate::error::DatabaseError;
use crate::records::{CrewMember, HistoricalSample};

/// A collaborator backed by a fallback.
pub struct WithFallback<P, F> {
    name: &'static str,
    primary: P,
    fallback: F,
    timeout: Duration,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(name: &'static str, primary: P, fallback: F, timeout: Duration) -> Self {
        Self {
            name,
            primary,
            fallback,
            timeout,
        }
    }

    async fn bounded<T, Fut>(&self, lookup: Fut) -> Result<T, DatabaseError>
    where
        Fut: Future<Output = Result<T, DatabaseError>> + Send,
    {
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl<P, F> PersonnelDirectory for WithFallback<P, F>
where
    P: PersonnelDirectory,
    F: PersonnelDirectory,
{
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        match self.bounded(self.primary.technicians()).await {
            Ok(members) if !members.is_empty() => Ok(members),
            Ok(_) => {
                tracing::warn!(
                    collaborator = self.name,
                    "No technicians returned, using built-in roster"
                );
                self.fallback.technicians().await
            }
            Err(e) => {
                tracing::warn!(
                    collaborator = self.name,
                    "Lookup failed, using built-in roster: {}",
                    e
                );
                self.fallback.technicians().await
            }
        }
    }
}

#[async_trait]
impl<P, F> HistoricalArchive for WithFallback<P, F>
where
    P: HistoricalArchive,
    F: HistoricalArchive,
{
    async fn recent_installations(
        &self,
        product_types: &[String],
        limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        match self
            .bounded(self.primary.recent_installations(product_types, limit))
            .await
        {
            Ok(samples) => Ok(samples),
            Err(e) => {
                tracing::warn!(
                    collaborator = self.name,
                    "Lookup failed, using built-in sample history: {}",
                    e
                );
                self.fallback.recent_installations(product_types, limit).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryArchive, InMemoryDirectory, SampleHistory, StaticRoster};

    struct Broken;

    #[async_trait]
    impl PersonnelDirectory for Broken {
        async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
            Err(DatabaseError::Unavailable("directory offline".to_string()))
        }
    }

    #[async_trait]
    impl HistoricalArchive for Broken {
        async fn recent_installations(
            &self,
            _product_types: &[String],
            _limit: usize,
        ) -> Result<Vec<HistoricalSample>, DatabaseError> {
            Err(DatabaseError::Unavailable("archive offline".to_string()))
        }
    }

    struct Slow;

    #[async_trait]
    impl HistoricalArchive for Slow {
        async fn recent_installations(
            &self,
            _product_types: &[String],
            _limit: usize,
        ) -> Result<Vec<HistoricalSample>, DatabaseError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_directory_error_uses_fallback() {
        let directory = WithFallback::new("personnel", Broken, StaticRoster, Duration::from_secs(1));
        assert_eq!(directory.technicians().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_directory_uses_fallback() {
        let directory = WithFallback::new(
            "personnel",
            InMemoryDirectory::default(),
            StaticRoster,
            Duration::from_secs(1),
        );
        assert_eq!(directory.technicians().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_archive_is_valid() {
        let archive = WithFallback::new(
            "history",
            InMemoryArchive::default(),
            SampleHistory,
            Duration::from_secs(1),
        );
        assert!(archive.recent_installations(&[], 10).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_archive_times_out_to_fallback() {
        let archive = WithFallback::new("history", Slow, SampleHistory, Duration::from_secs(5));
        let samples = archive.recent_installations(&[], 10).await.unwrap();
        assert_eq!(samples.len(), 3);
    }

    #[tokio::test]
    async fn test_archive_error_uses_fallback() {
        let archive = WithFallback::new("history", Broken, SampleHistory, Duration::from_secs(1));
        assert_eq!(archive.recent_installations(&[], 10).await.unwrap().len(), 3);
    }
}
