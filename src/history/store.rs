//! PostgreSQL store backing the advisor's collaborators.

use std::collections::BTreeSet;

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::advisor::ProductKind;
use crate::config::DatabaseConfig;
use crate::db::{HistoricalArchive, PersonnelDirectory, ProjectRepository};
use crate::error::DatabaseError;
use crate::records::{CrewMember, HistoricalSample, ProjectRecord};

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Database store for projects, technicians and installation history.
pub struct Store {
    pool: Pool,
}

impl Store {
    /// Create a new store and connect to the database.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut cfg = Config::new();
        cfg.url = Some(config.url().to_string());
        cfg.pool = Some(deadpool_postgres::PoolConfig {
            max_size: config.pool_size,
            ..Default::default()
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::Pool(e.to_string()))?;

        // Test connection
        let _ = pool.get().await?;

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let mut conn = self.conn().await?;
        let client: &mut tokio_postgres::Client = &mut conn;
        let report = embedded::migrations::runner()
            .run_async(client)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        tracing::info!(
            applied = report.applied_migrations().len(),
            "Database migrations complete"
        );
        Ok(())
    }

    /// Get a connection from the pool.
    pub async fn conn(&self) -> Result<deadpool_postgres::Object, DatabaseError> {
        Ok(self.pool.get().await?)
    }

    // ==================== Projects ====================

    /// Load a project document by id.
    pub async fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        let conn = self.conn().await?;

        let row = conn
            .query_opt("SELECT id, document FROM projects WHERE id = $1", &[&id])
            .await?;

        match row {
            Some(row) => {
                let mut document: serde_json::Value = row.get("document");
                // The row id is authoritative even if the document omits it.
                if let Some(obj) = document.as_object_mut() {
                    obj.insert("id".to_string(), serde_json::Value::String(row.get("id")));
                    obj.remove("_id");
                }
                Ok(Some(serde_json::from_value(document)?))
            }
            None => Ok(None),
        }
    }

    // ==================== Technicians ====================

    /// List active technicians.
    pub async fn list_technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        let conn = self.conn().await?;

        let rows = conn
            .query(
                r#"
                SELECT id, name, specialties, experience, is_lead
                FROM technicians
                WHERE active = true
                ORDER BY id
                "#,
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| CrewMember {
                id: row.get("id"),
                name: row.get("name"),
                specialties: row.get("specialties"),
                experience: row.get::<_, i32>("experience").max(0) as u32,
                is_lead: row.get("is_lead"),
            })
            .collect())
    }

    // ==================== Installation history ====================

    /// Most recent completed or in-progress installations sharing a product
    /// family with `product_types`. Stored tags are mapped through the
    /// `product_family` SQL function, requested ones through
    /// [`ProductKind::family_tag`], so free-text variants match.
    pub async fn get_installation_history(
        &self,
        product_types: &[String],
        limit: i64,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        let wanted: Vec<String> = product_types
            .iter()
            .map(|t| ProductKind::family_tag(t))
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if wanted.is_empty() || limit <= 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn().await?;
        let rows = conn
            .query(
                r#"
                SELECT product_types, actual_hours, estimated_hours, unit_count, notes
                FROM installation_history h
                WHERE status IN ('completed', 'in_progress')
                  AND EXISTS (
                      SELECT 1 FROM unnest(h.product_types) AS t(tag)
                      WHERE product_family(t.tag) = ANY($1::text[])
                  )
                ORDER BY completed_at DESC NULLS LAST
                LIMIT $2
                "#,
                &[&wanted, &limit],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| HistoricalSample {
                product_types: row.get("product_types"),
                actual_hours: row.get::<_, Option<f64>>("actual_hours").unwrap_or(0.0),
                estimated_hours: row.get::<_, Option<f64>>("estimated_hours").unwrap_or(0.0),
                unit_count: row.get::<_, i32>("unit_count").max(0) as u32,
                notes: row.get("notes"),
            })
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for Store {
    async fn find_project(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        self.get_project(id).await
    }
}

#[async_trait]
impl PersonnelDirectory for Store {
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        self.list_technicians().await
    }
}

#[async_trait]
impl HistoricalArchive for Store {
    async fn recent_installations(
        &self,
        product_types: &[String],
        limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        self.get_installation_history(product_types, limit as i64).await
    }
}
