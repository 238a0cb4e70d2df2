//! In-memory collaborators and the built-in fallback data.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::advisor::ProductKind;
use crate::db::{HistoricalArchive, PersonnelDirectory, ProjectRepository};
use crate::error::DatabaseError;
use crate::records::{CrewMember, HistoricalSample, ProjectRecord};

/// Projects held in memory, keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryProjects {
    projects: HashMap<String, ProjectRecord>,
}

impl InMemoryProjects {
    pub fn new(projects: impl IntoIterator<Item = ProjectRecord>) -> Self {
        Self {
            projects: projects.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn insert(&mut self, project: ProjectRecord) {
        self.projects.insert(project.id.clone(), project);
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn find_project(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        Ok(self.projects.get(id).cloned())
    }
}

/// A fixed list of technicians.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    members: Vec<CrewMember>,
}

impl InMemoryDirectory {
    pub fn new(members: Vec<CrewMember>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl PersonnelDirectory for InMemoryDirectory {
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        Ok(self.members.clone())
    }
}

/// Past installations, most recent first.
#[derive(Debug, Default, Clone)]
pub struct InMemoryArchive {
    samples: Vec<HistoricalSample>,
}

impl InMemoryArchive {
    pub fn new(samples: Vec<HistoricalSample>) -> Self {
        Self { samples }
    }
}

/// Whether a past job's product types overlap the requested ones.
///
/// Both sides are compared as family tags, so "Persiana enrollable" matches
/// "blinds". No requested types matches nothing.
fn shares_product_type(sample: &HistoricalSample, wanted: &[String]) -> bool {
    sample
        .product_types
        .iter()
        .map(|have| ProductKind::family_tag(have))
        .any(|have| wanted.iter().any(|want| ProductKind::family_tag(want) == have))
}

#[async_trait]
impl HistoricalArchive for InMemoryArchive {
    async fn recent_installations(
        &self,
        product_types: &[String],
        limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        Ok(self
            .samples
            .iter()
            .filter(|s| shares_product_type(s, product_types))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Built-in roster used when the personnel directory is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticRoster;

impl StaticRoster {
    pub fn members() -> Vec<CrewMember> {
        let member = |id: &str, name: &str, specialties: &[&str], experience: u32, is_lead: bool| {
            CrewMember {
                id: id.to_string(),
                name: name.to_string(),
                specialties: specialties.iter().map(|s| s.to_string()).collect(),
                experience,
                is_lead,
            }
        };

        vec![
            member("tec-01", "Carlos Méndez", &["blinds", "curtains", "motorization"], 8, true),
            member("tec-02", "Luis Ramírez", &["awnings", "motorization"], 6, false),
            member("tec-03", "Ana Torres", &["blinds", "curtains"], 4, false),
            member("tec-04", "Jorge Salinas", &["awnings"], 3, false),
        ]
    }
}

#[async_trait]
impl PersonnelDirectory for StaticRoster {
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        Ok(Self::members())
    }
}

/// Built-in sample history used when the archive is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleHistory;

impl SampleHistory {
    pub fn samples() -> Vec<HistoricalSample> {
        vec![
            HistoricalSample {
                actual_hours: 4.5,
                estimated_hours: 4.0,
                unit_count: 3,
                product_types: vec!["blinds".to_string()],
                notes: Some("Confirm wall material before drilling".to_string()),
            },
            HistoricalSample {
                actual_hours: 7.0,
                estimated_hours: 6.0,
                unit_count: 2,
                product_types: vec!["awnings".to_string()],
                notes: Some("Awning anchors needed a second welding pass".to_string()),
            },
            HistoricalSample {
                actual_hours: 3.0,
                estimated_hours: 3.5,
                unit_count: 4,
                product_types: vec!["curtains".to_string()],
                notes: None,
            },
        ]
    }
}

#[async_trait]
impl HistoricalArchive for SampleHistory {
    async fn recent_installations(
        &self,
        _product_types: &[String],
        limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        Ok(Self::samples().into_iter().take(limit).collect())
    }
}

/// Collaborator data loaded from a JSON file, for offline runs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureData {
    #[serde(default, alias = "proyectos")]
    pub projects: Vec<ProjectRecord>,
    #[serde(default, alias = "tecnicos")]
    pub technicians: Vec<CrewMember>,
    #[serde(default, alias = "historial")]
    pub history: Vec<HistoricalSample>,
}

impl FixtureData {
    pub fn from_file(path: &Path) -> Result<Self, DatabaseError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DatabaseError::Unavailable(format!("{}: {e}", path.display())))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Split into the three in-memory collaborators.
    pub fn into_collaborators(self) -> (InMemoryProjects, InMemoryDirectory, InMemoryArchive) {
        (
            InMemoryProjects::new(self.projects),
            InMemoryDirectory::new(self.technicians),
            InMemoryArchive::new(self.history),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(types: &[&str]) -> HistoricalSample {
        HistoricalSample {
            actual_hours: 2.0,
            product_types: types.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_archive_filters_and_limits() {
        let archive = InMemoryArchive::new(vec![
            sample(&["Persiana"]),
            sample(&["toldo"]),
            sample(&["blinds"]),
            sample(&["persiana enrollable"]),
        ]);

        let found = archive
            .recent_installations(&["persiana".to_string()], 2)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].product_types, vec!["Persiana"]);
        assert_eq!(found[1].product_types, vec!["blinds"]);
    }

    #[tokio::test]
    async fn test_archive_accepts_family_tags() {
        let archive = InMemoryArchive::new(vec![sample(&["Persiana enrollable"]), sample(&["toldo"])]);
        let found = archive
            .recent_installations(&["blinds".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_types, vec!["Persiana enrollable"]);
    }

    #[tokio::test]
    async fn test_archive_without_tags_returns_nothing() {
        let archive = InMemoryArchive::new(vec![sample(&["Persiana"]), sample(&["toldo"])]);
        assert!(archive.recent_installations(&[], 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_archive_matches_unclassified_tags_by_text() {
        let archive = InMemoryArchive::new(vec![sample(&["Ventana"]), sample(&["puerta"])]);
        let found = archive
            .recent_installations(&["ventana".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_static_fallbacks() {
        assert_eq!(StaticRoster.technicians().await.unwrap().len(), 4);
        assert_eq!(SampleHistory.recent_installations(&[], 2).await.unwrap().len(), 2);
    }

    #[test]
    fn test_fixture_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(
            &path,
            r#"{
                "proyectos": [{ "_id": "p-1", "productos": [{ "tipo": "persiana", "ancho": 2, "alto": 1.5 }] }],
                "tecnicos": [{ "id": "t-1", "nombre": "Ana", "especialidades": ["blinds"] }]
            }"#,
        )
        .unwrap();

        let fixture = FixtureData::from_file(&path).unwrap();
        assert_eq!(fixture.projects.len(), 1);
        assert_eq!(fixture.technicians[0].name, "Ana");
        assert!(fixture.history.is_empty());
    }
}
