//! Installation scheduling advisor.
//!
//! Given a project, produces a bundle of recommendations: labor time, crew,
//! tools and installation date. The pipeline is:
//!
//! ```text
//!   project ──► normalize ──► units ──┬─► complexity ──┬─► crew
//!                                     │                │
//!   personnel ───────────────────────►│                │
//!   history ──────────────────────────┼─► time ────────┼─► schedule
//!                                     └─► tools        │
//!                                                      ▼
//!                                                  aggregate ──► bundle
//! ```
//!
//! Every stage after the collaborator lookups is a pure function of its
//! inputs. The advisor never writes anything back.

pub mod bundle;
pub mod complexity;
pub mod crew;
pub mod normalize;
pub mod schedule;
pub mod time;
pub mod tools;

pub use bundle::{RecommendationBundle, StageOutputs};
pub use complexity::{ComplexityAssessment, ComplexityLevel};
pub use crew::CrewRecommendation;
pub use normalize::{InstallableUnit, InstallationType, ProductKind};
pub use schedule::{DateCandidate, DateRecommendation};
pub use time::{AlternateEstimate, TimeEstimate, TimeEstimator};
pub use tools::{Tool, ToolsRecommendation};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::MAX_HISTORY_LIMIT;
use crate::db::{
    HistoricalArchive, PersonnelDirectory, ProjectRepository, SampleHistory, StaticRoster,
    WithFallback,
};
use crate::error::{AdvisorError, Result};
use crate::history::lessons_learned;
use crate::records::{CrewMember, HistoricalSample, ProjectRecord};

/// Options for a single advisor run.
#[derive(Debug, Clone, Default)]
pub struct SuggestionRequest {
    pub project_id: String,
    /// Estimate from another model, blended 50/50 with the local one.
    pub alternate_estimate: Option<AlternateEstimate>,
    /// Reference day for date ranking. Defaults to the current UTC date.
    pub today: Option<NaiveDate>,
}

impl SuggestionRequest {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn with_alternate(mut self, alternate: AlternateEstimate) -> Self {
        self.alternate_estimate = Some(alternate);
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// Everything the pure pipeline needs once collaborators have answered.
#[derive(Debug, Clone, Copy)]
pub struct AdviceInputs<'a> {
    pub project: &'a ProjectRecord,
    pub technicians: &'a [CrewMember],
    pub history: &'a [HistoricalSample],
    pub today: NaiveDate,
    pub alternate: Option<&'a AlternateEstimate>,
}

/// The installation scheduling advisor.
pub struct Advisor {
    projects: Arc<dyn ProjectRepository>,
    personnel: Arc<dyn PersonnelDirectory>,
    history: Arc<dyn HistoricalArchive>,
    estimator: TimeEstimator,
    history_limit: usize,
}

impl Advisor {
    /// Create an advisor over the given collaborators, used as-is.
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        personnel: Arc<dyn PersonnelDirectory>,
        history: Arc<dyn HistoricalArchive>,
    ) -> Self {
        Self {
            projects,
            personnel,
            history,
            estimator: TimeEstimator::new(),
            history_limit: MAX_HISTORY_LIMIT,
        }
    }

    /// Create an advisor whose personnel and history lookups fall back to the
    /// built-in roster and sample history on failure or timeout.
    pub fn with_fallbacks(
        projects: Arc<dyn ProjectRepository>,
        personnel: Arc<dyn PersonnelDirectory>,
        history: Arc<dyn HistoricalArchive>,
        lookup_timeout: Duration,
    ) -> Self {
        Self::new(
            projects,
            Arc::new(WithFallback::new(
                "personnel",
                personnel,
                StaticRoster,
                lookup_timeout,
            )),
            Arc::new(WithFallback::new(
                "history",
                history,
                SampleHistory,
                lookup_timeout,
            )),
        )
    }

    /// Historical records fetched per request, capped at [`MAX_HISTORY_LIMIT`].
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        self
    }

    pub fn with_estimator(mut self, estimator: TimeEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Produce the recommendation bundle for a project.
    pub async fn generate_installation_suggestions(
        &self,
        project_id: &str,
    ) -> Result<RecommendationBundle> {
        self.suggest(&SuggestionRequest::new(project_id)).await
    }

    /// Produce the recommendation bundle with explicit request options.
    pub async fn suggest(&self, request: &SuggestionRequest) -> Result<RecommendationBundle> {
        let project = self
            .projects
            .find_project(&request.project_id)
            .await?
            .ok_or_else(|| AdvisorError::ProjectNotFound(request.project_id.clone()))?;

        let units = normalize::normalize(&project);
        let tags = product_tags(&units);

        // Without product tags there is nothing comparable to look up.
        let history_lookup = async {
            if tags.is_empty() {
                Ok(Vec::new())
            } else {
                self.history.recent_installations(&tags, self.history_limit).await
            }
        };
        let (technicians, history) = tokio::join!(self.personnel.technicians(), history_lookup);
        let technicians = technicians.map_err(|source| AdvisorError::Collaborator {
            collaborator: "personnel directory",
            source,
        })?;
        let mut history = history.map_err(|source| AdvisorError::Collaborator {
            collaborator: "historical archive",
            source,
        })?;
        history.truncate(self.history_limit);

        let today = request.today.unwrap_or_else(|| Utc::now().date_naive());
        let bundle = self.advise_units(
            AdviceInputs {
                project: &project,
                technicians: &technicians,
                history: &history,
                today,
                alternate: request.alternate_estimate.as_ref(),
            },
            &units,
            Utc::now(),
        );

        tracing::info!(
            project_id = %bundle.project_id,
            units = bundle.unit_count,
            hours = bundle.time.estimated_hours,
            crew_size = bundle.crew.members.len(),
            date = %bundle.date.recommended.date,
            confidence = bundle.overall_confidence,
            "Generated installation suggestions"
        );

        Ok(bundle)
    }

    /// Run the pure pipeline over already-fetched inputs.
    ///
    /// An empty technician list is replaced by the built-in roster, so the
    /// crew always has at least one member.
    pub fn advise(&self, inputs: AdviceInputs<'_>, generated_at: DateTime<Utc>) -> RecommendationBundle {
        let units = normalize::normalize(inputs.project);
        self.advise_units(inputs, &units, generated_at)
    }

    fn advise_units(
        &self,
        inputs: AdviceInputs<'_>,
        units: &[InstallableUnit],
        generated_at: DateTime<Utc>,
    ) -> RecommendationBundle {
        let project = inputs.project;

        let roster;
        let technicians = if inputs.technicians.is_empty() {
            tracing::warn!(
                project_id = %project.id,
                "No technicians available, using built-in roster"
            );
            roster = StaticRoster::members();
            roster.as_slice()
        } else {
            inputs.technicians
        };

        let complexity = complexity::evaluate(units);
        let time = self
            .estimator
            .estimate(units, inputs.history, inputs.alternate);
        let crew = crew::select_crew(units, &complexity, technicians);
        let tools = tools::recommend_tools(units);

        let booked = project
            .installation
            .as_ref()
            .map(|i| i.booked_dates())
            .unwrap_or_default();
        let date = schedule::recommend_date(
            &schedule::ScheduleContext {
                today: inputs.today,
                booked: &booked,
                any_motorized: units.iter().any(|u| u.motorized),
            },
            time.estimated_hours,
            units.len(),
        );

        tracing::debug!(
            project_id = %project.id,
            score = complexity.score,
            level = ?complexity.level,
            "Evaluated complexity"
        );

        bundle::aggregate(
            &project.id,
            project.name.clone(),
            units.len(),
            StageOutputs {
                complexity,
                time,
                crew,
                tools,
                date,
                lessons: lessons_learned(inputs.history),
            },
            generated_at,
        )
    }
}

/// Distinct family tags of the units, as the historical archive matches them.
fn product_tags(units: &[InstallableUnit]) -> Vec<String> {
    units
        .iter()
        .map(|u| ProductKind::family_tag(&u.product_type))
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
