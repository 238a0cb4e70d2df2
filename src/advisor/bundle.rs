//! The recommendation bundle returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advisor::complexity::ComplexityAssessment;
use crate::advisor::crew::CrewRecommendation;
use crate::advisor::schedule::DateRecommendation;
use crate::advisor::time::TimeEstimate;
use crate::advisor::tools::ToolsRecommendation;
use crate::history::LessonsLearned;

/// Confidence reported when there is nothing to average.
const BASELINE_CONFIDENCE: u8 = 50;

/// Every advisor output for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBundle {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub unit_count: usize,
    pub time: TimeEstimate,
    pub crew: CrewRecommendation,
    pub tools: ToolsRecommendation,
    pub date: DateRecommendation,
    pub complexity: ComplexityAssessment,
    pub lessons: LessonsLearned,
    pub overall_confidence: u8,
    pub generated_at: DateTime<Utc>,
}

/// The stage outputs before aggregation.
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub complexity: ComplexityAssessment,
    pub time: TimeEstimate,
    pub crew: CrewRecommendation,
    pub tools: ToolsRecommendation,
    pub date: DateRecommendation,
    pub lessons: LessonsLearned,
}

/// Rounded mean of the given confidences.
pub fn mean_confidence(values: &[u8]) -> u8 {
    if values.is_empty() {
        return BASELINE_CONFIDENCE;
    }
    let total: u32 = values.iter().map(|v| u32::from(*v)).sum();
    (total as f64 / values.len() as f64).round().min(100.0) as u8
}

/// Merge the stage outputs into a bundle.
pub fn aggregate(
    project_id: &str,
    project_name: Option<String>,
    unit_count: usize,
    outputs: StageOutputs,
    generated_at: DateTime<Utc>,
) -> RecommendationBundle {
    let overall_confidence = mean_confidence(&[
        outputs.time.confidence,
        outputs.crew.confidence,
        outputs.tools.confidence,
        outputs.date.confidence,
    ]);

    RecommendationBundle {
        project_id: project_id.to_string(),
        project_name,
        unit_count,
        time: outputs.time,
        crew: outputs.crew,
        tools: outputs.tools,
        date: outputs.date,
        complexity: outputs.complexity,
        lessons: outputs.lessons,
        overall_confidence,
        generated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_confidence() {
        assert_eq!(mean_confidence(&[]), 50);
        assert_eq!(mean_confidence(&[70, 95, 85, 75]), 81);
        assert_eq!(mean_confidence(&[100, 100]), 100);
        // 80.5 rounds away from zero
        assert_eq!(mean_confidence(&[80, 81]), 81);
    }
}
