//! Aggregation of past installations into a lessons-learned block.

use serde::{Deserialize, Serialize};

use crate::records::HistoricalSample;

const MAX_NOTES: usize = 5;
/// Deviation from estimates worth calling out (10%).
const NOTABLE_DEVIATION: f64 = 0.10;

/// What past installations say about this kind of job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonsLearned {
    pub sample_count: usize,
    pub avg_actual_hours: f64,
    pub avg_estimated_hours: f64,
    /// Actual over estimated hours; 1.0 when there is nothing to compare.
    pub overrun_ratio: f64,
    pub lessons: Vec<String>,
}

impl Default for LessonsLearned {
    fn default() -> Self {
        Self {
            sample_count: 0,
            avg_actual_hours: 0.0,
            avg_estimated_hours: 0.0,
            overrun_ratio: 1.0,
            lessons: vec![
                "No comparable past installations; record actual hours after this job".to_string(),
            ],
        }
    }
}

/// Summarise historical samples.
pub fn lessons_learned(samples: &[HistoricalSample]) -> LessonsLearned {
    if samples.is_empty() {
        return LessonsLearned::default();
    }

    let count = samples.len() as f64;
    let avg_actual = samples.iter().map(|s| s.effective_hours()).sum::<f64>() / count;
    let avg_estimated = samples.iter().map(|s| s.estimated_hours).sum::<f64>() / count;
    let overrun_ratio = if avg_estimated > 0.0 {
        avg_actual / avg_estimated
    } else {
        1.0
    };

    let mut lessons = Vec::new();
    if overrun_ratio > 1.0 + NOTABLE_DEVIATION {
        lessons.push(format!(
            "Similar jobs ran {:.0}% over their estimate; keep a time buffer",
            (overrun_ratio - 1.0) * 100.0
        ));
    } else if overrun_ratio < 1.0 - NOTABLE_DEVIATION {
        lessons.push(format!(
            "Similar jobs finished {:.0}% under their estimate",
            (1.0 - overrun_ratio) * 100.0
        ));
    } else {
        lessons.push("Past estimates for similar jobs were accurate".to_string());
    }

    for note in samples.iter().filter_map(|s| s.notes.as_deref()) {
        let note = note.trim();
        if note.is_empty() || lessons.iter().any(|l| l == note) {
            continue;
        }
        if lessons.len() > MAX_NOTES {
            break;
        }
        lessons.push(note.to_string());
    }

    LessonsLearned {
        sample_count: samples.len(),
        avg_actual_hours: round2(avg_actual),
        avg_estimated_hours: round2(avg_estimated),
        overrun_ratio: round2(overrun_ratio),
        lessons,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(actual: f64, estimated: f64, notes: Option<&str>) -> HistoricalSample {
        HistoricalSample {
            actual_hours: actual,
            estimated_hours: estimated,
            notes: notes.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_when_empty() {
        let lessons = lessons_learned(&[]);
        assert_eq!(lessons.sample_count, 0);
        assert_eq!(lessons.overrun_ratio, 1.0);
        assert_eq!(lessons.lessons.len(), 1);
    }

    #[test]
    fn test_overrun_lesson() {
        let samples = vec![
            sample(5.0, 4.0, Some("Bring extra anchors")),
            sample(5.0, 4.0, Some("Bring extra anchors")),
            sample(5.0, 4.0, None),
        ];
        let lessons = lessons_learned(&samples);
        assert_eq!(lessons.avg_actual_hours, 5.0);
        assert_eq!(lessons.overrun_ratio, 1.25);
        assert!(lessons.lessons[0].contains("25% over"));
        assert_eq!(lessons.lessons.len(), 2);
    }

    #[test]
    fn test_zero_estimates_are_guarded() {
        let lessons = lessons_learned(&[sample(3.0, 0.0, None)]);
        assert_eq!(lessons.overrun_ratio, 1.0);
    }

    #[test]
    fn test_notes_are_capped() {
        let notes: Vec<String> = (0..10).map(|i| format!("note {i}")).collect();
        let samples: Vec<_> = notes.iter().map(|n| sample(4.0, 4.0, Some(n))).collect();
        let lessons = lessons_learned(&samples);
        assert_eq!(lessons.lessons.len(), 1 + MAX_NOTES);
    }
}
