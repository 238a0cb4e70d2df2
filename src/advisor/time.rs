//! Labor time estimation.
//!
//! Each unit gets base hours from its product family, then a chain of
//! multipliers. The job factor is the worst per-unit factor: the hardest
//! unit sets the crew's pace. Historical samples and an optional alternate
//! model estimate are blended in afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::advisor::normalize::{InstallableUnit, InstallationType, ProductKind};
use crate::records::HistoricalSample;

/// Hours added to the base of a motorized unit for wiring and programming.
const MOTOR_FLAT_HOURS: f64 = 1.5;
/// Lowest estimate ever reported.
const MIN_ESTIMATE_HOURS: f64 = 1.0;
const THEORETICAL_WEIGHT: f64 = 0.6;
const HISTORICAL_WEIGHT: f64 = 0.4;
const ALTERNATE_WEIGHT: f64 = 0.5;

/// A multiplier applied to a single unit.
pub struct UnitRule {
    pub id: &'static str,
    pub multiplier: f64,
    applies: fn(&InstallableUnit) -> bool,
}

impl UnitRule {
    pub fn applies(&self, unit: &InstallableUnit) -> bool {
        (self.applies)(unit)
    }
}

/// Per-unit multipliers. Rules sharing a concern have disjoint predicates,
/// so at most one area rule and one mounting rule fire per unit.
pub const UNIT_RULES: &[UnitRule] = &[
    UnitRule {
        id: "awning",
        multiplier: 1.4,
        applies: |u| u.kind == ProductKind::Awning,
    },
    UnitRule {
        id: "area_over_10",
        multiplier: 1.3,
        applies: |u| u.area > 10.0,
    },
    UnitRule {
        id: "area_over_6",
        multiplier: 1.15,
        applies: |u| u.area > 6.0 && u.area <= 10.0,
    },
    UnitRule {
        id: "motorized",
        multiplier: 1.25,
        applies: |u| u.motorized,
    },
    UnitRule {
        id: "roof_mount",
        multiplier: 1.2,
        applies: |u| u.installation_type == InstallationType::Roof,
    },
    UnitRule {
        id: "embedded_mount",
        multiplier: 1.4,
        applies: |u| u.installation_type == InstallationType::Embedded,
    },
    UnitRule {
        id: "exterior_mount",
        multiplier: 1.3,
        applies: |u| u.installation_type == InstallationType::Exterior,
    },
    UnitRule {
        id: "oversize",
        multiplier: 1.2,
        applies: |u| u.is_oversize(),
    },
];

/// An estimate produced by some other model, blended 50/50 when supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateEstimate {
    pub hours: f64,
    /// Reported instead of the local factor when present.
    #[serde(default)]
    pub complexity_factor: Option<f64>,
}

/// Time breakdown for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEstimate {
    pub product_type: String,
    pub location: String,
    pub base_hours: f64,
    pub complexity_factor: f64,
    pub hours: f64,
    pub applied_rules: Vec<String>,
}

/// Labor estimate for the whole job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEstimate {
    pub estimated_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
    pub complexity_factor: f64,
    pub breakdown: Vec<UnitEstimate>,
    pub historical_samples: usize,
    pub recommendation: String,
    pub confidence: u8,
}

/// Estimates installation labor.
pub struct TimeEstimator {
    /// Base hours per product family.
    base_hours: HashMap<ProductKind, f64>,
    /// Base hours for anything unclassified.
    default_hours: f64,
}

impl TimeEstimator {
    /// Create a time estimator with the standard base hours.
    pub fn new() -> Self {
        let mut base_hours = HashMap::new();
        base_hours.insert(ProductKind::Blind, 1.5);
        base_hours.insert(ProductKind::Awning, 3.0);
        base_hours.insert(ProductKind::Curtain, 1.0);

        Self {
            base_hours,
            default_hours: 2.0,
        }
    }

    /// Base hours for a product family, before multipliers.
    pub fn base_hours(&self, kind: ProductKind) -> f64 {
        self.base_hours
            .get(&kind)
            .copied()
            .unwrap_or(self.default_hours)
    }

    /// Override the base hours of a product family.
    pub fn set_base_hours(&mut self, kind: ProductKind, hours: f64) {
        self.base_hours.insert(kind, hours);
    }

    /// Estimate a single unit.
    pub fn estimate_unit(&self, unit: &InstallableUnit) -> UnitEstimate {
        let mut base = self.base_hours(unit.kind);
        if unit.motorized {
            base += MOTOR_FLAT_HOURS;
        }

        let applied: Vec<&UnitRule> = UNIT_RULES.iter().filter(|r| r.applies(unit)).collect();
        let factor: f64 = applied.iter().map(|r| r.multiplier).product();

        UnitEstimate {
            product_type: unit.product_type.clone(),
            location: unit.location.clone(),
            base_hours: base,
            complexity_factor: factor,
            hours: base * factor,
            applied_rules: applied.iter().map(|r| r.id.to_string()).collect(),
        }
    }

    /// Estimate the whole job.
    pub fn estimate(
        &self,
        units: &[InstallableUnit],
        history: &[HistoricalSample],
        alternate: Option<&AlternateEstimate>,
    ) -> TimeEstimate {
        let breakdown: Vec<UnitEstimate> = units.iter().map(|u| self.estimate_unit(u)).collect();

        let theoretical: f64 = breakdown.iter().map(|e| e.hours).sum();
        let job_factor = breakdown
            .iter()
            .map(|e| e.complexity_factor)
            .fold(1.0_f64, f64::max);

        let mut hours = match historical_average(history) {
            Some(avg) => (theoretical * THEORETICAL_WEIGHT + avg * HISTORICAL_WEIGHT) * job_factor,
            None => theoretical * job_factor,
        };

        let mut reported_factor = job_factor;
        if let Some(alt) = alternate.filter(|a| a.hours.is_finite() && a.hours > 0.0) {
            hours = hours * (1.0 - ALTERNATE_WEIGHT) + alt.hours * ALTERNATE_WEIGHT;
            if let Some(f) = alt.complexity_factor.filter(|f| f.is_finite() && *f > 0.0) {
                reported_factor = f;
            }
        }

        let estimated = round1(hours.max(MIN_ESTIMATE_HOURS));
        let min_hours = (estimated * 0.8).ceil().min(estimated);
        let max_hours = (estimated * 1.3).ceil();

        let estimate = TimeEstimate {
            estimated_hours: estimated,
            min_hours,
            max_hours,
            complexity_factor: round2(reported_factor),
            recommendation: recommendation(estimated, history.len()),
            confidence: confidence(history.len(), job_factor),
            historical_samples: history.len(),
            breakdown,
        };

        tracing::debug!(
            hours = estimate.estimated_hours,
            factor = estimate.complexity_factor,
            samples = estimate.historical_samples,
            "Estimated installation time"
        );

        estimate
    }
}

impl Default for TimeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean effective hours of the samples, `None` when there are none.
pub fn historical_average(history: &[HistoricalSample]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: f64 = history.iter().map(|s| s.effective_hours()).sum();
    Some(total / history.len() as f64)
}

fn confidence(samples: usize, job_factor: f64) -> u8 {
    let mut confidence: u8 = 60;
    if samples > 5 {
        confidence += 20;
    }
    if samples > 10 {
        confidence += 10;
    }
    if job_factor < 1.2 {
        confidence += 10;
    }
    confidence.min(95)
}

fn recommendation(hours: f64, samples: usize) -> String {
    let plan = if hours <= 4.0 {
        "Half-day job; a single morning visit is enough".to_string()
    } else if hours <= 8.0 {
        "Full-day job; start early to finish in one visit".to_string()
    } else {
        let days = (hours / 8.0).ceil() as u32;
        format!("Multi-day job; plan {days} working days")
    };

    if samples == 0 {
        format!("{plan}. No comparable past installations, estimate is rule-based only")
    } else {
        format!("{plan}. Adjusted with {samples} past installations")
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
