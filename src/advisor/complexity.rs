//! Job complexity scoring.
//!
//! Scoring is additive over a fixed rule table. Each rule looks at the whole
//! unit list, so the result does not depend on unit order.

use serde::{Deserialize, Serialize};

use crate::advisor::normalize::{InstallableUnit, ProductKind};

/// Complexity level derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn from_score(score: u32) -> Self {
        if score <= 20 {
            Self::Low
        } else if score <= 50 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Fixed guidance attached to each level.
    pub fn guidance(&self) -> &'static [&'static str] {
        match self {
            Self::Low => &[
                "A two-person crew is enough for this job",
                "Standard hand tools cover the installation",
            ],
            Self::Medium => &[
                "Plan for a two to three person crew",
                "Bring a ladder and confirm fixing hardware before leaving",
            ],
            Self::High => &[
                "Assign at least three technicians including a specialist",
                "Load heavy equipment and scaffolding; schedule an early start",
            ],
        }
    }
}

/// One scoring rule.
pub struct ComplexityRule {
    pub id: &'static str,
    pub description: &'static str,
    pub points: u32,
    applies: fn(&[InstallableUnit]) -> bool,
}

impl ComplexityRule {
    pub fn applies(&self, units: &[InstallableUnit]) -> bool {
        (self.applies)(units)
    }
}

fn total_area(units: &[InstallableUnit]) -> f64 {
    units.iter().map(|u| u.area).sum()
}

/// The scoring table. The two unit-count rules are mutually exclusive.
pub const RULES: &[ComplexityRule] = &[
    ComplexityRule {
        id: "many_units",
        description: "More than 5 units to install",
        points: 30,
        applies: |units| units.len() > 5,
    },
    ComplexityRule {
        id: "several_units",
        description: "Between 3 and 5 units to install",
        points: 15,
        applies: |units| units.len() > 2 && units.len() <= 5,
    },
    ComplexityRule {
        id: "motorized",
        description: "Includes motorized units",
        points: 25,
        applies: |units| units.iter().any(|u| u.motorized),
    },
    ComplexityRule {
        id: "awning",
        description: "Includes awnings",
        points: 20,
        applies: |units| units.iter().any(|u| u.kind == ProductKind::Awning),
    },
    ComplexityRule {
        id: "large_area",
        description: "Total area above 30 m²",
        points: 20,
        applies: |units| total_area(units) > 30.0,
    },
];

/// Result of a complexity evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityAssessment {
    pub score: u32,
    pub level: ComplexityLevel,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub extra_hours_suggested: u32,
    pub confidence: u8,
}

const CONFIDENCE: u8 = 90;

/// Score a unit list.
pub fn evaluate(units: &[InstallableUnit]) -> ComplexityAssessment {
    let triggered: Vec<&ComplexityRule> = RULES.iter().filter(|r| r.applies(units)).collect();
    let score: u32 = triggered.iter().map(|r| r.points).sum();
    let level = ComplexityLevel::from_score(score);

    ComplexityAssessment {
        score,
        level,
        factors: triggered.iter().map(|r| r.description.to_string()).collect(),
        recommendations: level.guidance().iter().map(|s| s.to_string()).collect(),
        extra_hours_suggested: score.div_ceil(20),
        confidence: CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::test_support::unit;

    #[test]
    fn test_empty_is_low() {
        let assessment = evaluate(&[]);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, ComplexityLevel::Low);
        assert_eq!(assessment.extra_hours_suggested, 0);
        assert!(assessment.factors.is_empty());
        assert_eq!(assessment.confidence, 90);
    }

    #[test]
    fn test_unit_count_rules() {
        let three: Vec<_> = (0..3).map(|_| unit(ProductKind::Blind, 1.0, false)).collect();
        assert_eq!(evaluate(&three).score, 15);

        let six: Vec<_> = (0..6).map(|_| unit(ProductKind::Blind, 1.0, false)).collect();
        assert_eq!(evaluate(&six).score, 30);
    }

    #[test]
    fn test_each_rule_in_isolation() {
        assert_eq!(evaluate(&[unit(ProductKind::Blind, 1.0, true)]).score, 25);
        assert_eq!(evaluate(&[unit(ProductKind::Awning, 1.0, false)]).score, 20);
        assert_eq!(evaluate(&[unit(ProductKind::Blind, 31.0, false)]).score, 20);
    }

    #[test]
    fn test_levels_and_extra_hours() {
        assert_eq!(ComplexityLevel::from_score(20), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::from_score(21), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(50), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(51), ComplexityLevel::High);

        let units = vec![unit(ProductKind::Awning, 1.0, true)];
        let assessment = evaluate(&units);
        assert_eq!(assessment.score, 45);
        assert_eq!(assessment.level, ComplexityLevel::Medium);
        assert_eq!(assessment.extra_hours_suggested, 3);
        assert_eq!(assessment.factors.len(), 2);
    }

    #[test]
    fn test_order_independent() {
        let mut units = vec![
            unit(ProductKind::Awning, 12.0, false),
            unit(ProductKind::Blind, 20.0, true),
            unit(ProductKind::Curtain, 1.0, false),
        ];
        let forward = evaluate(&units);
        units.reverse();
        assert_eq!(evaluate(&units), forward);
    }
}
