//! Crew selection.
//!
//! A greedy set cover over the specialties the job needs: candidates are
//! ranked once by how many required specialties they hold, then taken in
//! order while they add coverage or the crew is still below two people.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::advisor::complexity::{ComplexityAssessment, ComplexityLevel};
use crate::advisor::normalize::InstallableUnit;
use crate::records::CrewMember;

pub const SPECIALTY_MOTORIZATION: &str = "motorization";

const MIN_CREW: usize = 2;
const MAX_CREW: usize = 4;
const HIGH_COMPLEXITY_CREW: usize = 3;

/// Selected crew and the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewRecommendation {
    pub members: Vec<CrewMember>,
    pub required_specialties: BTreeSet<String>,
    pub lead: Option<CrewMember>,
    pub rationale: Vec<String>,
    pub coverage_ratio: f64,
    pub confidence: u8,
}

/// Specialties the job needs.
pub fn required_specialties(units: &[InstallableUnit]) -> BTreeSet<String> {
    let mut required = BTreeSet::new();
    for unit in units {
        if let Some(family) = unit.kind.family() {
            required.insert(family.to_string());
        }
        if unit.motorized {
            required.insert(SPECIALTY_MOTORIZATION.to_string());
        }
    }
    required
}

fn held<'a>(member: &CrewMember, required: &'a BTreeSet<String>) -> Vec<&'a String> {
    required.iter().filter(|s| member.has_specialty(s)).collect()
}

/// Pick a crew from the available technicians.
pub fn select_crew(
    units: &[InstallableUnit],
    complexity: &ComplexityAssessment,
    candidates: &[CrewMember],
) -> CrewRecommendation {
    let required = required_specialties(units);

    let mut ranked: Vec<&CrewMember> = candidates.iter().collect();
    ranked.sort_by_key(|m| (Reverse(held(m, &required).len()), Reverse(m.experience), m.id.clone()));

    let mut covered: BTreeSet<String> = BTreeSet::new();
    let mut selected: Vec<&CrewMember> = Vec::new();
    let mut rationale = Vec::new();

    for &member in &ranked {
        if selected.len() >= MAX_CREW {
            break;
        }
        let adds: Vec<&String> = held(member, &required)
            .into_iter()
            .filter(|s| !covered.contains(*s))
            .collect();

        if !adds.is_empty() {
            rationale.push(format!(
                "{} covers {}",
                member.name,
                adds.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            ));
            covered.extend(adds.into_iter().cloned());
            selected.push(member);
        } else if selected.len() < MIN_CREW {
            rationale.push(format!(
                "{} added to reach the two-person minimum",
                member.name
            ));
            selected.push(member);
        }
    }

    if complexity.level == ComplexityLevel::High && selected.len() < HIGH_COMPLEXITY_CREW {
        let extra = ranked
            .iter()
            .find(|m| !selected.iter().any(|s| s.id == m.id))
            .copied();
        if let Some(member) = extra {
            rationale.push(format!(
                "{} added for a high complexity job",
                member.name
            ));
            selected.push(member);
        }
    }

    let lead = selected
        .iter()
        .find(|m| m.is_lead)
        .or_else(|| selected.first())
        .map(|m| (*m).clone());

    if let Some(lead) = &lead {
        if lead.is_lead {
            rationale.push(format!("{} leads as a designated crew lead", lead.name));
        } else {
            rationale.push(format!(
                "{} leads as the best-ranked member; no designated lead available",
                lead.name
            ));
        }
    }

    let missing: Vec<&String> = required.difference(&covered).collect();
    if !missing.is_empty() {
        rationale.push(format!(
            "No available technician covers: {}",
            missing.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }

    let coverage_ratio = if required.is_empty() {
        1.0
    } else {
        covered.len() as f64 / required.len() as f64
    };
    let confidence = (coverage_ratio * 80.0 + 15.0).round().clamp(0.0, 100.0) as u8;

    tracing::debug!(
        crew_size = selected.len(),
        coverage = coverage_ratio,
        "Selected installation crew"
    );

    CrewRecommendation {
        members: selected.into_iter().cloned().collect(),
        required_specialties: required,
        lead,
        rationale,
        coverage_ratio,
        confidence,
    }
}
