//! Tool list derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::advisor::normalize::{InstallableUnit, InstallationType, ProductKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    PercussionDrill,
    LaserLevel,
    ExtendableLadder,
    WeldingKit,
    MobileScaffolding,
    MotorizationKit,
    TensionMeter,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PercussionDrill => "percussion drill",
            Self::LaserLevel => "laser level",
            Self::ExtendableLadder => "extendable ladder",
            Self::WeldingKit => "welding kit",
            Self::MobileScaffolding => "mobile scaffolding",
            Self::MotorizationKit => "motorization kit",
            Self::TensionMeter => "tension meter",
        };
        f.write_str(label)
    }
}

/// Tools every job carries.
pub const BASELINE: &[Tool] = &[Tool::PercussionDrill, Tool::LaserLevel];

/// A per-unit rule adding required and optional tools.
pub struct ToolRule {
    pub id: &'static str,
    pub rationale: &'static str,
    pub required: &'static [Tool],
    pub optional: &'static [Tool],
    applies: fn(&InstallableUnit) -> bool,
}

impl ToolRule {
    pub fn applies(&self, unit: &InstallableUnit) -> bool {
        (self.applies)(unit)
    }
}

pub const RULES: &[ToolRule] = &[
    ToolRule {
        id: "awning",
        rationale: "Awnings need a ladder and welding for structural anchoring",
        required: &[Tool::ExtendableLadder, Tool::WeldingKit],
        optional: &[Tool::MobileScaffolding],
        applies: |u| u.kind == ProductKind::Awning,
    },
    ToolRule {
        id: "motorized",
        rationale: "Motorized units need the motor kit and a tension meter for calibration",
        required: &[Tool::MotorizationKit, Tool::TensionMeter],
        optional: &[],
        applies: |u| u.motorized,
    },
    ToolRule {
        id: "roof_mount",
        rationale: "Roof mounting may need scaffolding",
        required: &[],
        optional: &[Tool::MobileScaffolding],
        applies: |u| u.installation_type == InstallationType::Roof,
    },
    ToolRule {
        id: "large_unit",
        rationale: "Units above 8 m² may need an extendable ladder",
        required: &[],
        optional: &[Tool::ExtendableLadder],
        applies: |u| u.area > 8.0,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsRecommendation {
    pub required: Vec<Tool>,
    pub optional: Vec<Tool>,
    pub rationale: Vec<String>,
    pub confidence: u8,
}

const CONFIDENCE: u8 = 85;

fn push_unique(list: &mut Vec<Tool>, tool: Tool) {
    if !list.contains(&tool) {
        list.push(tool);
    }
}

/// Derive the tool list for a set of units.
pub fn recommend_tools(units: &[InstallableUnit]) -> ToolsRecommendation {
    let mut required: Vec<Tool> = BASELINE.to_vec();
    let mut optional: Vec<Tool> = Vec::new();
    let mut rationale = vec!["Percussion drill and laser level are standard for every job".to_string()];

    for rule in RULES {
        let hits = units.iter().filter(|u| rule.applies(u)).count();
        if hits == 0 {
            continue;
        }
        rule.required.iter().for_each(|t| push_unique(&mut required, *t));
        rule.optional.iter().for_each(|t| push_unique(&mut optional, *t));
        rationale.push(format!("{} ({hits} unit(s))", rule.rationale));
    }

    // A tool already required is not also listed as optional.
    optional.retain(|t| !required.contains(t));

    ToolsRecommendation {
        required,
        optional,
        rationale,
        confidence: CONFIDENCE,
    }
}
