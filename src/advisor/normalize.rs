//! Line item normalization.
//!
//! A project keeps its installable units in one of three shapes. They are
//! tried in a fixed order and the first non-empty one wins:
//!
//! 1. the flat product list,
//! 2. the survey partitions, one unit per measurement,
//! 3. the installation-specific product list.
//!
//! An empty result is not an error; every later stage accepts zero units.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::{Measurement, ProductLine, ProjectRecord, Survey, SurveyPartition};

/// Product family, classified from the free-text product tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Blind,
    Awning,
    Curtain,
    Other,
}

impl ProductKind {
    /// Classify a product tag. Matching is case-insensitive on substrings so
    /// "Persiana enrollable" and "roller blind" both read as blinds.
    pub fn classify(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains("toldo") || tag.contains("awning") {
            Self::Awning
        } else if tag.contains("persiana") || tag.contains("blind") {
            Self::Blind
        } else if tag.contains("cortina") || tag.contains("curtain") {
            Self::Curtain
        } else {
            Self::Other
        }
    }

    /// Family name shared by the archive and the crew specialties.
    pub fn family(self) -> Option<&'static str> {
        match self {
            Self::Blind => Some("blinds"),
            Self::Awning => Some("awnings"),
            Self::Curtain => Some("curtains"),
            Self::Other => None,
        }
    }

    /// Canonical tag used to match past installations: the family name when
    /// the tag classifies, otherwise the trimmed lowercase text.
    ///
    /// The `product_family` SQL function applies the same mapping to stored
    /// history rows.
    pub fn family_tag(tag: &str) -> String {
        match Self::classify(tag).family() {
            Some(family) => family.to_string(),
            None => tag.trim().to_lowercase(),
        }
    }
}

/// Where the unit is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    Roof,
    Wall,
    Embedded,
    Exterior,
    #[default]
    Unspecified,
}

impl InstallationType {
    pub fn parse(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Self::Unspecified;
        };
        match tag.trim().to_lowercase().as_str() {
            "roof" | "ceiling" | "techo" | "plafon" | "plafón" => Self::Roof,
            "wall" | "muro" | "pared" => Self::Wall,
            "embedded" | "empotrado" | "empotrada" => Self::Embedded,
            "exterior" | "outdoor" | "fachada" => Self::Exterior,
            _ => Self::Unspecified,
        }
    }
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roof => write!(f, "roof"),
            Self::Wall => write!(f, "wall"),
            Self::Embedded => write!(f, "embedded"),
            Self::Exterior => write!(f, "exterior"),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// One window, door or awning unit to install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallableUnit {
    /// Product tag as written on the project.
    pub product_type: String,
    pub kind: ProductKind,
    pub location: String,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub motorized: bool,
    pub installation_type: InstallationType,
    pub fixing_type: String,
}

impl InstallableUnit {
    #[allow(clippy::too_many_arguments)]
    fn new(
        product_type: &str,
        location: &str,
        width: f64,
        height: f64,
        area: Option<f64>,
        motorized: bool,
        installation_type: Option<&str>,
        fixing_type: Option<&str>,
    ) -> Self {
        let width = sanitize(width);
        let height = sanitize(height);
        let area = match area.map(sanitize) {
            Some(supplied) if supplied > 0.0 => supplied,
            _ => width * height,
        };

        Self {
            product_type: product_type.trim().to_string(),
            kind: ProductKind::classify(product_type),
            location: location.trim().to_string(),
            width,
            height,
            area,
            motorized,
            installation_type: InstallationType::parse(installation_type),
            fixing_type: fixing_type.map(|s| s.trim().to_string()).unwrap_or_default(),
        }
    }

    fn from_line(line: &ProductLine) -> Self {
        Self::new(
            &line.product_type,
            &line.location,
            line.width,
            line.height,
            line.area,
            line.motorized,
            line.installation_type.as_deref(),
            line.fixing_type.as_deref(),
        )
    }

    fn from_measurement(partition: &SurveyPartition, m: &Measurement) -> Self {
        Self::new(
            m.product_type.as_deref().unwrap_or(&partition.product_type),
            m.location.as_deref().unwrap_or(&partition.location),
            m.width,
            m.height,
            m.area,
            m.motorized,
            m.installation_type.as_deref(),
            m.fixing_type.as_deref(),
        )
    }

    /// Whether either side exceeds three metres.
    pub fn is_oversize(&self) -> bool {
        self.width > 3.0 || self.height > 3.0
    }
}

/// Negative or non-finite dimensions read as 0.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// The three shapes line items can arrive in, in precedence order.
#[derive(Debug, Clone, Copy)]
pub enum LineItemSource<'a> {
    Products(&'a [ProductLine]),
    Survey(&'a Survey),
    InstallationProducts(&'a [ProductLine]),
}

impl<'a> LineItemSource<'a> {
    /// All sources of a project, highest precedence first.
    pub fn ordered(project: &'a ProjectRecord) -> Vec<Self> {
        let mut sources = vec![Self::Products(&project.products)];
        if let Some(survey) = &project.survey {
            sources.push(Self::Survey(survey));
        }
        sources.push(Self::InstallationProducts(&project.installation_products));
        sources
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Products(_) => "products",
            Self::Survey(_) => "survey",
            Self::InstallationProducts(_) => "installation_products",
        }
    }

    /// Flatten this source into units.
    pub fn units(&self) -> Vec<InstallableUnit> {
        match self {
            Self::Products(lines) | Self::InstallationProducts(lines) => {
                lines.iter().map(InstallableUnit::from_line).collect()
            }
            Self::Survey(survey) => survey
                .partitions
                .iter()
                .flat_map(|p| {
                    p.measurements
                        .iter()
                        .map(move |m| InstallableUnit::from_measurement(p, m))
                })
                .collect(),
        }
    }
}

/// Extract the installable units of a project.
pub fn normalize(project: &ProjectRecord) -> Vec<InstallableUnit> {
    for source in LineItemSource::ordered(project) {
        let units = source.units();
        if !units.is_empty() {
            tracing::debug!(
                project_id = %project.id,
                source = source.name(),
                units = units.len(),
                "Normalized line items"
            );
            return units;
        }
    }

    tracing::debug!(project_id = %project.id, "Project has no installable units");
    Vec::new()
}
