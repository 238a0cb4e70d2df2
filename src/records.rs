//! Documents supplied by the CRM collaborators.
//!
//! These mirror what the project, personnel and history stores hold. Field
//! names are camelCase; the Spanish names used by the CRM documents are
//! accepted as aliases. Numeric fields are lenient: numbers and numeric
//! strings parse, anything else reads as 0.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A project aggregate as returned by the project repository.
///
/// Line items may live in any one of three shapes. See
/// [`crate::advisor::normalize`] for the precedence between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "cliente")]
    pub client: Option<String>,
    /// Flat product list.
    #[serde(default, alias = "productos")]
    pub products: Vec<ProductLine>,
    /// Nested survey partitions.
    #[serde(default, alias = "levantamiento")]
    pub survey: Option<Survey>,
    /// Installation-specific product list.
    #[serde(default, alias = "productosInstalacion")]
    pub installation_products: Vec<ProductLine>,
    /// Existing scheduling data for this project.
    #[serde(default, alias = "instalacion")]
    pub installation: Option<InstallationSchedule>,
}

/// One product line in the flat or installation-specific lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    #[serde(default, alias = "tipo", alias = "producto", alias = "tipoProducto")]
    pub product_type: String,
    #[serde(default, alias = "ubicacion")]
    pub location: String,
    #[serde(default, alias = "ancho", deserialize_with = "lenient_f64")]
    pub width: f64,
    #[serde(default, alias = "alto", deserialize_with = "lenient_f64")]
    pub height: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub area: Option<f64>,
    #[serde(default, alias = "motorizado", deserialize_with = "lenient_bool")]
    pub motorized: bool,
    #[serde(default, alias = "tipoInstalacion")]
    pub installation_type: Option<String>,
    #[serde(default, alias = "tipoFijacion")]
    pub fixing_type: Option<String>,
}

/// The survey ("levantamiento") attached to a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    #[serde(default, alias = "partidas")]
    pub partitions: Vec<SurveyPartition>,
}

/// A survey partition grouping measurements of one product type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPartition {
    #[serde(default, alias = "tipo", alias = "producto", alias = "tipoProducto")]
    pub product_type: String,
    #[serde(default, alias = "ubicacion")]
    pub location: String,
    #[serde(default, alias = "medidas")]
    pub measurements: Vec<Measurement>,
}

/// A single measured opening inside a survey partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Overrides the partition's product type when set.
    #[serde(default, alias = "tipo", alias = "producto", alias = "tipoProducto")]
    pub product_type: Option<String>,
    #[serde(default, alias = "ubicacion")]
    pub location: Option<String>,
    #[serde(default, alias = "ancho", deserialize_with = "lenient_f64")]
    pub width: f64,
    #[serde(default, alias = "alto", deserialize_with = "lenient_f64")]
    pub height: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub area: Option<f64>,
    #[serde(default, alias = "motorizado", deserialize_with = "lenient_bool")]
    pub motorized: bool,
    #[serde(default, alias = "tipoInstalacion")]
    pub installation_type: Option<String>,
    #[serde(default, alias = "tipoFijacion")]
    pub fixing_type: Option<String>,
}

/// Scheduling data already recorded on a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallationSchedule {
    #[serde(default, alias = "fechaProgramada", deserialize_with = "lenient_date")]
    pub scheduled_date: Option<NaiveDate>,
    /// Further visits already booked for the same project.
    #[serde(default, alias = "visitas", deserialize_with = "lenient_dates")]
    pub additional_dates: Vec<NaiveDate>,
}

impl InstallationSchedule {
    /// Every date already booked on the project.
    pub fn booked_dates(&self) -> Vec<NaiveDate> {
        self.scheduled_date
            .into_iter()
            .chain(self.additional_dates.iter().copied())
            .collect()
    }
}

/// A technician from the personnel directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "especialidades")]
    pub specialties: Vec<String>,
    #[serde(default, alias = "experiencia")]
    pub experience: u32,
    #[serde(default, alias = "esLider")]
    pub is_lead: bool,
}

impl CrewMember {
    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialties
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(specialty))
    }
}

/// A past installation used as evidence for time estimates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSample {
    #[serde(default, alias = "horasReales", deserialize_with = "lenient_f64")]
    pub actual_hours: f64,
    #[serde(default, alias = "horasEstimadas", deserialize_with = "lenient_f64")]
    pub estimated_hours: f64,
    #[serde(default, alias = "unidades")]
    pub unit_count: u32,
    /// Product types installed in that job, used for archive matching.
    #[serde(default, alias = "tiposProducto")]
    pub product_types: Vec<String>,
    /// Free-text lessons recorded after the job.
    #[serde(default, alias = "notas")]
    pub notes: Option<String>,
}

impl HistoricalSample {
    /// Actual hours when recorded, otherwise the original estimate.
    pub fn effective_hours(&self) -> f64 {
        if self.actual_hours > 0.0 {
            self.actual_hours
        } else {
            self.estimated_hours
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LenientValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(LenientValue::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(LenientValue::deserialize(deserializer)?.as_f64())
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match LenientValue::deserialize(deserializer)? {
        LenientValue::Bool(b) => b,
        LenientValue::Number(n) => n != 0.0,
        LenientValue::Text(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "si" | "sí" | "1"
        ),
        LenientValue::Other(_) => false,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match LenientValue::deserialize(deserializer)? {
        LenientValue::Text(s) => parse_date(&s),
        _ => None,
    })
}

/// A list of dates. A lone date string counts as a one-element list; any
/// other non-array value reads as empty.
fn lenient_dates<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().and_then(parse_date))
            .collect(),
        serde_json::Value::String(s) => parse_date(&s).into_iter().collect(),
        _ => Vec::new(),
    })
}
