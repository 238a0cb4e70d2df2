//! Installation date ranking.
//!
//! Candidates are the weekdays among the fourteen days after "today". Each
//! starts at a base score and is adjusted by a fixed rule table.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

const HORIZON_DAYS: i64 = 14;
const BASE_SCORE: i32 = 50;
const TOP_CONFIDENCE: u8 = 75;
const ALTERNATE_CONFIDENCE_STEP: u8 = 10;
const MAX_ALTERNATES: usize = 3;
/// Booked dates this close (in days) to a candidate count as a conflict.
const CONFLICT_WINDOW_DAYS: i64 = 2;

/// Facts a date rule can look at.
#[derive(Debug, Clone)]
pub struct ScheduleContext<'a> {
    pub today: NaiveDate,
    pub booked: &'a [NaiveDate],
    pub any_motorized: bool,
}

impl ScheduleContext<'_> {
    fn lead_days(&self, date: NaiveDate) -> i64 {
        (date - self.today).num_days()
    }

    fn conflicts(&self, date: NaiveDate) -> bool {
        self.booked
            .iter()
            .any(|b| (date - *b).num_days().abs() <= CONFLICT_WINDOW_DAYS)
    }
}

/// One scoring adjustment.
pub struct DateRule {
    pub id: &'static str,
    pub rationale: &'static str,
    pub delta: i32,
    applies: fn(&ScheduleContext<'_>, NaiveDate) -> bool,
}

impl DateRule {
    pub fn applies(&self, ctx: &ScheduleContext<'_>, date: NaiveDate) -> bool {
        (self.applies)(ctx, date)
    }
}

pub const RULES: &[DateRule] = &[
    DateRule {
        id: "midweek",
        rationale: "Mid-week day with better supplier and crew availability",
        delta: 15,
        applies: |_, d| matches!(d.weekday(), Weekday::Tue | Weekday::Wed | Weekday::Thu),
    },
    DateRule {
        id: "ideal_lead_time",
        rationale: "Three to seven days out leaves time to prepare materials",
        delta: 20,
        applies: |ctx, d| (3..=7).contains(&ctx.lead_days(d)),
    },
    DateRule {
        id: "short_lead_time",
        rationale: "Less than three days to prepare",
        delta: -10,
        applies: |ctx, d| ctx.lead_days(d) < 3,
    },
    DateRule {
        id: "booking_conflict",
        rationale: "Within two days of a date already booked for this project",
        delta: -15,
        applies: |ctx, d| ctx.conflicts(d),
    },
    DateRule {
        id: "motor_buffer",
        rationale: "Motorized units benefit from a reserved calibration buffer",
        delta: 5,
        applies: |ctx, _| ctx.any_motorized,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateCandidate {
    pub date: NaiveDate,
    pub score: i32,
    pub rationale: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRecommendation {
    pub recommended: DateCandidate,
    pub alternates: Vec<DateCandidate>,
    /// Suggested start, formatted "HH:MM".
    pub start_time: String,
    pub confidence: u8,
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays within the horizon after `today`, in calendar order.
pub fn candidate_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (1..=HORIZON_DAYS)
        .map(|offset| today + Duration::days(offset))
        .filter(|d| is_weekday(*d))
        .collect()
}

/// Score a single date.
pub fn score_date(ctx: &ScheduleContext<'_>, date: NaiveDate) -> DateCandidate {
    let triggered: Vec<&DateRule> = RULES.iter().filter(|r| r.applies(ctx, date)).collect();

    DateCandidate {
        date,
        score: BASE_SCORE + triggered.iter().map(|r| r.delta).sum::<i32>(),
        rationale: triggered.iter().map(|r| r.rationale.to_string()).collect(),
        confidence: TOP_CONFIDENCE,
    }
}

/// Start time for the crew.
pub fn start_time(estimated_hours: f64, unit_count: usize) -> NaiveTime {
    let hour = if estimated_hours > 4.0 || unit_count > 3 { 8 } else { 9 };
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Rank candidate dates and pick the best one plus alternates.
pub fn recommend_date(
    ctx: &ScheduleContext<'_>,
    estimated_hours: f64,
    unit_count: usize,
) -> DateRecommendation {
    let mut ranked: Vec<DateCandidate> = candidate_dates(ctx.today)
        .into_iter()
        .map(|d| score_date(ctx, d))
        .collect();
    // Stable sort keeps calendar order among equal scores.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let mut ranked = ranked.into_iter();
    let recommended = ranked.next().unwrap_or_else(|| {
        // The horizon always holds weekdays; this only guards the type.
        let mut date = ctx.today + Duration::days(1);
        while !is_weekday(date) {
            date += Duration::days(1);
        }
        score_date(ctx, date)
    });

    let alternates: Vec<DateCandidate> = ranked
        .take(MAX_ALTERNATES)
        .enumerate()
        .map(|(i, mut c)| {
            c.confidence = TOP_CONFIDENCE - ALTERNATE_CONFIDENCE_STEP * (i as u8 + 1);
            c
        })
        .collect();

    tracing::debug!(
        date = %recommended.date,
        score = recommended.score,
        alternates = alternates.len(),
        "Ranked installation dates"
    );

    DateRecommendation {
        recommended,
        alternates,
        start_time: start_time(estimated_hours, unit_count).format("%H:%M").to_string(),
        confidence: TOP_CONFIDENCE,
    }
}
