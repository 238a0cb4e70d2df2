use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use install_advisor::advisor::{ComplexityLevel, Tool};
use install_advisor::records::{InstallationSchedule, ProductLine};
use install_advisor::{
    Advisor, AdvisorError, AlternateEstimate, CrewMember, DatabaseError, HistoricalArchive,
    HistoricalSample, InMemoryArchive, InMemoryDirectory, InMemoryProjects, PersonnelDirectory,
    ProjectRecord, StaticRoster, SuggestionRequest,
};

// A Friday.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

fn line(product_type: &str, width: f64, height: f64, motorized: bool) -> ProductLine {
    ProductLine {
        product_type: product_type.to_string(),
        width,
        height,
        motorized,
        ..Default::default()
    }
}

fn project(id: &str, products: Vec<ProductLine>) -> ProjectRecord {
    ProjectRecord {
        id: id.to_string(),
        name: Some(format!("Project {id}")),
        products,
        ..Default::default()
    }
}

fn advisor(projects: Vec<ProjectRecord>, history: Vec<HistoricalSample>) -> Advisor {
    Advisor::with_fallbacks(
        Arc::new(InMemoryProjects::new(projects)),
        Arc::new(InMemoryDirectory::new(StaticRoster::members())),
        Arc::new(InMemoryArchive::new(history)),
        Duration::from_secs(1),
    )
}

fn request(id: &str) -> SuggestionRequest {
    SuggestionRequest::new(id).with_today(today())
}

fn ids(members: &[CrewMember]) -> Vec<&str> {
    members.iter().map(|m| m.id.as_str()).collect()
}

#[tokio::test]
async fn test_single_blind_is_simple() {
    let advisor = advisor(vec![project("a", vec![line("Persiana", 2.0, 1.5, false)])], vec![]);

    let bundle = tokio_test::assert_ok!(advisor.suggest(&request("a")).await);

    assert_eq!(bundle.unit_count, 1);
    assert_eq!(bundle.complexity.score, 0);
    assert_eq!(bundle.complexity.level, ComplexityLevel::Low);
    assert_eq!(bundle.time.estimated_hours, 1.5);
    assert_eq!(bundle.time.complexity_factor, 1.0);
    assert_eq!(bundle.time.historical_samples, 0);
    assert_eq!(bundle.crew.members.len(), 2);
    assert_eq!(ids(&bundle.crew.members), vec!["tec-01", "tec-03"]);
    assert_eq!(bundle.crew.lead.as_ref().map(|m| m.id.as_str()), Some("tec-01"));
    assert_eq!(bundle.crew.coverage_ratio, 1.0);
    assert_eq!(bundle.tools.required, vec![Tool::PercussionDrill, Tool::LaserLevel]);
    assert!(bundle.tools.optional.is_empty());
    assert_eq!(bundle.date.start_time, "09:00");
    assert_eq!(bundle.lessons.sample_count, 0);
}

#[tokio::test]
async fn test_large_motorized_awning_job_is_high_complexity() {
    let mut products = vec![line("Toldo", 4.0, 3.0, true)];
    products.extend((0..5).map(|_| line("Persiana", 1.0, 1.0, false)));
    let advisor = advisor(vec![project("b", products)], vec![]);

    let bundle = advisor.suggest(&request("b")).await.unwrap();

    assert_eq!(bundle.unit_count, 6);
    assert!(bundle.complexity.score >= 75);
    assert_eq!(bundle.complexity.level, ComplexityLevel::High);
    assert!(bundle.crew.members.len() >= 3);
    assert!(bundle.crew.members.len() <= 4);
    for tool in [
        Tool::ExtendableLadder,
        Tool::WeldingKit,
        Tool::MotorizationKit,
        Tool::TensionMeter,
    ] {
        assert!(bundle.tools.required.contains(&tool), "missing {tool}");
    }
    assert_eq!(bundle.date.start_time, "08:00");
    // The motorized awning dominates the job factor.
    assert!(bundle.time.complexity_factor > 1.5);
}

#[tokio::test]
async fn test_history_is_blended_into_estimate() {
    let history: Vec<HistoricalSample> = (0..8)
        .map(|_| HistoricalSample {
            actual_hours: 5.0,
            estimated_hours: 4.0,
            unit_count: 2,
            product_types: vec!["ventana".to_string()],
            notes: None,
        })
        .collect();
    let products = vec![line("ventana", 1.0, 1.0, false), line("ventana", 1.0, 1.0, false)];
    let advisor = advisor(vec![project("c", products)], history);

    let bundle = advisor.suggest(&request("c")).await.unwrap();

    assert_eq!(bundle.time.historical_samples, 8);
    assert_eq!(bundle.time.estimated_hours, 4.4);
    assert_eq!(bundle.time.min_hours, 4.0);
    assert_eq!(bundle.time.max_hours, 6.0);
    // 60 base, +20 for more than five samples, +10 for a low job factor.
    assert_eq!(bundle.time.confidence, 90);
    assert_eq!(bundle.lessons.sample_count, 8);
    assert_eq!(bundle.lessons.overrun_ratio, 1.25);
}

#[tokio::test]
async fn test_history_limit_bounds_samples() {
    let history: Vec<HistoricalSample> = (0..25)
        .map(|_| HistoricalSample {
            actual_hours: 3.0,
            product_types: vec!["persiana".to_string()],
            ..Default::default()
        })
        .collect();
    let advisor = advisor(vec![project("h", vec![line("Persiana", 1.0, 1.0, false)])], history)
        .with_history_limit(4);

    let bundle = advisor.suggest(&request("h")).await.unwrap();

    assert_eq!(bundle.time.historical_samples, 4);
}

#[tokio::test]
async fn test_booked_date_penalizes_nearby_candidates() {
    let products = vec![line("Persiana", 2.0, 1.5, false)];
    let mut booked = project("d", products.clone());
    booked.installation = Some(InstallationSchedule {
        scheduled_date: Some(date(23)),
        additional_dates: vec![],
    });
    let advisor = advisor(vec![booked, project("free", products)], vec![]);

    let with_booking = advisor.suggest(&request("d")).await.unwrap();
    let without = advisor.suggest(&request("free")).await.unwrap();

    let score_on = |bundle: &install_advisor::RecommendationBundle, day: NaiveDate| {
        std::iter::once(&bundle.date.recommended)
            .chain(bundle.date.alternates.iter())
            .find(|c| c.date == day)
            .map(|c| c.score)
    };

    // Tuesday the 20th is clear of the booking; Wednesday the 21st is not.
    assert_eq!(with_booking.date.recommended.date, date(20));
    assert_eq!(with_booking.date.recommended.score, 85);
    assert_eq!(score_on(&with_booking, date(21)), Some(70));
    assert_eq!(score_on(&without, date(21)), Some(85));
}

#[tokio::test]
async fn test_dates_are_weekdays_after_today() {
    let advisor = advisor(vec![project("w", vec![line("Cortina", 1.0, 1.0, true)])], vec![]);

    let bundle = advisor.suggest(&request("w")).await.unwrap();

    use chrono::{Datelike, Weekday};
    for candidate in std::iter::once(&bundle.date.recommended).chain(&bundle.date.alternates) {
        assert!(!matches!(candidate.date.weekday(), Weekday::Sat | Weekday::Sun));
        assert!(candidate.date > today());
    }
    assert_eq!(bundle.date.alternates.len(), 3);
    assert_eq!(bundle.date.confidence, 75);
}

#[tokio::test]
async fn test_alternate_estimate_is_blended() {
    let advisor = advisor(vec![project("alt", vec![line("Persiana", 2.0, 1.5, false)])], vec![]);

    let request = request("alt").with_alternate(AlternateEstimate {
        hours: 3.5,
        complexity_factor: Some(1.1),
    });
    let bundle = advisor.suggest(&request).await.unwrap();

    // 1.5 local, 3.5 alternate.
    assert_eq!(bundle.time.estimated_hours, 2.5);
    assert_eq!(bundle.time.complexity_factor, 1.1);
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let advisor = advisor(vec![], vec![]);

    let err = advisor
        .generate_installation_suggestions("ghost")
        .await
        .unwrap_err();

    assert!(matches!(err, AdvisorError::ProjectNotFound(ref id) if id == "ghost"));
}

struct Offline;

#[async_trait]
impl PersonnelDirectory for Offline {
    async fn technicians(&self) -> Result<Vec<CrewMember>, DatabaseError> {
        Err(DatabaseError::Unavailable("directory offline".to_string()))
    }
}

#[async_trait]
impl HistoricalArchive for Offline {
    async fn recent_installations(
        &self,
        _product_types: &[String],
        _limit: usize,
    ) -> Result<Vec<HistoricalSample>, DatabaseError> {
        Err(DatabaseError::Unavailable("archive offline".to_string()))
    }
}

#[tokio::test]
async fn test_unavailable_collaborators_fall_back() {
    let advisor = Advisor::with_fallbacks(
        Arc::new(InMemoryProjects::new([project(
            "f",
            vec![line("Persiana", 2.0, 1.5, false)],
        )])),
        Arc::new(Offline),
        Arc::new(Offline),
        Duration::from_secs(1),
    );

    let bundle = advisor.suggest(&request("f")).await.unwrap();

    assert_eq!(ids(&bundle.crew.members), vec!["tec-01", "tec-03"]);
    assert_eq!(bundle.time.historical_samples, 3);
    assert_eq!(bundle.lessons.sample_count, 3);
}

#[tokio::test]
async fn test_unwrapped_collaborator_failure_is_reported() {
    let advisor = Advisor::new(
        Arc::new(InMemoryProjects::new([project("x", vec![])])),
        Arc::new(Offline),
        Arc::new(InMemoryArchive::default()),
    );

    let err = advisor.suggest(&request("x")).await.unwrap_err();

    assert!(matches!(err, AdvisorError::Collaborator { .. }));
}

#[tokio::test]
async fn test_empty_directory_still_staffs_the_job() {
    let advisor = Advisor::new(
        Arc::new(InMemoryProjects::new([project(
            "e",
            vec![line("Persiana", 2.0, 1.5, false)],
        )])),
        Arc::new(InMemoryDirectory::default()),
        Arc::new(InMemoryArchive::default()),
    );

    let bundle = tokio_test::assert_ok!(advisor.suggest(&request("e")).await);

    assert_eq!(ids(&bundle.crew.members), vec!["tec-01", "tec-03"]);
    assert_eq!(bundle.crew.lead.as_ref().map(|m| m.id.as_str()), Some("tec-01"));
}

#[tokio::test]
async fn test_history_matches_by_product_family() {
    let sample = |tag: &str| HistoricalSample {
        actual_hours: 6.0,
        estimated_hours: 4.0,
        unit_count: 1,
        product_types: vec![tag.to_string()],
        notes: None,
    };
    let history = vec![sample("blinds"), sample("Persiana enrollable"), sample("toldo")];
    let advisor = advisor(vec![project("fam", vec![line("Persiana", 1.0, 1.0, false)])], history);

    let bundle = advisor.suggest(&request("fam")).await.unwrap();

    assert_eq!(bundle.time.historical_samples, 2);
}

#[tokio::test]
async fn test_empty_project_still_produces_bundle() {
    let advisor = advisor(vec![project("empty", vec![])], vec![]);

    let bundle = advisor.suggest(&request("empty")).await.unwrap();

    assert_eq!(bundle.unit_count, 0);
    assert_eq!(bundle.complexity.score, 0);
    assert!(bundle.time.estimated_hours > 0.0);
    assert!(!bundle.crew.members.is_empty());
}

#[tokio::test]
async fn test_same_inputs_give_same_bundle() {
    let mut products = vec![line("Toldo", 4.0, 3.0, true)];
    products.push(line("Persiana", 1.2, 1.4, false));
    let advisor = advisor(vec![project("i", products)], vec![]);

    let first = advisor.suggest(&request("i")).await.unwrap();
    let mut second = advisor.suggest(&request("i")).await.unwrap();
    second.generated_at = first.generated_at;

    assert_eq!(first, second);
}
