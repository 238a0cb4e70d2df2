//! Command-line interface.
//!
//! `suggest` prints a recommendation bundle as JSON; `migrate` applies the
//! database schema.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::advisor::{Advisor, AlternateEstimate, SuggestionRequest};
use crate::config::AdvisorConfig;
use crate::db::FixtureData;
use crate::history::Store;

#[derive(Parser, Debug)]
#[command(name = "install-advisor", version, about = "Installation scheduling advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend hours, crew, tools and date for a project
    Suggest(SuggestArgs),

    /// Apply database migrations
    Migrate,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SuggestArgs {
    /// Project identifier
    pub project_id: String,

    /// Load projects, technicians and history from a JSON file instead of the database
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Reference day for date ranking (defaults to today, UTC)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Hours estimated by another model, blended 50/50 with the local estimate
    #[arg(long, value_name = "HOURS")]
    pub alternate_hours: Option<f64>,

    /// Complexity factor reported by the other model
    #[arg(long, value_name = "FACTOR", requires = "alternate_hours")]
    pub alternate_factor: Option<f64>,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl SuggestArgs {
    pub fn request(&self) -> SuggestionRequest {
        SuggestionRequest {
            project_id: self.project_id.clone(),
            alternate_estimate: self.alternate_hours.map(|hours| AlternateEstimate {
                hours,
                complexity_factor: self.alternate_factor,
            }),
            today: self.today,
        }
    }
}

/// Run a parsed command.
pub async fn run(command: Command, config: &AdvisorConfig) -> anyhow::Result<()> {
    match command {
        Command::Suggest(args) => run_suggest(&args, config).await,
        Command::Migrate => run_migrate(config).await,
    }
}

async fn run_suggest(args: &SuggestArgs, config: &AdvisorConfig) -> anyhow::Result<()> {
    let advisor = match &args.fixture {
        Some(path) => {
            let fixture = FixtureData::from_file(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            let (projects, personnel, history) = fixture.into_collaborators();
            Advisor::with_fallbacks(
                Arc::new(projects),
                Arc::new(personnel),
                Arc::new(history),
                config.lookup_timeout,
            )
        }
        None => {
            let store = Arc::new(
                Store::new(config.require_database()?)
                    .await
                    .context("Failed to connect to database")?,
            );
            Advisor::with_fallbacks(
                store.clone(),
                store.clone(),
                store,
                config.lookup_timeout,
            )
        }
    }
    .with_history_limit(config.history_limit);

    let bundle = advisor.suggest(&args.request()).await?;

    let json = if args.compact {
        serde_json::to_string(&bundle)?
    } else {
        serde_json::to_string_pretty(&bundle)?
    };
    println!("{json}");
    Ok(())
}

async fn run_migrate(config: &AdvisorConfig) -> anyhow::Result<()> {
    let store = Store::new(config.require_database()?)
        .await
        .context("Failed to connect to database")?;
    store.run_migrations().await?;
    println!("Migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggest() {
        let cli = Cli::parse_from([
            "install-advisor",
            "suggest",
            "p-7",
            "--today",
            "2026-10-16",
            "--alternate-hours",
            "6.5",
            "--compact",
        ]);
        let Command::Suggest(args) = cli.command else {
            panic!("expected suggest");
        };
        let request = args.request();
        assert_eq!(request.project_id, "p-7");
        assert_eq!(request.today, NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(request.alternate_estimate.map(|a| a.hours), Some(6.5));
        assert!(args.compact);
    }

    #[test]
    fn test_alternate_factor_requires_hours() {
        let parsed = Cli::try_parse_from([
            "install-advisor",
            "suggest",
            "p-7",
            "--alternate-factor",
            "1.2",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::parse_from(["install-advisor", "migrate"]);
        assert!(matches!(cli.command, Command::Migrate));
    }
}
