use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use install_advisor::VERSION;
use install_advisor::cli::{self, Cli};
use install_advisor::config::{AdvisorConfig, LogFormat};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let config = match AdvisorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    init_logging(&config);

    tracing::debug!("install-advisor v{} starting", VERSION);

    if let Err(e) = cli::run(args.command, &config).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only the JSON bundle.
fn init_logging(config: &AdvisorConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("install_advisor={},warn", config.log_level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}
