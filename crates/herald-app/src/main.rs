//! Herald application binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Load the scenario file named on the command line
//! 3. Replay it against a freshly built action manager
//! 4. Print the display order, leftover queue and impression counts as JSON

mod cli;
mod scenario;

use clap::Parser;

use herald_core::config::HeraldConfig;

use cli::CliArgs;
use scenario::Scenario;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = HeraldConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins over the resolved level.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Herald v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let scenario = Scenario::load(&args.scenario)?;
    let report = scenario.replay(&config.messaging)?;
    tracing::info!(
        displayed = report.displayed.len(),
        remaining = report.remaining.len(),
        "Scenario replayed"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
