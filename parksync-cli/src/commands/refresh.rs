//! One-shot commands: `refresh`, `show` and `quota`.

use chrono::Utc;
use clap::Args;
use console::style;
use parksync::app::AppConfig;
use parksync::provider::DataKind;
use parksync::rate_limit::RateLimiter;

use super::common::{format_duration, format_size, parse_data_kind};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments naming one `(park, data kind)` pair.
#[derive(Debug, Args)]
pub struct PairArgs {
    /// Park code, e.g. YELL
    pub entity: String,

    /// Data kind: images, details, alerts, satellite or terrain
    #[arg(value_parser = parse_data_kind)]
    pub kind: DataKind,
}

/// Fetch one pair upstream and store it.
pub fn run_refresh(args: PairArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("refresh");
    let app = runner.start_app()?;

    let outcome = runner.block_on(app.orchestrator().refresh_one(&args.entity, args.kind))?;

    println!(
        "{} {}/{} from {}",
        style("Refreshed").green().bold(),
        outcome.entity_code,
        outcome.data_kind,
        outcome.service
    );
    println!("  Size:            {}", format_size(outcome.payload.len()));
    println!("  Fetched at:      {}", outcome.fetched_at.to_rfc3339());
    println!("  Quota remaining: {}", outcome.remaining_quota);
    Ok(())
}

/// Print a cached artifact without calling upstream.
pub fn run_show(args: PairArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    let app = runner.start_app()?;

    let artifact = runner.block_on(app.cache().get(&args.entity, args.kind))?;
    let age = (Utc::now() - artifact.fetched_at)
        .to_std()
        .unwrap_or_default();

    eprintln!(
        "{} {}/{} from {}, {} old, {}",
        style("Cached").cyan(),
        artifact.entity_code,
        artifact.data_kind,
        artifact.service,
        format_duration(age),
        format_size(artifact.payload.len())
    );
    println!("{}", String::from_utf8_lossy(&artifact.payload));
    Ok(())
}

/// Print the configured quota for every service.
///
/// Counters are process-local, so a fresh process always reports a full
/// window; the live view is `GET /api/quota` on a running server.
pub fn run_quota() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    let config = AppConfig::from_config_file(runner.config());
    let limiter = RateLimiter::new(config.quotas);

    println!("{:<10} {:>10} {:>12}", "SERVICE", "REQUESTS", "WINDOW");
    for snapshot in limiter.snapshot() {
        println!(
            "{:<10} {:>10} {:>12}",
            snapshot.service.to_string(),
            snapshot.max_requests,
            format_duration(snapshot.window)
        );
    }
    Ok(())
}
