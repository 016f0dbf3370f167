//! `parksync sweep`: refresh the whole catalog in the foreground.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use parksync::app::ParkSyncApp;
use parksync::provider::DataKind;
use parksync::refresh::{SweepState, SweepStatus};

use super::common::format_duration;
use crate::error::CliError;
use crate::runner::CliRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("sweep");
    let app = runner.start_app()?;

    let handle = runner.block_on(async { app.controller().start() });

    let cancel = handle.clone();
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let total = handle.status().total as u64;
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let status = runner.block_on(async {
        loop {
            let status = handle.status();
            bar.set_position(status.processed() as u64);
            bar.set_message(current_pair(&app, &status));
            if status.state.is_terminal() {
                break status;
            }
            tokio::select! {
                status = handle.wait() => break status,
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }
    });
    bar.finish_and_clear();

    print_summary(&status);
    Ok(())
}

/// Label for the pair the sweep will process next.
fn current_pair(app: &ParkSyncApp, status: &SweepStatus) -> String {
    let codes = app.catalog().codes();
    match (
        codes.get(status.cursor.entity_index),
        DataKind::ALL.get(status.cursor.kind_index),
    ) {
        (Some(code), Some(kind)) => format!("{}/{}", code, kind),
        _ => String::new(),
    }
}

fn print_summary(status: &SweepStatus) {
    let state = match status.state {
        SweepState::Completed => style(status.state.to_string()).green().bold(),
        SweepState::Cancelled => style(status.state.to_string()).yellow().bold(),
        other => style(other.to_string()).bold(),
    };
    println!("Sweep #{} {}", status.sweep_id, state);
    println!("  Succeeded:        {}/{}", status.succeeded, status.total);
    println!("  Failed:           {}", status.failed);
    println!("  Rate-limit waits: {}", status.rate_limited_waits);
    if let (Some(started), Some(finished)) = (status.started_at, status.finished_at) {
        let elapsed = (finished - started).to_std().unwrap_or_default();
        println!("  Elapsed:          {}", format_duration(elapsed));
    }

    if !status.failures.is_empty() {
        println!();
        println!("{}", style("Failures").red().bold());
        for failure in &status.failures {
            println!(
                "  {}/{} [{}] {}",
                failure.entity_code, failure.data_kind, failure.error, failure.message
            );
        }
        let unlisted = status.failed.saturating_sub(status.failures.len());
        if unlisted > 0 {
            println!("  ({} earlier failures not shown)", unlisted);
        }
    }
}
