//! Tick command: a single reconciliation pass.

use docrelay_engine::Reconciler;

use crate::config::Settings;

/// Runs one pass and prints a summary.
///
/// Any error, recoverable or not, is surfaced to the caller; a one-shot
/// invocation has no next interval to wait for.
pub fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconciler = Reconciler::new(
        settings.source_poller()?,
        settings.status_store()?,
        settings.target_publisher()?,
    );

    let report = reconciler.tick()?;
    println!("discovered:          {}", report.discovered);
    println!("registered:          {}", report.registered);
    println!("already registered:  {}", report.already_registered);
    println!("outcomes recorded:   {}", report.outcomes_recorded);
    println!("outcome conflicts:   {}", report.outcome_conflicts);
    for (id, body) in &report.server_errors {
        println!("target 500 for {id}: {body}");
    }
    Ok(())
}
