//! Pending command: inspect the pending set.

use crate::config::Settings;

/// Prints the status records still awaiting delivery, as JSON.
pub fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = settings.status_store()?;
    let pending = store.read_pending()?;
    println!("{}", serde_json::to_string_pretty(&pending)?);
    Ok(())
}
