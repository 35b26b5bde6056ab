// Path: crates/cli/src/commands/dry_run.rs

use anyhow::Result;

pub fn run() -> Result<()> {
    tracing::warn!(target: "cli", "dry-run not implemented yet...");
    Ok(())
}
