use anyhow::Result;
use colored::*;
use orbit_core::execution::{ConsoleReporter, SystemRunner};
use orbit_core::workspace_manager::WorkspaceManager;

use super::finish_batch;

pub fn execute(manager: &WorkspaceManager, target: &str) -> Result<()> {
    println!("{} {}", "Running task".bold(), target.cyan());

    let result = manager
        .run_task(target, &SystemRunner, &ConsoleReporter)
        .map_err(|e| anyhow::anyhow!("Failed to run task: {}", e))?;

    finish_batch(result)
}
