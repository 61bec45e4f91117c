use anyhow::Result;
use colored::*;
use orbit_core::execution::{ConsoleReporter, SystemRunner};
use orbit_core::workspace_manager::WorkspaceManager;

use super::finish_batch;

pub fn execute(manager: &WorkspaceManager, program: &str, args: &[String]) -> Result<()> {
    let line = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{} {}", "Running".bold(), line.cyan());

    let result = manager
        .run_command(program, args, &SystemRunner, &ConsoleReporter)
        .map_err(|e| anyhow::anyhow!("Failed to run command: {}", e))?;

    finish_batch(result)
}
