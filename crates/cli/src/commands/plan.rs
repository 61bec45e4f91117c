use anyhow::Result;
use colored::*;
use orbit_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, target: &str) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), target.cyan());

    // Get execution plan from workspace manager
    let execution_plan = manager
        .get_execution_plan(target)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    println!(
        "\n{} ({}):",
        "Execution order".bold(),
        execution_plan.strategy
    );
    if execution_plan.modules.is_empty() {
        println!("  {}", "No modules to run".dimmed());
    }
    for (i, module) in execution_plan.modules.iter().enumerate() {
        println!(
            "  {}. {}:{}",
            i + 1,
            module.location(),
            execution_plan.task_name
        );
    }

    if !execution_plan.excluded.is_empty() {
        println!(
            "\n{} {}",
            "Excluded:".dimmed(),
            execution_plan.excluded.join(", ")
        );
    }

    Ok(())
}
