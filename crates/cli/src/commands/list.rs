use anyhow::Result;
use colored::*;
use orbit_core::tasks::get_module_color;
use orbit_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, all: bool) -> Result<()> {
    let result = manager
        .list_modules()
        .map_err(|e| anyhow::anyhow!("Failed to list modules: {}", e))?;

    let heading = if all { "Modules (all)" } else { "Modules" };
    println!("{}", heading.bold().underline());
    println!(
        "{} {}",
        "Workspace:".dimmed(),
        manager.workspace.root.display()
    );

    let modules: Vec<_> = result
        .modules
        .iter()
        .filter(|m| all || !m.excluded)
        .collect();

    if modules.is_empty() {
        println!("  {}", "No modules found".dimmed());
        return Ok(());
    }

    for module in modules {
        let name = module
            .short_name
            .color(get_module_color(&module.identifier))
            .bold();
        if module.excluded {
            println!("{} {} {}", name, module.relative_path.dimmed(), "[excluded]".yellow());
        } else {
            println!("{} {}", name, module.relative_path.dimmed());
        }
        println!("  {}", module.identifier.bright_black());
        if all {
            println!("  {}", module.path.display().to_string().dimmed());
        }
        if !module.dependencies.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), module.dependencies.join(", "));
        }
    }

    println!();
    println!("{} {}", "Order:".dimmed(), result.strategy);

    Ok(())
}
