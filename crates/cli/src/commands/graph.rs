use anyhow::Result;
use colored::*;
use orbit_core::tasks::get_module_color;
use orbit_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    println!("{}", "Module Dependency Graph:".bold().underline());

    let result = manager
        .get_dependency_graph()
        .map_err(|e| anyhow::anyhow!("Failed to get dependency graph: {}", e))?;

    let graph = &result.graph;
    if graph.node_count() == 0 {
        println!("No modules found");
        return Ok(());
    }

    if !result.cycles.is_empty() {
        let cycles_description = result
            .cycles
            .iter()
            .map(|cycle| {
                let mut path = cycle.clone();
                if let Some(first) = path.first().cloned() {
                    path.push(first);
                }
                path.join(" -> ")
            })
            .collect::<Vec<_>>()
            .join("; ");

        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!("Circular dependencies detected: {}", cycles_description).yellow()
        );
    }

    for (node_index, node_weight) in graph.node_indices().zip(graph.node_weights()) {
        println!("{}", node_weight.color(get_module_color(node_weight)).bold());

        let mut deps: Vec<String> = graph
            .neighbors(node_index)
            .filter_map(|neighbor| graph.node_weight(neighbor).cloned())
            .collect();
        deps.sort();

        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    println!("{} {}", "Order:".dimmed(), result.strategy);

    Ok(())
}
