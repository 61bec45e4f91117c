use std::collections::{HashSet, VecDeque};

use tracing::warn;

use crate::execution::dependencies::{order_modules, OrderStrategy};
use crate::manifest::ManifestDialect;
use crate::types::{OrbitError, OrbitResult};
use crate::workspace::{
    build_dependency_graph, filter_excluded, DependencyGraph, ExclusionSet, Module, Workspace,
};

/// Modules selected for an operation, in processing order
#[derive(Debug, Clone)]
pub struct TaskExecutionPlan {
    pub task_name: String,
    pub modules: Vec<Module>,
    /// Short names of discovered modules left out by the exclusion set.
    pub excluded: Vec<String>,
    pub strategy: OrderStrategy,
    pub module_filter: Option<String>,
}

/// Exclusion-filtered modules with their graph and order.
#[derive(Debug, Clone)]
pub struct ProcessedModules {
    pub ordered: Vec<Module>,
    pub excluded: Vec<String>,
    pub graph: DependencyGraph,
    pub strategy: OrderStrategy,
}

/// Filter, build the dependency graph of what remains, and order it.
pub fn process_modules(
    workspace: &Workspace,
    dialect: &ManifestDialect,
    exclusions: &ExclusionSet,
    operation: &str,
) -> ProcessedModules {
    let processed = filter_excluded(&workspace.modules, exclusions, operation);
    if workspace.modules.is_empty() {
        warn!(
            "No {} files found under {}",
            dialect.file_name,
            workspace.root.display()
        );
    } else if processed.is_empty() {
        warn!("No modules to {} after exclusions", operation);
    }

    let excluded = workspace
        .modules
        .iter()
        .filter(|m| exclusions.contains(m))
        .map(|m| m.short_name.clone())
        .collect();

    let graph = build_dependency_graph(&processed, dialect);
    let ordered = order_modules(&processed, &graph);

    ProcessedModules {
        ordered: ordered.modules,
        excluded,
        graph,
        strategy: ordered.strategy,
    }
}

/// Resolve which modules a task runs on, optionally narrowed to one module and its dependencies.
pub fn resolve_task_execution_plan(
    workspace: &Workspace,
    dialect: &ManifestDialect,
    exclusions: &ExclusionSet,
    task_name: &str,
    module_filter: Option<&str>,
) -> OrbitResult<TaskExecutionPlan> {
    let processed = process_modules(workspace, dialect, exclusions, task_name);

    let modules = match module_filter {
        None => processed.ordered,
        Some(filter) => {
            let target = find_module(&workspace.modules, filter)?;
            if exclusions.contains(target) {
                return Err(OrbitError::Task(format!(
                    "Module '{}' is excluded from task '{}'",
                    filter, task_name
                )));
            }

            let wanted = recursive_dependencies(&processed.graph, &target.identifier);
            processed
                .ordered
                .into_iter()
                .filter(|m| wanted.contains(&m.identifier))
                .collect()
        }
    };

    Ok(TaskExecutionPlan {
        task_name: task_name.to_string(),
        modules,
        excluded: processed.excluded,
        strategy: processed.strategy,
        module_filter: module_filter.map(|s| s.to_string()),
    })
}

/// Match by relative path, then identifier, then short name.
///
/// A short name shared by several modules is rejected as ambiguous.
pub fn find_module<'a>(modules: &'a [Module], name: &str) -> OrbitResult<&'a Module> {
    if let Some(module) = modules.iter().find(|m| m.relative_path == name) {
        return Ok(module);
    }
    if let Some(module) = modules.iter().find(|m| m.identifier == name) {
        return Ok(module);
    }

    let matches: Vec<&Module> = modules.iter().filter(|m| m.short_name == name).collect();
    match matches.as_slice() {
        [] => Err(OrbitError::Task(format!("Module '{}' not found", name))),
        [module] => Ok(*module),
        many => Err(OrbitError::Task(format!(
            "Module '{}' is ambiguous, matches: {}",
            name,
            many.iter()
                .map(|m| m.relative_path.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// `identifier` plus everything it transitively depends on.
fn recursive_dependencies(graph: &DependencyGraph, identifier: &str) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([identifier.to_string()]);

    while let Some(current) = queue.pop_front() {
        if !reachable.insert(current.clone()) {
            continue;
        }
        for dep in graph.dependencies_of(&current) {
            queue.push_back(dep.clone());
        }
    }

    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn module(relative: &str, identifier: &str, manifest: &str) -> Module {
        Module {
            path: PathBuf::from("/ws").join(relative),
            identifier: identifier.to_string(),
            relative_path: relative.to_string(),
            short_name: identifier.rsplit('/').next().unwrap().to_string(),
            manifest: manifest.to_string(),
        }
    }

    fn workspace() -> Workspace {
        Workspace {
            root: PathBuf::from("/ws"),
            modules: vec![
                module(".", "x", "require x/app v0.0.0\n"),
                module("app", "x/app", "replace x/lib => ../lib\n"),
                module("lib", "x/lib", ""),
                module("magefiles", "x/magefiles", "require x/lib v0.0.0\n"),
                module("tools", "x/tools", ""),
            ],
        }
    }

    fn paths(modules: &[Module]) -> Vec<&str> {
        modules.iter().map(|m| m.relative_path.as_str()).collect()
    }

    #[test]
    fn plan_orders_processed_modules_and_reports_exclusions() {
        let exclusions = ExclusionSet::new(["magefiles"]);
        let plan = resolve_task_execution_plan(
            &workspace(),
            &ManifestDialect::default(),
            &exclusions,
            "test",
            None,
        )
        .unwrap();

        assert_eq!(plan.strategy, OrderStrategy::Topological);
        assert_eq!(paths(&plan.modules), vec!["lib", "app", ".", "tools"]);
        assert_eq!(plan.excluded, vec!["magefiles".to_string()]);
    }

    #[test]
    fn excluding_every_module_leaves_an_empty_plan() {
        let exclusions = ExclusionSet::new(["x", "app", "lib", "magefiles", "tools"]);
        let plan = resolve_task_execution_plan(
            &workspace(),
            &ManifestDialect::default(),
            &exclusions,
            "test",
            None,
        )
        .unwrap();

        assert!(plan.modules.is_empty());
        assert_eq!(plan.excluded.len(), 5);
    }

    #[test]
    fn module_filter_includes_dependencies() {
        let plan = resolve_task_execution_plan(
            &workspace(),
            &ManifestDialect::default(),
            &ExclusionSet::default(),
            "build",
            Some("app"),
        )
        .unwrap();

        assert_eq!(paths(&plan.modules), vec!["lib", "app"]);
        assert_eq!(plan.module_filter.as_deref(), Some("app"));
    }

    #[test]
    fn module_lookup_prefers_relative_path_over_short_name() {
        let modules = vec![
            module("cmd/tools", "x/cmd/tools", ""),
            module("tools", "x/tools", ""),
        ];

        assert_eq!(find_module(&modules, "tools").unwrap().relative_path, "tools");
        assert_eq!(find_module(&modules, "cmd/tools").unwrap().relative_path, "cmd/tools");
        assert_eq!(find_module(&modules, "x/cmd/tools").unwrap().relative_path, "cmd/tools");
    }

    #[test]
    fn shared_short_name_is_ambiguous() {
        let modules = vec![
            module("cmd/tools", "x/cmd/tools", ""),
            module("internal/tools", "x/internal/tools", ""),
        ];

        let err = find_module(&modules, "tools").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Task error: Module 'tools' is ambiguous, matches: cmd/tools, internal/tools"
        );
    }

    #[test]
    fn unknown_module_filter_is_an_error() {
        let err = resolve_task_execution_plan(
            &workspace(),
            &ManifestDialect::default(),
            &ExclusionSet::default(),
            "build",
            Some("nope"),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Task error: Module 'nope' not found");
    }

    #[test]
    fn excluded_module_filter_is_an_error() {
        let err = resolve_task_execution_plan(
            &workspace(),
            &ManifestDialect::default(),
            &ExclusionSet::new(["tools"]),
            "lint",
            Some("tools"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("excluded from task 'lint'"));
    }
}
