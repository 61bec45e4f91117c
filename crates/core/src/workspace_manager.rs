//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary interface
//! for all workspace operations. It loads the workspace configuration, discovers
//! modules once, and exposes listing, graph inspection, execution planning and
//! batch execution on top of that snapshot.
//!
//! Commands never run through a hidden global backend: every operation that
//! executes something takes the [`CommandRunner`] and [`BatchReporter`] to use.
//!
//! ## Example
//!
//! ```rust,no_run
//! use orbit_core::execution::{ConsoleReporter, SystemRunner};
//! use orbit_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> orbit_core::types::OrbitResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     exclude_modules: vec!["magefiles".to_string()],
//! })?;
//!
//! // List all modules
//! let modules = manager.list_modules()?;
//!
//! // Get execution plan for a task
//! let plan = manager.get_execution_plan("test")?;
//!
//! // Run a task
//! manager.run_task("test", &SystemRunner, &ConsoleReporter)?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tracing::{debug, info};

use crate::configs::tasks::TaskConfig;
use crate::configs::workspace::{load_workspace_config, WorkspaceConfig};
use crate::execution::command::{CommandRunner, ModuleExecutor};
use crate::execution::installer::{InstallOutcome, ResilientInstaller};
use crate::execution::runner::{run_for_each_module, BatchReporter};
use crate::manifest::ManifestDialect;
use crate::results::{DependencyGraphResult, ModuleInfo, ModuleListResult, OperationResult};
use crate::task_execution::{process_modules, resolve_task_execution_plan, TaskExecutionPlan};
use crate::tasks::find_task;
use crate::types::{OrbitError, OrbitResult};
use crate::workspace::{
    build_dependency_graph, discover_modules, find_cycles, DiscoveryOptions, ExclusionSet,
    Workspace,
};

/// High-level workspace manager that encapsulates all workspace operations
pub struct WorkspaceManager {
    pub workspace: Workspace,
    pub workspace_config: WorkspaceConfig,
    dialect: ManifestDialect,
    exclusions: ExclusionSet,
}

/// Configuration for initializing a workspace manager
pub struct WorkspaceManagerConfig {
    pub workspace_root: PathBuf,
    /// Module short names to skip, on top of the configured `excludeModules`.
    pub exclude_modules: Vec<String>,
}

impl WorkspaceManager {
    /// Initialize a new workspace manager from the given workspace root
    pub fn new(config: WorkspaceManagerConfig) -> OrbitResult<Self> {
        let root = config
            .workspace_root
            .canonicalize()
            .map_err(|source| OrbitError::RootTraversal {
                path: config.workspace_root.clone(),
                source,
            })?;

        let workspace_config = load_workspace_config(&root)?;
        let dialect = workspace_config.manifest_dialect();

        let modules = discover_modules(
            &root,
            &DiscoveryOptions {
                dialect: dialect.clone(),
                exclude_globs: workspace_config.exclude_globs(),
            },
        )?;
        debug!("Discovered {} modules under {}", modules.len(), root.display());

        let mut exclusions = ExclusionSet::new(workspace_config.exclude_modules());
        exclusions.extend(config.exclude_modules);

        Ok(Self {
            workspace: Workspace { root, modules },
            workspace_config,
            dialect,
            exclusions,
        })
    }

    /// List every discovered module in processing order, excluded modules last.
    pub fn list_modules(&self) -> OrbitResult<ModuleListResult> {
        let processed = process_modules(&self.workspace, &self.dialect, &self.exclusions, "list");
        let full_graph = build_dependency_graph(&self.workspace.modules, &self.dialect);

        let excluded = self
            .workspace
            .modules
            .iter()
            .filter(|m| self.exclusions.contains(m));

        let modules = processed
            .ordered
            .iter()
            .chain(excluded)
            .map(|m| ModuleInfo {
                identifier: m.identifier.clone(),
                short_name: m.short_name.clone(),
                relative_path: m.relative_path.clone(),
                path: m.path.clone(),
                excluded: self.exclusions.contains(m),
                dependencies: full_graph.dependencies_of(&m.identifier).to_vec(),
            })
            .collect();

        Ok(ModuleListResult {
            modules,
            strategy: processed.strategy,
        })
    }

    /// Get dependency graph information for the processed modules
    pub fn get_dependency_graph(&self) -> OrbitResult<DependencyGraphResult> {
        let processed = process_modules(&self.workspace, &self.dialect, &self.exclusions, "graph");
        let graph = processed.graph.to_petgraph(&processed.ordered);
        let cycles = find_cycles(&graph);

        Ok(DependencyGraphResult {
            graph,
            cycles,
            strategy: processed.strategy,
        })
    }

    /// Get execution plan for a `task` or `module:task` target
    pub fn get_execution_plan(&self, target: &str) -> OrbitResult<TaskExecutionPlan> {
        let (module_filter, task_name) = Self::parse_target(target)?;
        let task = find_task(self.workspace_config.tasks(), &task_name)?;

        resolve_task_execution_plan(
            &self.workspace,
            &self.dialect,
            &self.task_exclusions(task),
            &task.name,
            module_filter.as_deref(),
        )
    }

    /// Execute a configured task in every planned module.
    ///
    /// A missing tool is installed first; exhausting the installer aborts
    /// before any module runs. Module failures never stop the batch and are
    /// reported in the returned [`OperationResult`].
    pub fn run_task(
        &self,
        target: &str,
        runner: &dyn CommandRunner,
        reporter: &dyn BatchReporter,
    ) -> OrbitResult<OperationResult> {
        let plan = self.get_execution_plan(target)?;
        let task = find_task(self.workspace_config.tasks(), &plan.task_name)?;

        let (program, args) = task.command.program_and_args().ok_or_else(|| {
            OrbitError::Config(format!("Task '{}' has an empty command", task.name))
        })?;

        if let Some(tool) = &task.tool {
            let installer =
                ResilientInstaller::new(runner, self.workspace_config.retry_policy());
            match installer.ensure_tool(&tool.to_spec(self.workspace_config.fallback_env()))? {
                InstallOutcome::AlreadyPresent => debug!("{} already installed", tool.name),
                outcome => info!("{} ready ({:?})", tool.name, outcome),
            }
        }

        let executor = ModuleExecutor::new(runner);
        Ok(run_for_each_module(
            &plan.modules,
            &plan.task_name,
            reporter,
            |module| executor.run_in_module(module, &program, &args),
        ))
    }

    /// Run an ad-hoc command in every processed module.
    pub fn run_command(
        &self,
        program: &str,
        args: &[String],
        runner: &dyn CommandRunner,
        reporter: &dyn BatchReporter,
    ) -> OrbitResult<OperationResult> {
        let operation = program.to_string();
        let processed =
            process_modules(&self.workspace, &self.dialect, &self.exclusions, &operation);

        let executor = ModuleExecutor::new(runner);
        Ok(run_for_each_module(
            &processed.ordered,
            &operation,
            reporter,
            |module| executor.run_in_module(module, program, args),
        ))
    }

    fn task_exclusions(&self, task: &TaskConfig) -> ExclusionSet {
        let mut exclusions = self.exclusions.clone();
        if let Some(names) = &task.exclude_modules {
            exclusions.extend(names.iter().cloned());
        }
        exclusions
    }

    fn parse_target(target: &str) -> OrbitResult<(Option<String>, String)> {
        let parsed = match target.split_once(':') {
            Some((module, task)) => (Some(module.to_string()), task.to_string()),
            None => (None, target.to_string()),
        };

        if parsed.1.is_empty() || parsed.0.as_deref() == Some("") {
            return Err(OrbitError::Task(format!("Invalid target '{}'", target)));
        }
        Ok(parsed)
    }
}
