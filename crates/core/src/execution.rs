//! Module execution engine
//!
//! This module handles running commands inside module directories, ordering
//! modules by their dependencies, installing required tools, and driving an
//! action over every module with aggregated reporting.

pub mod command;
pub mod dependencies;
pub mod installer;
pub mod runner;

pub use command::{CommandRunner, DirRunner, ModuleExecutor, SystemRunner};
pub use dependencies::{order_modules, OrderStrategy, OrderedModules};
pub use installer::{Backoff, InstallOutcome, ResilientInstaller, RetryPolicy, ToolSpec};
pub use runner::{run_for_each_module, BatchReporter, ConsoleReporter, SilentReporter};
