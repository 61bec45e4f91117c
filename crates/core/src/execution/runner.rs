//! Batch runner
//!
//! Drives one action over an ordered module list, one module at a time. A
//! failing module never stops the batch; its error is recorded and the next
//! module runs. The per-module reports and recorded errors make up the final
//! [`OperationResult`].

use std::time::Instant;

use colored::*;

use crate::results::{format_duration, ModuleError, ModuleOutcome, ModuleReport, OperationResult};
use crate::tasks::get_module_color;
use crate::types::OrbitResult;
use crate::workspace::Module;

/// Receives progress signals from [`run_for_each_module`]
pub trait BatchReporter {
    fn on_module_start(&self, _module: &Module, _operation: &str) {}

    fn on_module_complete(&self, _report: &ModuleReport, _operation: &str) {}

    fn on_batch_complete(&self, _result: &OperationResult) {}
}

/// Reporter that prints nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BatchReporter for SilentReporter {}

/// Reporter that prints colored headers and completion lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl BatchReporter for ConsoleReporter {
    fn on_module_start(&self, module: &Module, operation: &str) {
        let module_color = get_module_color(&module.identifier);
        let target = if module.is_root() {
            "main module".to_string()
        } else {
            format!("module {}", module.relative_path)
        };

        println!();
        println!(
            "┌─ {} in {}...",
            format!("Running {}", operation).bold(),
            target.color(module_color).bold()
        );
        println!("└─ {} {}", "Module:".bright_black(), module.identifier);
    }

    fn on_module_complete(&self, report: &ModuleReport, operation: &str) {
        let duration = format_duration(report.elapsed);
        let location = report
            .relative_path
            .color(get_module_color(&report.identifier))
            .bold();
        match &report.outcome {
            ModuleOutcome::Passed => println!(
                "{} {} {} {}",
                "✓".green().bold(),
                format!("{} passed for", operation).green(),
                location,
                format!("in {}", duration).green()
            ),
            ModuleOutcome::Failed(_) => println!(
                "{} {} {} {}",
                "✗".red().bold(),
                format!("{} failed for", operation).red(),
                location,
                format!("in {}", duration).red()
            ),
        }
    }

    fn on_batch_complete(&self, result: &OperationResult) {
        println!();
        if result.is_empty() {
            println!(
                "{} {}",
                "!".yellow().bold(),
                format!("No modules to {}, nothing was run", result.operation)
                    .yellow()
                    .bold()
            );
        } else if result.is_success() {
            println!(
                "{} {}",
                "✓".green().bold(),
                format!(
                    "All {} passed in {}",
                    result.operation,
                    format_duration(result.elapsed)
                )
                .green()
                .bold()
            );
        } else {
            println!(
                "{} {}",
                "✗".red().bold(),
                format!(
                    "{} failed in {}/{} modules",
                    result.operation,
                    result.errors.len(),
                    result.attempted
                )
                .red()
                .bold()
            );
        }
    }
}

/// Run `action` against every module in order and collect the outcome.
pub fn run_for_each_module<F>(
    modules: &[Module],
    operation: &str,
    reporter: &dyn BatchReporter,
    mut action: F,
) -> OperationResult
where
    F: FnMut(&Module) -> OrbitResult<()>,
{
    let total_start = Instant::now();
    let mut errors = Vec::new();
    let mut reports = Vec::with_capacity(modules.len());

    for module in modules {
        reporter.on_module_start(module, operation);

        let module_start = Instant::now();
        let result = action(module);
        let elapsed = module_start.elapsed();

        let outcome = match result {
            Ok(()) => ModuleOutcome::Passed,
            Err(error) => {
                let outcome = ModuleOutcome::Failed(error.to_string());
                errors.push(ModuleError {
                    module: module.clone(),
                    error,
                });
                outcome
            }
        };

        let report = ModuleReport {
            identifier: module.identifier.clone(),
            relative_path: module.relative_path.clone(),
            elapsed,
            outcome,
        };
        reporter.on_module_complete(&report, operation);
        reports.push(report);
    }

    let result = OperationResult {
        operation: operation.to_string(),
        errors,
        reports,
        attempted: modules.len(),
        elapsed: total_start.elapsed(),
    };
    reporter.on_batch_complete(&result);
    result
}
