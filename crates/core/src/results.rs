//! Result types for workspace operations
//!
//! This module contains the result types returned by workspace manager
//! operations and by the batch runner.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::execution::dependencies::OrderStrategy;
use crate::types::{OrbitError, OrbitResult};
use crate::workspace::Module;

/// A per-module action failure recorded by the batch runner
#[derive(Debug)]
pub struct ModuleError {
    pub module: Module,
    pub error: OrbitError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    Passed,
    Failed(String),
}

/// Completion record emitted once per processed module
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub identifier: String,
    pub relative_path: String,
    pub elapsed: Duration,
    pub outcome: ModuleOutcome,
}

impl ModuleReport {
    pub fn is_success(&self) -> bool {
        self.outcome == ModuleOutcome::Passed
    }
}

/// One failing module as it appears in an [`AggregateError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureLine {
    pub location: String,
    pub message: String,
}

/// Every module failure of a batch, rendered one per line
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct AggregateError {
    pub total: usize,
    pub failures: Vec<FailureLine>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} modules failed:", self.failures.len(), self.total)?;
        for failure in &self.failures {
            write!(f, "\n  - {}: {}", failure.location, failure.message)?;
        }
        Ok(())
    }
}

/// Terminal artifact of one batch run
#[derive(Debug)]
pub struct OperationResult {
    pub operation: String,
    pub errors: Vec<ModuleError>,
    pub reports: Vec<ModuleReport>,
    pub attempted: usize,
    pub elapsed: Duration,
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// No module was attempted, so the batch did nothing.
    pub fn is_empty(&self) -> bool {
        self.attempted == 0
    }

    /// Summary of every failure, or `None` when all modules passed.
    pub fn aggregate_error(&self) -> Option<AggregateError> {
        if self.errors.is_empty() {
            return None;
        }

        Some(AggregateError {
            total: self.attempted,
            failures: self
                .errors
                .iter()
                .map(|e| FailureLine {
                    location: e.module.location().to_string(),
                    message: e.error.to_string(),
                })
                .collect(),
        })
    }

    /// Total elapsed time on success, the aggregate error otherwise.
    pub fn into_result(self) -> OrbitResult<Duration> {
        match self.aggregate_error() {
            Some(aggregate) => Err(OrbitError::Modules(aggregate)),
            None => Ok(self.elapsed),
        }
    }
}

/// Format a duration as `Nms`, `N.Ns` or `N.Nm`.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else if duration < Duration::from_secs(60) {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{:.1}m", duration.as_secs_f64() / 60.0)
    }
}

/// Information about a discovered module
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub identifier: String,
    pub short_name: String,
    pub relative_path: String,
    pub path: PathBuf,
    pub excluded: bool,
    pub dependencies: Vec<String>,
}

/// Result of listing modules in the workspace
#[derive(Debug)]
pub struct ModuleListResult {
    pub modules: Vec<ModuleInfo>,
    pub strategy: OrderStrategy,
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: petgraph::Graph<String, ()>,
    pub cycles: Vec<Vec<String>>,
    pub strategy: OrderStrategy,
}
