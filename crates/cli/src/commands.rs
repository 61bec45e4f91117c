//! Presentation layer for each `orbit` subcommand

pub mod exec;
pub mod graph;
pub mod list;
pub mod plan;
pub mod run;
pub mod schema;

use anyhow::Result;
use colored::*;
use orbit_core::results::OperationResult;

/// Turn a finished batch into the process outcome, printing the aggregate on failure.
pub(crate) fn finish_batch(result: OperationResult) -> Result<()> {
    match result.aggregate_error() {
        None => Ok(()),
        Some(aggregate) => {
            eprintln!();
            eprintln!("{}", aggregate.to_string().red());
            anyhow::bail!("{} failed in {} module(s)", result.operation, aggregate.failures.len())
        }
    }
}
