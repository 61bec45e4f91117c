//! Orbit Core Library
//!
//! This is the core library for the Orbit multi-module workspace tool. It
//! discovers every module under a root, works out how they depend on each
//! other, and runs per-module actions in dependency order while collecting
//! every failure instead of stopping at the first.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`workspace_manager`] - High-level workspace management interface
//! - [`workspace`] - Module discovery and dependency graph building
//! - [`manifest`] - Manifest reading and dependency scanning
//! - [`execution`] - Ordering, directory-scoped execution, tool installation and batch runs
//! - [`task_execution`] - Execution planning for tasks and ad-hoc commands
//! - [`tasks`] - Task lookup and color management
//! - [`configs`] - Workspace configuration parsing
//! - [`results`] - Result types for workspace operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`WorkspaceManager`] which provides a high-level
//! interface for all workspace operations:
//!
//! ```rust,no_run
//! use orbit_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> orbit_core::types::OrbitResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     exclude_modules: Vec::new(),
//! })?;
//!
//! let modules = manager.list_modules()?;
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod execution;
pub mod manifest;
pub mod results;
pub mod task_execution;
pub mod tasks;
pub mod types;
pub mod workspace;
pub mod workspace_manager;

// Re-export the main types for easier usage
pub use types::{OrbitError, OrbitResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
