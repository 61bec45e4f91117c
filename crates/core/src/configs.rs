//! Configuration parsing for the workspace file and its task definitions
//!
//! Configuration lives in `<root>/.orbit/workspace.yml`. The file is optional;
//! every setting has a default so a bare source tree can be processed as-is.

pub mod tasks;
pub mod workspace;

pub use tasks::{Command, TaskConfig, ToolConfig};
pub use workspace::{
    load_workspace_config, parse_workspace_config, workspace_config_schema, WorkspaceConfig,
};
