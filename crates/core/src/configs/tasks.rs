use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::execution::installer::ToolSpec;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum Command {
    /// A shell line, run through `sh -c`.
    Single(String),
    /// A program followed by its arguments.
    Multiple(Vec<String>),
}

impl Command {
    /// Split into the program and argument list handed to the executor.
    pub fn program_and_args(&self) -> Option<(String, Vec<String>)> {
        match self {
            Command::Single(line) => Some(("sh".to_string(), vec!["-c".to_string(), line.clone()])),
            Command::Multiple(parts) => {
                let (program, args) = parts.split_first()?;
                Some((program.clone(), args.to_vec()))
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub description: Option<String>,
    pub command: Command,
    /// Module short names skipped for this task only, on top of the workspace exclusions.
    pub exclude_modules: Option<Vec<String>>,
    /// External tool that must be present before the task runs.
    pub tool: Option<ToolConfig>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolConfig {
    pub name: String,
    /// Install command as `[program, args...]`.
    pub install: Vec<String>,
}

impl ToolConfig {
    pub fn to_spec(&self, fallback_env: Vec<(String, String)>) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            install: self.install.clone(),
            fallback_env,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_command_runs_through_shell() {
        let command = Command::Single("go vet ./...".to_string());
        let (program, args) = command.program_and_args().unwrap();
        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c".to_string(), "go vet ./...".to_string()]);
    }

    #[test]
    fn multiple_command_splits_program() {
        let command = Command::Multiple(vec!["go".into(), "test".into(), "./...".into()]);
        let (program, args) = command.program_and_args().unwrap();
        assert_eq!(program, "go");
        assert_eq!(args, vec!["test".to_string(), "./...".to_string()]);
    }

    #[test]
    fn empty_command_list_has_no_program() {
        assert!(Command::Multiple(Vec::new()).program_and_args().is_none());
    }

    #[test]
    fn task_with_tool_deserializes() {
        let yaml = r#"
name: lint
command: golangci-lint run
tool:
  name: golangci-lint
  install: [go, install, github.com/golangci/golangci-lint/cmd/golangci-lint@latest]
"#;
        let task: TaskConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(task.command, Command::Single("golangci-lint run".to_string()));

        let spec = task.tool.unwrap().to_spec(Vec::new());
        assert_eq!(spec.name, "golangci-lint");
        assert_eq!(spec.install[0], "go");
    }
}
