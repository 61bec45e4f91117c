//! Task utilities and color management
//!
//! Consistent module colors for terminal output, and lookup of named tasks in
//! the workspace configuration.

use colored::*;

use crate::configs::tasks::TaskConfig;
use crate::types::{OrbitError, OrbitResult};

/// Get a consistent color for a module identifier
pub fn get_module_color(identifier: &str) -> Color {
    let hash = identifier
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Label colors kept away from the red/green used for pass/fail lines
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}

/// Find a task by name
pub fn find_task<'a>(tasks: &'a [TaskConfig], task_name: &str) -> OrbitResult<&'a TaskConfig> {
    tasks
        .iter()
        .find(|t| t.name == task_name)
        .ok_or_else(|| OrbitError::Task(format!("Task '{}' not found", task_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::tasks::Command;

    #[test]
    fn module_color_is_stable() {
        assert_eq!(
            get_module_color("example.com/lib"),
            get_module_color("example.com/lib")
        );
    }

    #[test]
    fn find_task_by_name() {
        let tasks = vec![TaskConfig {
            name: "lint".to_string(),
            description: None,
            command: Command::Single("go vet ./...".to_string()),
            exclude_modules: None,
            tool: None,
        }];

        assert_eq!(find_task(&tasks, "lint").unwrap().name, "lint");
        let err = find_task(&tasks, "bench").unwrap_err();
        assert_eq!(err.to_string(), "Task error: Task 'bench' not found");
    }
}
