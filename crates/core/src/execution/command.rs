//! Command execution utilities
//!
//! Commands run through a [`CommandRunner`] that is handed to the engine
//! explicitly, so tests can substitute their own backend. When a runner can
//! also spawn in a given directory ([`DirRunner`]), module commands use that
//! and never touch process-wide state; many of them may run at once.
//!
//! Runners without directory support go through a compatibility path that
//! changes the process working directory under a global lock and restores it
//! before releasing the lock. That path serialises every caller and is not
//! suitable for running modules in parallel.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;

use tracing::error;

use crate::types::{render_command, OrbitError, OrbitResult};
use crate::workspace::Module;

/// Guards the process working directory for runners without [`DirRunner`] support.
static CHDIR_LOCK: Mutex<()> = Mutex::new(());

/// Backend that runs external commands from the current working directory
pub trait CommandRunner: Send + Sync {
    /// Run with inherited stdio.
    fn run_cmd(&self, program: &str, args: &[String]) -> OrbitResult<()>;

    /// Run and capture stdout.
    fn run_cmd_output(&self, program: &str, args: &[String]) -> OrbitResult<String>;

    /// Run with extra environment variables layered over the inherited environment.
    fn run_cmd_with_env(
        &self,
        env: &[(String, String)],
        program: &str,
        args: &[String],
    ) -> OrbitResult<()>;

    /// Whether `name` resolves to an executable.
    fn has_tool(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    /// Directory-scoped spawning, when the backend supports it.
    fn as_dir_runner(&self) -> Option<&dyn DirRunner> {
        None
    }
}

/// Backend that can bind a child process to a working directory at spawn time
pub trait DirRunner: Send + Sync {
    fn run_cmd_in_dir(&self, dir: &Path, program: &str, args: &[String]) -> OrbitResult<()>;

    fn run_cmd_output_in_dir(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
    ) -> OrbitResult<String>;
}

/// Default runner built on [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(dir: Option<&Path>, program: &str, args: &[String]) -> Command {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        command
    }

    fn status(mut command: Command, program: &str, args: &[String]) -> OrbitResult<()> {
        let status = command.status().map_err(|source| OrbitError::Spawn {
            command: render_command(program, args),
            source,
        })?;

        if !status.success() {
            return Err(OrbitError::CommandFailed {
                command: render_command(program, args),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }

    fn output(mut command: Command, program: &str, args: &[String]) -> OrbitResult<String> {
        command.stdin(Stdio::null());
        let Output { status, stdout, .. } =
            command.output().map_err(|source| OrbitError::Spawn {
                command: render_command(program, args),
                source,
            })?;

        if !status.success() {
            return Err(OrbitError::CommandFailed {
                command: render_command(program, args),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

impl CommandRunner for SystemRunner {
    fn run_cmd(&self, program: &str, args: &[String]) -> OrbitResult<()> {
        Self::status(Self::command(None, program, args), program, args)
    }

    fn run_cmd_output(&self, program: &str, args: &[String]) -> OrbitResult<String> {
        Self::output(Self::command(None, program, args), program, args)
    }

    fn run_cmd_with_env(
        &self,
        env: &[(String, String)],
        program: &str,
        args: &[String],
    ) -> OrbitResult<()> {
        let mut command = Self::command(None, program, args);
        command.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Self::status(command, program, args)
    }

    fn as_dir_runner(&self) -> Option<&dyn DirRunner> {
        Some(self)
    }
}

impl DirRunner for SystemRunner {
    fn run_cmd_in_dir(&self, dir: &Path, program: &str, args: &[String]) -> OrbitResult<()> {
        Self::status(Self::command(Some(dir), program, args), program, args)
    }

    fn run_cmd_output_in_dir(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
    ) -> OrbitResult<String> {
        Self::output(Self::command(Some(dir), program, args), program, args)
    }
}

/// Runs commands with their working directory bound to a module
pub struct ModuleExecutor<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ModuleExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run a command inside the module directory with inherited stdio.
    pub fn run_in_module(&self, module: &Module, program: &str, args: &[String]) -> OrbitResult<()> {
        self.run_in_module_dir(
            module,
            program,
            args,
            |dir_runner, dir| dir_runner.run_cmd_in_dir(dir, program, args),
            || self.runner.run_cmd(program, args),
        )
    }

    /// Run a command inside the module directory and capture its stdout.
    pub fn run_in_module_output(
        &self,
        module: &Module,
        program: &str,
        args: &[String],
    ) -> OrbitResult<String> {
        self.run_in_module_dir(
            module,
            program,
            args,
            |dir_runner, dir| dir_runner.run_cmd_output_in_dir(dir, program, args),
            || self.runner.run_cmd_output(program, args),
        )
    }

    fn run_in_module_dir<T>(
        &self,
        module: &Module,
        program: &str,
        args: &[String],
        scoped: impl FnOnce(&dyn DirRunner, &Path) -> OrbitResult<T>,
        legacy: impl FnOnce() -> OrbitResult<T>,
    ) -> OrbitResult<T> {
        let result = match self.runner.as_dir_runner() {
            Some(dir_runner) => scoped(dir_runner, &module.path),
            None => with_working_dir(&module.path, legacy),
        };

        result.map_err(|source| OrbitError::ModuleCommand {
            command: render_command(program, args),
            location: module.location().to_string(),
            source: Box::new(source),
        })
    }
}

/// Restores the original working directory when dropped.
struct RestoreDir {
    original: PathBuf,
}

impl Drop for RestoreDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            error!(
                "Failed to change back to original directory {}: {}",
                self.original.display(),
                e
            );
        }
    }
}

/// Run `f` with the process working directory set to `dir`, holding [`CHDIR_LOCK`].
fn with_working_dir<T>(dir: &Path, f: impl FnOnce() -> OrbitResult<T>) -> OrbitResult<T> {
    let _lock = CHDIR_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let original = std::env::current_dir()?;
    std::env::set_current_dir(dir)?;
    // Declared after the lock so the directory is restored before the lock is released.
    let _restore = RestoreDir { original };

    f()
}
