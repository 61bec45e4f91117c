//! Tool installation with retries
//!
//! A missing tool is installed by retrying its install command up to
//! [`RetryPolicy::max_retries`] times, then making one last attempt with a
//! modified environment (by default `GOPROXY=direct`, bypassing a module
//! proxy). Tools that already resolve on the runner are never reinstalled.

use std::time::Duration;

use tracing::{info, warn};

use crate::execution::command::CommandRunner;
use crate::types::{render_command, OrbitError, OrbitResult};

/// Growth of the delay between install attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    /// Double after every failed attempt, never exceeding `max_delay`.
    Exponential { max_delay: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Delay slept after the failed attempt numbered `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.initial_delay,
            Backoff::Exponential { max_delay } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.initial_delay.saturating_mul(factor).min(max_delay)
            }
        }
    }
}

/// An external tool and the command that installs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    /// `[program, args...]`
    pub install: Vec<String>,
    /// Environment for the single fallback attempt.
    pub fallback_env: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyPresent,
    Installed { attempts: u32 },
    InstalledViaFallback { attempts: u32 },
}

pub struct ResilientInstaller<'a> {
    runner: &'a dyn CommandRunner,
    policy: RetryPolicy,
}

impl<'a> ResilientInstaller<'a> {
    pub fn new(runner: &'a dyn CommandRunner, policy: RetryPolicy) -> Self {
        Self { runner, policy }
    }

    /// Make sure `tool` is available, installing it if needed.
    pub fn ensure_tool(&self, tool: &ToolSpec) -> OrbitResult<InstallOutcome> {
        if self.runner.has_tool(&tool.name) {
            return Ok(InstallOutcome::AlreadyPresent);
        }

        let Some((program, args)) = tool.install.split_first() else {
            return Err(OrbitError::Config(format!(
                "Tool '{}' is missing and has no install command",
                tool.name
            )));
        };

        info!("Installing {} with {}", tool.name, render_command(program, args));

        let mut attempts = 0;
        let mut last_error = None;
        for attempt in 1..=self.policy.max_retries {
            attempts = attempt;
            match self.runner.run_cmd(program, args) {
                Ok(()) => return Ok(InstallOutcome::Installed { attempts }),
                Err(e) => {
                    warn!(
                        "Install attempt {}/{} for {} failed: {}",
                        attempt, self.policy.max_retries, tool.name, e
                    );
                    last_error = Some(e);
                }
            }

            if attempt < self.policy.max_retries {
                let delay = self.policy.delay_after(attempt);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }

        match &last_error {
            Some(e) => warn!("Installation of {} failed: {}, trying fallback environment...", tool.name, e),
            None => warn!("No retries configured for {}, trying fallback environment...", tool.name),
        }

        attempts += 1;
        match self.runner.run_cmd_with_env(&tool.fallback_env, program, args) {
            Ok(()) => {
                info!("Installed {} via fallback environment", tool.name);
                Ok(InstallOutcome::InstalledViaFallback { attempts })
            }
            Err(e) => Err(OrbitError::InstallExhausted {
                tool: tool.name.clone(),
                attempts,
                source: Box::new(e),
            }),
        }
    }
}
