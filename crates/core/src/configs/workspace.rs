use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tasks::TaskConfig;
use crate::execution::installer::{Backoff, RetryPolicy};
use crate::manifest::ManifestDialect;
use crate::types::{OrbitError, OrbitResult};

pub const CONFIG_DIR: &str = ".orbit";
pub const CONFIG_FILE: &str = "workspace.yml";

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY_MS: u64 = 2_000;
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Module short names skipped by every operation.
    pub exclude_modules: Option<Vec<String>>,
    /// Glob patterns for directories, relative to the root, that are never descended.
    pub excludes: Option<Vec<String>>,
    pub manifest: Option<ManifestConfig>,
    pub install: Option<InstallConfig>,
    pub tasks: Option<Vec<TaskConfig>>,
}

/// Overrides for the manifest dialect. Unset fields keep the Go module defaults.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestConfig {
    pub file_name: Option<String>,
    pub declaration_keyword: Option<String>,
    pub redirect_keyword: Option<String>,
    pub require_keyword: Option<String>,
    pub vendor_dir: Option<String>,
    pub allowed_hidden_dirs: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstallConfig {
    pub max_retries: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub backoff: Option<BackoffKind>,
    pub max_delay_ms: Option<u64>,
    /// Environment applied to the single fallback attempt after retries are exhausted.
    pub fallback_env: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

impl WorkspaceConfig {
    pub fn manifest_dialect(&self) -> ManifestDialect {
        let defaults = ManifestDialect::default();
        let Some(manifest) = &self.manifest else {
            return defaults;
        };

        ManifestDialect {
            file_name: manifest.file_name.clone().unwrap_or(defaults.file_name),
            declaration_keyword: manifest
                .declaration_keyword
                .clone()
                .unwrap_or(defaults.declaration_keyword),
            redirect_keyword: manifest
                .redirect_keyword
                .clone()
                .unwrap_or(defaults.redirect_keyword),
            require_keyword: manifest
                .require_keyword
                .clone()
                .unwrap_or(defaults.require_keyword),
            vendor_dir: manifest.vendor_dir.clone().unwrap_or(defaults.vendor_dir),
            allowed_hidden_dirs: manifest
                .allowed_hidden_dirs
                .clone()
                .unwrap_or(defaults.allowed_hidden_dirs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let install = self.install.clone().unwrap_or_default();
        let backoff = match install.backoff.unwrap_or(BackoffKind::Exponential) {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                max_delay: Duration::from_millis(
                    install.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
                ),
            },
        };

        RetryPolicy {
            max_retries: install.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_delay: Duration::from_millis(
                install.initial_delay_ms.unwrap_or(DEFAULT_INITIAL_DELAY_MS),
            ),
            backoff,
        }
    }

    pub fn fallback_env(&self) -> Vec<(String, String)> {
        match self.install.as_ref().and_then(|i| i.fallback_env.as_ref()) {
            Some(env) => env.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            None => vec![("GOPROXY".to_string(), "direct".to_string())],
        }
    }

    pub fn exclude_modules(&self) -> Vec<String> {
        self.exclude_modules.clone().unwrap_or_default()
    }

    pub fn exclude_globs(&self) -> Vec<String> {
        self.excludes.clone().unwrap_or_default()
    }

    pub fn tasks(&self) -> &[TaskConfig] {
        self.tasks.as_deref().unwrap_or_default()
    }
}

pub fn parse_workspace_config(yaml_str: &str) -> OrbitResult<WorkspaceConfig> {
    let config: WorkspaceConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

/// Pretty-printed JSON schema of [`WorkspaceConfig`].
pub fn workspace_config_schema() -> OrbitResult<String> {
    let schema = schemars::schema_for!(WorkspaceConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| OrbitError::Config(format!("Failed to render schema: {}", e)))
}

/// Load `<root>/.orbit/workspace.yml`, falling back to defaults when the file is absent.
pub fn load_workspace_config(workspace_root: &Path) -> OrbitResult<WorkspaceConfig> {
    let config_path = workspace_root.join(CONFIG_DIR).join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(WorkspaceConfig::default());
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        OrbitError::Config(format!(
            "Failed to read workspace config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    parse_workspace_config(&content).map_err(|e| {
        OrbitError::Config(format!(
            "Failed to parse workspace config {}: {}",
            config_path.display(),
            e
        ))
    })
}
