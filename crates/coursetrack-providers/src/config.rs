//! Application configuration and notifier factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use coursetrack_core::traits::Notifier;

use crate::console::ConsoleNotifier;
use crate::webhook::WebhookNotifier;

/// Configuration for the reminder transport.
///
/// Note: Custom Debug impl masks auth tokens to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotifierConfig {
    Webhook {
        endpoint: String,
        #[serde(default)]
        auth_token: Option<String>,
    },
    Console,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierConfig::Webhook {
                endpoint,
                auth_token: _,
            } => f
                .debug_struct("Webhook")
                .field("endpoint", endpoint)
                .field("auth_token", &"***")
                .finish(),
            NotifierConfig::Console => f.debug_struct("Console").finish(),
        }
    }
}

/// Top-level coursetrack configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursetrackConfig {
    /// Reminder transport.
    #[serde(default = "default_notifier")]
    pub notifier: NotifierConfig,
    /// Base URL used to build deep links in reminders.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the reminder ledger persists between ticks.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    /// Output directory for tick outcomes and dashboard snapshots.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_notifier() -> NotifierConfig {
    NotifierConfig::Console
}
fn default_base_url() -> String {
    "https://app.coursetrack.example".to_string()
}
fn default_ledger_path() -> PathBuf {
    PathBuf::from("./coursetrack-ledger.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./coursetrack-results")
}

impl Default for CoursetrackConfig {
    fn default() -> Self {
        Self {
            notifier: default_notifier(),
            base_url: default_base_url(),
            ledger_path: default_ledger_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_notifier_config(config: &NotifierConfig) -> NotifierConfig {
    match config {
        NotifierConfig::Webhook {
            endpoint,
            auth_token,
        } => NotifierConfig::Webhook {
            endpoint: resolve_env_vars(endpoint),
            auth_token: auth_token.as_ref().map(|t| resolve_env_vars(t)),
        },
        NotifierConfig::Console => NotifierConfig::Console,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `coursetrack.toml` in the current directory
/// 2. `~/.config/coursetrack/config.toml`
pub fn load_config() -> Result<CoursetrackConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CoursetrackConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("coursetrack.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CoursetrackConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CoursetrackConfig::default(),
    };

    config.notifier = resolve_notifier_config(&config.notifier);
    config.base_url = resolve_env_vars(&config.base_url);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("coursetrack"))
}

/// Create a notifier instance from its configuration.
pub fn create_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config {
        NotifierConfig::Webhook {
            endpoint,
            auth_token,
        } => Arc::new(WebhookNotifier::new(endpoint, auth_token.clone())),
        NotifierConfig::Console => Arc::new(ConsoleNotifier::new()),
    }
}
