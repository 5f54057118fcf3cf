//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dirs_next::{config_dir, data_dir};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));

const STACK_DIR: &str = "jumpback";
const STACK_FILE: &str = "stack.json";

/// Configuration loaded from defaults, the user config file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub editor: Editor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    /// Absolute path of the stack file; `None` means the per-user data
    /// directory.
    #[serde(default)]
    pub stack_file: Option<PathBuf>,
    #[serde(default = "Storage::default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Discard points older than this many hours on push. `None` keeps
    /// points until they are popped.
    #[serde(default)]
    pub max_point_age_hours: Option<u64>,
}

impl Storage {
    fn default_lock_timeout_ms() -> u64 {
        2_000
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            stack_file: None,
            lock_timeout_ms: Self::default_lock_timeout_ms(),
            max_point_age_hours: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    #[serde(default = "Editor::default_automation_command")]
    pub automation_command: String,
}

impl Editor {
    fn default_automation_command() -> String {
        "osascript".into()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            automation_command: Self::default_automation_command(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    stack_file: Option<String>,
    lock_timeout_ms: Option<String>,
    automation_command: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            stack_file: env::var("JUMPBACK_STACK_FILE").ok(),
            lock_timeout_ms: env::var("JUMPBACK_LOCK_TIMEOUT_MS").ok(),
            automation_command: env::var("JUMPBACK_AUTOMATION_COMMAND").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(stack_file: &str, automation_command: &str) -> Self {
        Self {
            stack_file: Some(stack_file.to_owned()),
            lock_timeout_ms: None,
            automation_command: Some(automation_command.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, the user config file, and env
    /// overrides.
    pub fn load() -> Result<Self> {
        Self::load_with_layers(user_config_path(), EnvOverrides::from_env())
    }

    fn load_with_layers(user: Option<PathBuf>, env_overrides: EnvOverrides) -> Result<Self> {
        let mut config = Self::from_str(&DEFAULT_CONFIG)?;
        if let Some(user_path) = user.filter(|path| path.exists()) {
            config = config.merge(Self::from_file(&user_path)?);
        }
        Ok(apply_env_overrides(config, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, overlay: Self) -> Self {
        Self {
            storage: Storage {
                stack_file: overlay.storage.stack_file.or(self.storage.stack_file),
                lock_timeout_ms: if overlay.storage.lock_timeout_ms
                    != Storage::default_lock_timeout_ms()
                {
                    overlay.storage.lock_timeout_ms
                } else {
                    self.storage.lock_timeout_ms
                },
                max_point_age_hours: overlay
                    .storage
                    .max_point_age_hours
                    .or(self.storage.max_point_age_hours),
            },
            editor: Editor {
                automation_command: if overlay.editor.automation_command
                    != Editor::default_automation_command()
                {
                    overlay.editor.automation_command
                } else {
                    self.editor.automation_command
                },
            },
        }
    }

    /// Resolve the stack file location: the configured override, or the
    /// per-user data directory.
    pub fn stack_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.stack_file {
            return Ok(path.clone());
        }
        data_dir()
            .map(|base| base.join(STACK_DIR).join(STACK_FILE))
            .ok_or_else(|| anyhow!("no per-user data directory on this platform"))
    }

    /// Bound on waiting for the stack lock.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.lock_timeout_ms)
    }

    /// Maximum point age for push-time pruning, when configured.
    pub fn max_point_age(&self) -> Option<time::Duration> {
        self.storage
            .max_point_age_hours
            .map(|hours| time::Duration::hours(hours as i64))
    }
}

fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("jumpback/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(stack_file) = env.stack_file {
        config.storage.stack_file = Some(PathBuf::from(stack_file));
    }
    if let Some(raw) = env.lock_timeout_ms {
        match raw.parse() {
            Ok(ms) => config.storage.lock_timeout_ms = ms,
            Err(_) => warn!(value = %raw, "ignoring unparseable JUMPBACK_LOCK_TIMEOUT_MS"),
        }
    }
    if let Some(automation_command) = env.automation_command {
        config.editor.automation_command = automation_command;
    }
    config
}
