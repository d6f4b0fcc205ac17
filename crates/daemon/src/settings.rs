//! Daemon configuration
//!
//! Built-in defaults per environment, overridden by `JOBDOCK_*` variables.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

const ENV_PREFIX: &str = "JOBDOCK";
const ENV_SELECTOR: &str = "JOBDOCK_ENV";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunEnv {
    #[default]
    Dev,
    Test,
    Prod,
}

impl RunEnv {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(RunEnv::Dev),
            "test" | "testing" => Ok(RunEnv::Test),
            "prod" | "production" => Ok(RunEnv::Prod),
            other => anyhow::bail!("Unknown {} value: {}", ENV_SELECTOR, other),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RunEnv::Dev => "dev",
            RunEnv::Test => "test",
            RunEnv::Prod => "prod",
        }
    }

    fn default_database_url(&self) -> &'static str {
        match self {
            RunEnv::Dev => "sqlite://jobdock-dev.db",
            RunEnv::Test => "sqlite::memory:",
            RunEnv::Prod => "sqlite://jobdock.db",
        }
    }

    fn default_log_format(&self) -> &'static str {
        match self {
            RunEnv::Prod => "json",
            RunEnv::Dev | RunEnv::Test => "pretty",
        }
    }
}

impl fmt::Display for RunEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Fully resolved daemon settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(skip)]
    pub env: RunEnv,
    pub database_url: String,
    pub storage_root: PathBuf,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub log_format: LogFormat,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn load_from(vars: Option<HashMap<String, String>>) -> Result<Self> {
        let selector = match &vars {
            Some(map) => map.get(ENV_SELECTOR).cloned(),
            None => std::env::var(ENV_SELECTOR).ok(),
        };
        let env = match selector {
            Some(raw) => RunEnv::parse(&raw)?,
            None => RunEnv::Dev,
        };

        let mut settings: Settings = Config::builder()
            .set_default("database_url", env.default_database_url())?
            .set_default("storage_root", "./artifacts")?
            .set_default("rpc_host", "127.0.0.1")?
            .set_default("rpc_port", 9630)?
            .set_default("log_format", env.default_log_format())?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.env = env;
        Ok(settings.expand_paths())
    }

    fn expand_paths(mut self) -> Self {
        self.storage_root = expand(&self.storage_root);
        self.log_dir = self.log_dir.as_deref().map(expand);
        self
    }
}

fn expand(path: &std::path::Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
