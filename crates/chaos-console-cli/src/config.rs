/*
[INPUT]:  Built-in defaults, optional YAML file, CHAOS_CONSOLE__* environment
[OUTPUT]: Validated console configuration and derived client/poll settings
[POS]:    Configuration layer - console setup
[UPDATE]: When adding new configuration options
*/

use anyhow::{Context, Result, anyhow};
use chaos_console_adapter::{ChaosClient, ClientConfig, Credentials, PollConfig};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_PREFIX: &str = "CHAOS_CONSOLE";

/// Top-level configuration for the console
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the experiment-execution service
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub request: RequestConfig,
    pub poll: PollSettings,
    pub log: LogConfig,
    /// Where session state is persisted; defaults to the platform data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_ms: u64,
    pub max_consecutive_errors: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_polls: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "info" or "chaos_console=debug"
    pub level: String,
    /// Enables a daily rolling log file in this directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            namespace: None,
            access_token: None,
            request: RequestConfig::default(),
            poll: PollSettings::default(),
            log: LogConfig::default(),
            session_dir: None,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            timeout_secs: client.timeout.as_secs(),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            max_retries: client.max_retries,
            retry_backoff_ms: u64::try_from(client.retry_backoff.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        let poll = PollConfig::default();
        Self {
            interval_ms: u64::try_from(poll.interval.as_millis()).unwrap_or(u64::MAX),
            max_consecutive_errors: poll.max_consecutive_errors,
            max_polls: poll.max_polls,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:7001".to_string()
}

impl ConsoleConfig {
    /// Load configuration: defaults, then the YAML file (if given), then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`ConsoleConfig::load`], with an explicit environment map instead of the process one
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(anyhow!("endpoint cannot be empty"));
        }
        Url::parse(&self.endpoint).with_context(|| format!("invalid endpoint '{}'", self.endpoint))?;
        if self.poll.interval_ms == 0 {
            return Err(anyhow!("poll.interval_ms must be greater than zero"));
        }
        if self.poll.max_consecutive_errors == 0 {
            return Err(anyhow!("poll.max_consecutive_errors must be greater than zero"));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request.timeout_secs),
            connect_timeout: Duration::from_secs(self.request.connect_timeout_secs),
            max_retries: self.request.max_retries,
            retry_backoff: Duration::from_millis(self.request.retry_backoff_ms),
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll.interval_ms),
            max_consecutive_errors: self.poll.max_consecutive_errors,
            max_polls: self.poll.max_polls,
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.access_token.as_ref().map(|token| Credentials {
            access_token: token.clone(),
            namespace: self.namespace.clone(),
        })
    }

    pub fn build_client(&self) -> Result<ChaosClient> {
        let mut client = ChaosClient::with_config_and_base_url(self.client_config(), &self.endpoint)
            .context("build experiment service client")?;
        if let Some(credentials) = self.credentials() {
            client.set_credentials(credentials);
        }
        Ok(client)
    }

    /// Write configuration as YAML
    pub fn write_yaml(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("serialize config to YAML")?;
        std::fs::write(path, yaml).with_context(|| format!("write config to {}", path.display()))?;
        Ok(())
    }
}
