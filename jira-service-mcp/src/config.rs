//! Configuration management for the Jira service MCP server
//!
//! Credentials for the `personal` and `work` Jira environments are loaded
//! once at startup from a TOML file and environment variables, validated,
//! and then shared read-only with every tool call.

use crate::error::{JiraMcpError, JiraMcpResult};
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Token fallback shared by both environments when no prefixed key is set.
pub const SHARED_API_KEY_VAR: &str = "JIRA_API_KEY";

/// One of the Jira deployments this server can talk to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Personal,
    #[default]
    Work,
}

impl Environment {
    /// All environments, in the order they are validated
    pub const ALL: [Environment; 2] = [Environment::Personal, Environment::Work];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Personal => "personal",
            Environment::Work => "work",
        }
    }

    /// Prefix used for this environment's variables (`PERSONAL_JIRA_URL`, ...)
    fn env_prefix(self) -> &'static str {
        match self {
            Environment::Personal => "PERSONAL",
            Environment::Work => "WORK",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = JiraMcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Environment::Personal),
            "work" => Ok(Environment::Work),
            other => Err(JiraMcpError::invalid_param(
                "environment",
                format!("unknown environment '{}', expected 'personal' or 'work'", other),
            )),
        }
    }
}

/// Connection settings for a single Jira environment
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Jira site URL, e.g. `https://example.atlassian.net`
    #[serde(default)]
    pub base_url: String,

    /// Account used for basic auth (usually an e-mail address)
    #[serde(default)]
    pub account_id: String,

    /// API token paired with `account_id`
    #[serde(default)]
    pub api_token: String,
}

// Hand-written so the token never reaches logs.
impl fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field(
                "api_token",
                &if self.api_token.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .finish()
    }
}

impl EnvironmentConfig {
    fn validate(&self, environment: Environment) -> JiraMcpResult<()> {
        let prefix = environment.env_prefix();

        if self.base_url.trim().is_empty() {
            return Err(JiraMcpError::config(format!(
                "{} environment has no Jira URL. Set {}_JIRA_URL.",
                environment, prefix
            )));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(JiraMcpError::config(format!(
                "{} Jira URL must start with http:// or https://. Got: {}",
                environment, self.base_url
            )));
        }

        if self.account_id.trim().is_empty() {
            return Err(JiraMcpError::config(format!(
                "{} environment has no Jira account. Set {}_JIRA_USER.",
                environment, prefix
            )));
        }

        if self.api_token.trim().is_empty() {
            return Err(JiraMcpError::config(format!(
                "{}_JIRA_API_KEY (or {}) environment variable required",
                prefix, SHARED_API_KEY_VAR
            )));
        }

        Ok(())
    }
}

/// Main configuration structure for the Jira service MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Personal Jira site (optional)
    pub personal: Option<EnvironmentConfig>,

    /// Work Jira site (optional)
    pub work: Option<EnvironmentConfig>,

    /// Environment used when a read-only tool call does not name one
    pub default_environment: Environment,

    /// Per-request deadline in seconds; `None` waits for the remote indefinitely
    pub request_timeout_seconds: Option<u64>,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            personal: None,
            work: None,
            default_environment: Environment::Work,
            request_timeout_seconds: None,
        }
    }
}

impl JiraConfig {
    /// Load configuration from `.env`, a TOML file and environment variables
    /// Priority: env vars > TOML file > defaults
    pub fn load() -> JiraMcpResult<Self> {
        if dotenv::dotenv().is_ok() {
            debug!("Loaded variables from .env");
        }

        let mut config = if let Ok(file_config) =
            Self::load_from_file("config/jira-service-config.toml")
        {
            info!("Loaded configuration from TOML file");
            file_config
        } else if let Ok(file_config) = Self::load_from_file("jira-service-config.toml") {
            info!("Loaded configuration from TOML file in current directory");
            file_config
        } else {
            debug!("No TOML configuration file found, using environment variables");
            Self::default()
        };

        config.load_from_env_with(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Overlay variables from `lookup` onto this configuration.
    ///
    /// An environment section is created as soon as any of its variables is
    /// present; a section that is only partially filled fails validation.
    pub fn load_from_env_with<F>(&mut self, lookup: F) -> JiraMcpResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let shared_token = lookup(SHARED_API_KEY_VAR);

        for environment in Environment::ALL {
            let prefix = environment.env_prefix();
            let url = lookup(&format!("{}_JIRA_URL", prefix));
            let user = lookup(&format!("{}_JIRA_USER", prefix));
            let token = lookup(&format!("{}_JIRA_API_KEY", prefix));

            let slot = self.slot_mut(environment);
            if slot.is_none() && url.is_none() && user.is_none() && token.is_none() {
                continue;
            }

            let section = slot.get_or_insert_with(EnvironmentConfig::default);
            if let Some(url) = url {
                section.base_url = url.trim_end_matches('/').to_string();
                debug!("Loaded {}_JIRA_URL from environment", prefix);
            }
            if let Some(user) = user {
                section.account_id = user;
                debug!("Loaded {}_JIRA_USER from environment", prefix);
            }
            if let Some(token) = token {
                section.api_token = token;
                debug!("Loaded {}_JIRA_API_KEY from environment", prefix);
            } else if section.api_token.is_empty() {
                if let Some(token) = &shared_token {
                    section.api_token = token.clone();
                    debug!(
                        "Using {} as the {} API token",
                        SHARED_API_KEY_VAR, environment
                    );
                }
            }
        }

        if let Some(default_env) = lookup("JIRA_DEFAULT_ENVIRONMENT") {
            self.default_environment = default_env
                .parse()
                .map_err(|e: JiraMcpError| JiraMcpError::config(e.to_string()))?;
            debug!("Set default environment to {}", self.default_environment);
        }

        if let Some(timeout) = lookup("JIRA_REQUEST_TIMEOUT") {
            let seconds = timeout.parse::<u64>().map_err(|_| {
                JiraMcpError::config(format!(
                    "JIRA_REQUEST_TIMEOUT must be a whole number of seconds, got '{}'",
                    timeout
                ))
            })?;
            self.request_timeout_seconds = Some(seconds).filter(|s| *s > 0);
            debug!("Set request timeout to {} seconds from environment", seconds);
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> JiraMcpResult<()> {
        let mut configured = 0;
        for environment in Environment::ALL {
            if let Some(section) = self.environment(environment) {
                section.validate(environment)?;
                configured += 1;
            }
        }

        if configured == 0 {
            return Err(JiraMcpError::config(
                "No Jira environment configured. Set PERSONAL_JIRA_URL/PERSONAL_JIRA_USER/\
                 PERSONAL_JIRA_API_KEY and/or the WORK_ equivalents.",
            ));
        }

        if self.environment(self.default_environment).is_none() {
            return Err(JiraMcpError::config(format!(
                "Default environment '{}' is not configured",
                self.default_environment
            )));
        }

        info!("Configuration validation successful");
        Ok(())
    }

    /// Settings for `environment`, if that environment is in use
    pub fn environment(&self, environment: Environment) -> Option<&EnvironmentConfig> {
        match environment {
            Environment::Personal => self.personal.as_ref(),
            Environment::Work => self.work.as_ref(),
        }
    }

    /// Environments that passed validation, in a stable order
    pub fn configured_environments(&self) -> Vec<Environment> {
        Environment::ALL
            .into_iter()
            .filter(|env| self.environment(*env).is_some())
            .collect()
    }

    fn slot_mut(&mut self, environment: Environment) -> &mut Option<EnvironmentConfig> {
        match environment {
            Environment::Personal => &mut self.personal,
            Environment::Work => &mut self.work,
        }
    }
}
