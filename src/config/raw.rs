use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{default_connect_timeout, default_request_timeout};
use super::env::{env_duration, env_string};
use super::{Config, HumantimeDuration};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    std::fs::metadata(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut builder = ::config::Config::builder();
    builder = builder.add_source(::config::File::from(path));
    builder = builder.add_source(
        ::config::Environment::with_prefix("ICINGA2JIRA")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) jira: RawJira,
    #[serde(default)]
    pub(super) http: RawHttp,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawJira {
    pub(super) url: Option<String>,
    pub(super) username: Option<String>,
    pub(super) password: Option<String>,
    pub(super) project_key: Option<String>,
    pub(super) issue_type: Option<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) request_timeout: Duration,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string("JIRA_URL")? {
            self.jira.url = Some(url);
        }
        if let Some(username) = env_string("JIRA_USERNAME")? {
            self.jira.username = Some(username);
        }
        if let Some(password) = env_string("JIRA_PASSWORD")? {
            self.jira.password = Some(password);
        }
        if let Some(project_key) = env_string("JIRA_PROJECT_KEY")? {
            self.jira.project_key = Some(project_key);
        }
        if let Some(issue_type) = env_string("JIRA_ISSUE_TYPE")? {
            self.jira.issue_type = Some(issue_type);
        }
        if let Some(timeout) = env_duration("HTTP_CONNECT_TIMEOUT")? {
            self.http.connect_timeout = timeout;
        }
        if let Some(timeout) = env_duration("HTTP_REQUEST_TIMEOUT")? {
            self.http.request_timeout = timeout;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let url_str = self.jira.url.ok_or(ConfigError::MissingField { field: "jira.url" })?;
        let username = self.jira.username.ok_or(ConfigError::MissingField {
            field: "jira.username",
        })?;
        let password = self.jira.password.ok_or(ConfigError::MissingField {
            field: "jira.password",
        })?;
        let project_key = self.jira.project_key.ok_or(ConfigError::MissingField {
            field: "jira.project_key",
        })?;
        let issue_type = self.jira.issue_type.ok_or(ConfigError::MissingField {
            field: "jira.issue_type",
        })?;

        require_non_empty("jira.username", &username)?;
        require_non_empty("jira.password", &password)?;
        require_non_empty("jira.project_key", &project_key)?;
        require_non_empty("jira.issue_type", &issue_type)?;

        let base_url = Url::parse(&url_str).map_err(|err| ConfigError::InvalidField {
            field: "jira.url",
            message: err.to_string(),
        })?;

        if self.http.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "http.connect_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.http.request_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "http.request_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            base_url,
            username,
            password: password.into(),
            project_key,
            issue_type,
            http_connect_timeout: self.http.connect_timeout,
            http_request_timeout: self.http.request_timeout,
        })
    }
}

fn require_non_empty(
    field: &'static str,
    value: &str,
) -> std::result::Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            message: "value cannot be empty".to_string(),
        });
    }
    Ok(())
}
