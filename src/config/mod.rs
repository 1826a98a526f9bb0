use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error as AppError;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

/// Validated runtime configuration: the Jira connection and the tracker
/// coordinates newly created tickets are filed under.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub project_key: String,
    pub issue_type: String,
    pub http_connect_timeout: Duration,
    pub http_request_timeout: Duration,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// The file is mandatory; `JIRA_*` variables and `ICINGA2JIRA`-prefixed
    /// variables override its entries. All five Jira settings (url, username,
    /// password, project key, issue type) must be present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read or
    /// parsed, when environment overrides are invalid, or when the resulting
    /// values fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(AppError::from)?;
        raw.apply_env_overrides().map_err(AppError::from)?;
        raw.validate_and_build()
    }

    /// Human-facing URL of a ticket, `<base>/browse/<key>`.
    #[must_use]
    pub fn browse_url(&self, key: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/browse/{key}")
    }
}
