use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Jira(#[from] JiraError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Failures around the notification payload itself: an incomplete
/// environment, a kind with no ticket action, or a recovery-only accessor
/// used on the wrong kind of event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("environment is missing values: {}", .variables.join(", "))]
    MissingVariables { variables: Vec<&'static str> },
    #[error("notification is not a recovery, but {kind}")]
    NotRecovery { kind: String },
    #[error("no ticket action for notification type {kind}")]
    NoAction { kind: String },
}

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("Jira API error ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("ticket {key} does not have a 'Close' transition; maybe it's already closed")]
    NoCloseTransition { key: String },
    #[error("retry budget exhausted")]
    RetryExhausted {
        #[source]
        source: Box<JiraError>,
    },
}

impl From<reqwest::Error> for JiraError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}
