#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod action;
pub mod config;
pub mod description;
pub mod error;
pub mod jira_client;
pub mod notification;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
