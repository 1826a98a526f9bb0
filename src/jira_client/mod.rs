pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod ops;
pub(crate) mod rest;

pub use client::JiraClient;
pub use models::{IssueRef, Transition};
