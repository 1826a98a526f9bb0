//! Maps a validated notification onto its single idempotent ticket
//! operation: open a ticket for a new problem, or close-and-comment the
//! tickets a recovery resolves.

use tracing::{info, warn};

use crate::Result;
use crate::config::Config;
use crate::description;
use crate::error::{EventError, JiraError};
use crate::jira_client::{IssueRef, JiraClient};
use crate::notification::NotificationEvent;

/// Exact, case-sensitive name of the workflow transition that closes a ticket.
const CLOSE_TRANSITION: &str = "Close";

/// The two ticket operations this tool knows. The domain has exactly these
/// two cases, so the set is closed on purpose.
#[derive(Debug)]
pub enum TicketAction {
    Open(OpenTicket),
    Close(CloseTicket),
}

impl TicketAction {
    /// Select the action matching the notification's classification.
    ///
    /// # Errors
    ///
    /// Acknowledgements and unknown kinds validate fine but have no ticket
    /// action; resolving them yields [`EventError::NoAction`].
    pub fn resolve(client: JiraClient, event: NotificationEvent, config: &Config) -> Result<Self> {
        if event.has_new_problem() {
            Ok(Self::Open(OpenTicket {
                client,
                project_key: config.project_key.clone(),
                issue_type: config.issue_type.clone(),
                event,
            }))
        } else if event.is_recovered() {
            Ok(Self::Close(CloseTicket { client, event }))
        } else {
            Err(EventError::NoAction {
                kind: event.kind().to_string(),
            }
            .into())
        }
    }

    /// Run the action, returning the tickets it affected.
    ///
    /// # Errors
    ///
    /// See [`OpenTicket::execute`] and [`CloseTicket::execute`].
    pub async fn execute(&self) -> Result<Vec<IssueRef>> {
        match self {
            Self::Open(action) => action.execute().await,
            Self::Close(action) => action.execute().await,
        }
    }
}

/// Files one new ticket for a PROBLEM notification.
#[derive(Debug)]
pub struct OpenTicket {
    client: JiraClient,
    project_key: String,
    issue_type: String,
    event: NotificationEvent,
}

impl OpenTicket {
    /// # Errors
    ///
    /// A tracker-side failure propagates unchanged; nothing is retried at
    /// this level and no partial state is left behind.
    pub async fn execute(&self) -> Result<Vec<IssueRef>> {
        let summary = self.summary();
        let description = description::render(&self.event);
        let labels = self.event.labels();

        let issue = self
            .client
            .create_issue(
                &self.project_key,
                &self.issue_type,
                &summary,
                &description,
                &labels,
            )
            .await?;
        info!(key = %issue.key, label = %labels[0], "ticket created");
        Ok(vec![issue])
    }

    fn summary(&self) -> String {
        if self.event.is_service_issue() {
            format!(
                "ICINGA: {} on {} is {}",
                self.event.service_description().unwrap_or_default(),
                self.event.host_name().unwrap_or_default(),
                self.event.service_state().unwrap_or_default()
            )
        } else {
            format!(
                "ICINGA: {} is {}",
                self.event.host_name().unwrap_or_default(),
                self.event.host_state().unwrap_or_default()
            )
        }
    }
}

/// Closes and comments every open ticket tagged with the recovery's label.
#[derive(Debug)]
pub struct CloseTicket {
    client: JiraClient,
    event: NotificationEvent,
}

impl CloseTicket {
    /// Tickets that fail to close are logged and skipped, never aborting
    /// their siblings. Zero matches is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Only the label search itself is fatal; per-ticket failures are
    /// isolated.
    pub async fn execute(&self) -> Result<Vec<IssueRef>> {
        let label = self.event.recovery_label()?;
        let issues = self.client.search_issues(&label).await?;
        if issues.is_empty() {
            info!(label = %label, "no open tickets match the recovery label");
            return Ok(Vec::new());
        }

        let comment = description::render(&self.event);
        let mut handled = Vec::new();
        for issue in issues {
            if let Err(err) = self.close(&issue).await {
                warn!(key = %issue.key, reason = %err, "ticket could not be closed");
                continue;
            }
            // The close stands even when the comment fails; the ticket still
            // counts as handled.
            if let Err(err) = self.client.add_comment(&issue.key, &comment).await {
                warn!(key = %issue.key, reason = %err, "closing comment could not be added");
            }
            info!(key = %issue.key, label = %label, "ticket closed");
            handled.push(issue);
        }
        Ok(handled)
    }

    async fn close(&self, issue: &IssueRef) -> Result<()> {
        let transitions = self.client.transitions(&issue.key).await?;
        let close = transitions
            .into_iter()
            .find(|transition| transition.name == CLOSE_TRANSITION)
            .ok_or_else(|| JiraError::NoCloseTransition {
                key: issue.key.clone(),
            })?;
        self.client.run_transition(&issue.key, &close.id).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::TicketAction;
    use crate::config::Config;
    use crate::error::{Error, EventError};
    use crate::jira_client::JiraClient;
    use crate::notification::{
        NotificationEvent, VAR_HOST_NAME, VAR_HOST_PROBLEM_ID, VAR_HOST_STATE,
        VAR_NOTIFICATION_TYPE, VAR_SERVICE_DESCRIPTION, VAR_SERVICE_PROBLEM_ID, VAR_SERVICE_STATE,
    };

    fn event(pairs: &[(&str, &str)]) -> NotificationEvent {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        NotificationEvent::from_env_map(&vars).unwrap()
    }

    fn config() -> Config {
        Config {
            base_url: Url::parse("https://jira.example.com").unwrap(),
            username: "bot".to_string(),
            password: SecretString::from("secret"),
            project_key: "MON".to_string(),
            issue_type: "Technical task".to_string(),
            http_connect_timeout: Duration::from_secs(1),
            http_request_timeout: Duration::from_secs(2),
        }
    }

    fn client(config: &Config) -> JiraClient {
        JiraClient::new(
            config.base_url.clone(),
            config.username.clone(),
            config.password.clone(),
            config.http_request_timeout,
            config.http_connect_timeout,
            false,
        )
        .unwrap()
    }

    #[test]
    fn acknowledgement_resolves_to_no_action() {
        let config = config();
        let event = event(&[(VAR_NOTIFICATION_TYPE, "ACKNOWLEDGEMENT")]);
        let err = TicketAction::resolve(client(&config), event, &config).unwrap_err();
        match err {
            Error::Event(EventError::NoAction { kind }) => assert_eq!(kind, "ACKNOWLEDGEMENT"),
            other => panic!("expected a classification failure, got {other}"),
        }
    }

    #[test]
    fn service_problem_summary_names_service_host_and_state() {
        let config = config();
        let event = event(&[
            (VAR_NOTIFICATION_TYPE, "PROBLEM"),
            (VAR_HOST_NAME, "myserver1"),
            (VAR_SERVICE_DESCRIPTION, "foo application services"),
            (VAR_SERVICE_PROBLEM_ID, "12345"),
            (VAR_SERVICE_STATE, "any service state"),
        ]);
        match TicketAction::resolve(client(&config), event, &config).unwrap() {
            TicketAction::Open(action) => assert_eq!(
                action.summary(),
                "ICINGA: foo application services on myserver1 is any service state"
            ),
            TicketAction::Close(_) => panic!("a problem must resolve to an open action"),
        }
    }

    #[test]
    fn host_problem_summary_names_host_and_state() {
        let config = config();
        let event = event(&[
            (VAR_NOTIFICATION_TYPE, "PROBLEM"),
            (VAR_HOST_NAME, "myserver1"),
            (VAR_HOST_PROBLEM_ID, "76543"),
            (VAR_HOST_STATE, "DOWN"),
        ]);
        match TicketAction::resolve(client(&config), event, &config).unwrap() {
            TicketAction::Open(action) => {
                assert_eq!(action.summary(), "ICINGA: myserver1 is DOWN");
            }
            TicketAction::Close(_) => panic!("a problem must resolve to an open action"),
        }
    }
}
