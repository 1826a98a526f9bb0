use icinga2jira::Result;
use icinga2jira::action::TicketAction;
use icinga2jira::config::Config;
use icinga2jira::jira_client::JiraClient;
use icinga2jira::notification::NotificationEvent;
use icinga2jira::telemetry::init_tracing;
use tracing::info;

use super::cli::Cli;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config = Config::from_env_and_file(&cli.config)?;
    let event = NotificationEvent::from_process_env()?;
    let kind = event.kind().clone();
    info!(%kind, "processing notification");

    let client = JiraClient::new(
        config.base_url.clone(),
        config.username.clone(),
        config.password.clone(),
        config.http_request_timeout,
        config.http_connect_timeout,
        cli.insecure,
    )?;

    let handled = TicketAction::resolve(client, event, &config)?
        .execute()
        .await?;

    if handled.is_empty() {
        println!("Event {kind} has been successfully handled: no tickets were affected");
    } else {
        let urls: Vec<String> = handled
            .iter()
            .map(|issue| config.browse_url(&issue.key))
            .collect();
        println!(
            "Event {kind} has been successfully handled: {}",
            urls.join(",")
        );
    }

    Ok(())
}
