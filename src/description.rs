//! Renders the human-readable ticket body and closing comment.
//!
//! Ticket bodies are user-facing and diffed by operators, so the layout is
//! byte-for-byte stable: Jira `{color}` markup headers, a fixed detail block,
//! and kind-specific trailing lines.

use std::fmt::Write as FmtWrite;

use crate::notification::NotificationEvent;
use crate::types::NotificationKind;

const PROBLEM_HEADER: &str = "{color:#3b0b0b}*Icinga Problem Alert*{color}";
const RECOVERY_HEADER: &str = "{color:#0b3b0b}*Icinga Recovery Alert*{color}";
const ACKNOWLEDGEMENT_HEADER: &str = "{color:#0f5d94}*Icinga Acknowledgement*{color}";
const UNKNOWN_HEADER: &str = "{color:#585858}*Unknown Alert*{color}";
const CLOSED_NOTE: &str = "This ticket was closed automatically.";

#[must_use]
pub fn render(event: &NotificationEvent) -> String {
    let mut out = String::new();
    out.push_str(header_for(event.kind()));
    out.push_str("\n\nThe following information was provided by Icinga:\n");
    let _ = writeln!(out, "* Date & Time: {}", text(event.short_date_time()));
    let _ = writeln!(out, "* Host Address: {}", text(event.host_address()));
    if event.service_description().is_some() {
        let _ = writeln!(out, "* Status Information: {}", text(event.service_output()));
        let _ = writeln!(out, "* Current Host State: {}", text(event.host_state()));
        let _ = writeln!(out, "* Current Service State: {}", text(event.service_state()));
    } else {
        let _ = writeln!(out, "* Status Information: {}", text(event.host_output()));
        let _ = writeln!(out, "* Current Host State: {}", text(event.host_state()));
    }
    if *event.kind() == NotificationKind::Acknowledgement {
        let _ = writeln!(out, "* Notification Author: {}", text(event.notification_author()));
        let _ = writeln!(out, "* Notification Comment: {}", text(event.notification_comment()));
    }
    if *event.kind() == NotificationKind::Recovery {
        out.push('\n');
        out.push_str(CLOSED_NOTE);
    }
    out.trim().to_string()
}

fn header_for(kind: &NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Problem => PROBLEM_HEADER,
        NotificationKind::Recovery => RECOVERY_HEADER,
        NotificationKind::Acknowledgement => ACKNOWLEDGEMENT_HEADER,
        NotificationKind::Other(_) => UNKNOWN_HEADER,
    }
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or_default()
}
