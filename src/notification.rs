use std::collections::HashMap;

use crate::Result;
use crate::error::EventError;
use crate::types::NotificationKind;

/// Prefix shared by every correlation label this tool writes into Jira.
pub const ICINGA_PREFIX: &str = "ICI";

pub const VAR_HOST_ADDRESS: &str = "ICINGA_HOSTADDRESS";
pub const VAR_HOST_NAME: &str = "ICINGA_HOSTNAME";
pub const VAR_HOST_OUTPUT: &str = "ICINGA_HOSTOUTPUT";
pub const VAR_HOST_PROBLEM_ID: &str = "ICINGA_HOSTPROBLEMID";
pub const VAR_HOST_STATE: &str = "ICINGA_HOSTSTATE";
pub const VAR_LAST_HOST_PROBLEM_ID: &str = "ICINGA_LASTHOSTPROBLEMID";
pub const VAR_LAST_SERVICE_PROBLEM_ID: &str = "ICINGA_LASTSERVICEPROBLEMID";
pub const VAR_NOTIFICATION_AUTHOR: &str = "ICINGA_NOTIFICATIONAUTHOR";
pub const VAR_NOTIFICATION_COMMENT: &str = "ICINGA_NOTIFICATIONCOMMENT";
pub const VAR_NOTIFICATION_TYPE: &str = "ICINGA_NOTIFICATIONTYPE";
pub const VAR_SERVICE_DESCRIPTION: &str = "ICINGA_SERVICEDESC";
pub const VAR_SERVICE_OUTPUT: &str = "ICINGA_SERVICEOUTPUT";
pub const VAR_SERVICE_PRIORITY_ID: &str = "ICINGA_SERVICEJIRA_PRIORITY_ID";
pub const VAR_SERVICE_PROBLEM_ID: &str = "ICINGA_SERVICEPROBLEMID";
pub const VAR_SERVICE_STATE: &str = "ICINGA_SERVICESTATE";
pub const VAR_SHORT_DATE_TIME: &str = "ICINGA_SHORTDATETIME";

/// One Icinga notification, decoded from the variables the monitoring
/// daemon injects into the notification command's environment.
///
/// The snapshot is validated at construction and read-only afterwards.
/// Empty-string variables count as absent, and problem IDs stay opaque
/// strings: they only ever travel into labels, never into arithmetic.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    kind: NotificationKind,
    host_address: Option<String>,
    host_name: Option<String>,
    host_output: Option<String>,
    host_problem_id: Option<String>,
    host_state: Option<String>,
    last_host_problem_id: Option<String>,
    last_service_problem_id: Option<String>,
    notification_author: Option<String>,
    notification_comment: Option<String>,
    service_description: Option<String>,
    service_output: Option<String>,
    service_priority_id: Option<String>,
    service_problem_id: Option<String>,
    service_state: Option<String>,
    short_date_time: Option<String>,
}

impl NotificationEvent {
    /// Decode a notification from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns a validation failure when the environment does not describe a
    /// well-formed notification; see [`NotificationEvent::from_env_map`].
    pub fn from_process_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_env_map(&vars)
    }

    /// Decode a notification from an explicit variable mapping.
    ///
    /// # Errors
    ///
    /// Fails when `ICINGA_NOTIFICATIONTYPE` is absent, when a PROBLEM
    /// notification matches neither the service shape nor the host shape
    /// (the error lists every missing variable of both shapes), or when a
    /// RECOVERY notification lacks the prior problem ID for its shape.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self> {
        let raw_kind = lookup(vars, VAR_NOTIFICATION_TYPE).ok_or(EventError::MissingVariables {
            variables: vec![VAR_NOTIFICATION_TYPE],
        })?;

        let event = Self {
            kind: NotificationKind::from_raw(&raw_kind),
            host_address: lookup(vars, VAR_HOST_ADDRESS),
            host_name: lookup(vars, VAR_HOST_NAME),
            host_output: lookup(vars, VAR_HOST_OUTPUT),
            host_problem_id: lookup(vars, VAR_HOST_PROBLEM_ID),
            host_state: lookup(vars, VAR_HOST_STATE),
            last_host_problem_id: lookup(vars, VAR_LAST_HOST_PROBLEM_ID),
            last_service_problem_id: lookup(vars, VAR_LAST_SERVICE_PROBLEM_ID),
            notification_author: lookup(vars, VAR_NOTIFICATION_AUTHOR),
            notification_comment: lookup(vars, VAR_NOTIFICATION_COMMENT),
            service_description: lookup(vars, VAR_SERVICE_DESCRIPTION),
            service_output: lookup(vars, VAR_SERVICE_OUTPUT),
            service_priority_id: lookup(vars, VAR_SERVICE_PRIORITY_ID),
            service_problem_id: lookup(vars, VAR_SERVICE_PROBLEM_ID),
            service_state: lookup(vars, VAR_SERVICE_STATE),
            short_date_time: lookup(vars, VAR_SHORT_DATE_TIME),
        };
        event.validate()?;
        Ok(event)
    }

    #[must_use]
    pub const fn kind(&self) -> &NotificationKind {
        &self.kind
    }

    #[must_use]
    pub fn host_address(&self) -> Option<&str> {
        self.host_address.as_deref()
    }

    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref()
    }

    #[must_use]
    pub fn host_output(&self) -> Option<&str> {
        self.host_output.as_deref()
    }

    #[must_use]
    pub fn host_problem_id(&self) -> Option<&str> {
        self.host_problem_id.as_deref()
    }

    #[must_use]
    pub fn host_state(&self) -> Option<&str> {
        self.host_state.as_deref()
    }

    #[must_use]
    pub fn last_host_problem_id(&self) -> Option<&str> {
        self.last_host_problem_id.as_deref()
    }

    #[must_use]
    pub fn last_service_problem_id(&self) -> Option<&str> {
        self.last_service_problem_id.as_deref()
    }

    #[must_use]
    pub fn notification_author(&self) -> Option<&str> {
        self.notification_author.as_deref()
    }

    #[must_use]
    pub fn notification_comment(&self) -> Option<&str> {
        self.notification_comment.as_deref()
    }

    #[must_use]
    pub fn service_description(&self) -> Option<&str> {
        self.service_description.as_deref()
    }

    #[must_use]
    pub fn service_output(&self) -> Option<&str> {
        self.service_output.as_deref()
    }

    #[must_use]
    pub fn service_priority_id(&self) -> Option<&str> {
        self.service_priority_id.as_deref()
    }

    #[must_use]
    pub fn service_problem_id(&self) -> Option<&str> {
        self.service_problem_id.as_deref()
    }

    #[must_use]
    pub fn service_state(&self) -> Option<&str> {
        self.service_state.as_deref()
    }

    #[must_use]
    pub fn short_date_time(&self) -> Option<&str> {
        self.short_date_time.as_deref()
    }

    #[must_use]
    pub fn has_new_problem(&self) -> bool {
        self.kind == NotificationKind::Problem
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        self.kind == NotificationKind::Recovery
    }

    /// An event is a service issue as soon as either problem ID of the
    /// service pair is present; everything else counts as a host issue.
    #[must_use]
    pub const fn is_service_issue(&self) -> bool {
        self.service_problem_id.is_some() || self.last_service_problem_id.is_some()
    }

    #[must_use]
    pub const fn is_host_issue(&self) -> bool {
        !self.is_service_issue()
    }

    /// Problem ID the recovering condition was originally reported under.
    ///
    /// # Errors
    ///
    /// Calling this on anything but a RECOVERY event is a caller bug and
    /// yields [`EventError::NotRecovery`].
    pub fn recovery_last_problem_id(&self) -> Result<&str> {
        if !self.is_recovered() {
            return Err(EventError::NotRecovery {
                kind: self.kind.to_string(),
            }
            .into());
        }
        let (variable, id) = if self.is_service_issue() {
            (VAR_LAST_SERVICE_PROBLEM_ID, self.last_service_problem_id.as_deref())
        } else {
            (VAR_LAST_HOST_PROBLEM_ID, self.last_host_problem_id.as_deref())
        };
        id.ok_or_else(|| {
            EventError::MissingVariables {
                variables: vec![variable],
            }
            .into()
        })
    }

    /// Label to search for when closing the tickets this recovery resolves.
    ///
    /// # Errors
    ///
    /// Same contract as [`NotificationEvent::recovery_last_problem_id`].
    pub fn recovery_label(&self) -> Result<String> {
        Ok(self.icinga_label(self.recovery_last_problem_id()?))
    }

    /// Labels attached to a newly created ticket. Always exactly one.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let id = if self.is_service_issue() {
            self.service_problem_id.as_deref()
        } else {
            self.host_problem_id.as_deref()
        };
        vec![self.icinga_label(id.unwrap_or_default())]
    }

    fn icinga_label(&self, problem_id: &str) -> String {
        format!(
            "{ICINGA_PREFIX}#{problem_id}#{}",
            self.host_name.as_deref().unwrap_or_default()
        )
    }

    fn validate(&self) -> Result<()> {
        if self.has_new_problem() {
            self.validate_problem_data()
        } else if self.is_recovered() {
            self.validate_recovery_data()
        } else {
            // Acknowledgements and unknown kinds carry no structural contract.
            Ok(())
        }
    }

    // A PROBLEM is acceptable in either of two shapes; only when both are
    // incomplete does validation fail, listing the union of what is missing.
    fn validate_problem_data(&self) -> Result<()> {
        let missing_service = self.missing(&[VAR_HOST_NAME, VAR_SERVICE_STATE, VAR_SERVICE_PROBLEM_ID]);
        let missing_host = self.missing(&[VAR_HOST_NAME, VAR_HOST_STATE, VAR_HOST_PROBLEM_ID]);
        if missing_service.is_empty() || missing_host.is_empty() {
            return Ok(());
        }

        let mut variables = missing_service;
        variables.extend(missing_host);
        variables.sort_unstable();
        variables.dedup();
        Err(EventError::MissingVariables { variables }.into())
    }

    fn validate_recovery_data(&self) -> Result<()> {
        let required: &[&'static str] = if self.is_service_issue() {
            &[VAR_LAST_SERVICE_PROBLEM_ID]
        } else {
            &[VAR_LAST_HOST_PROBLEM_ID]
        };
        let variables = self.missing(required);
        if variables.is_empty() {
            Ok(())
        } else {
            Err(EventError::MissingVariables { variables }.into())
        }
    }

    fn missing(&self, variables: &[&'static str]) -> Vec<&'static str> {
        variables
            .iter()
            .copied()
            .filter(|variable| self.value_of(variable).is_none())
            .collect()
    }

    fn value_of(&self, variable: &str) -> Option<&str> {
        match variable {
            VAR_HOST_NAME => self.host_name.as_deref(),
            VAR_HOST_STATE => self.host_state.as_deref(),
            VAR_HOST_PROBLEM_ID => self.host_problem_id.as_deref(),
            VAR_LAST_HOST_PROBLEM_ID => self.last_host_problem_id.as_deref(),
            VAR_LAST_SERVICE_PROBLEM_ID => self.last_service_problem_id.as_deref(),
            VAR_SERVICE_STATE => self.service_state.as_deref(),
            VAR_SERVICE_PROBLEM_ID => self.service_problem_id.as_deref(),
            _ => None,
        }
    }
}

fn lookup(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|value| !value.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use super::*;
    use crate::error::{Error, EventError};
    use crate::types::NotificationKind;

    fn service_problem_vars() -> HashMap<String, String> {
        to_map(&[
            (VAR_NOTIFICATION_TYPE, "PROBLEM"),
            (VAR_HOST_NAME, "myserver1"),
            (VAR_HOST_OUTPUT, "any host output"),
            (VAR_HOST_STATE, "any host state"),
            (VAR_SERVICE_DESCRIPTION, "foo application services"),
            (VAR_SERVICE_OUTPUT, "any service message"),
            (VAR_SERVICE_PROBLEM_ID, "12345"),
            (VAR_SERVICE_STATE, "any service state"),
            (VAR_SHORT_DATE_TIME, "11-26-2013 15:42:05"),
        ])
    }

    fn host_problem_vars() -> HashMap<String, String> {
        to_map(&[
            (VAR_NOTIFICATION_TYPE, "PROBLEM"),
            (VAR_HOST_NAME, "myserver1"),
            (VAR_HOST_OUTPUT, "any host output"),
            (VAR_HOST_PROBLEM_ID, "76543"),
            (VAR_HOST_STATE, "any host state"),
            (VAR_SHORT_DATE_TIME, "11-26-2013 15:42:05"),
        ])
    }

    fn service_recovery_vars() -> HashMap<String, String> {
        let mut vars = service_problem_vars();
        vars.insert(VAR_NOTIFICATION_TYPE.to_string(), "RECOVERY".to_string());
        vars.remove(VAR_SERVICE_PROBLEM_ID);
        vars.insert(VAR_LAST_SERVICE_PROBLEM_ID.to_string(), "76540".to_string());
        vars
    }

    fn host_recovery_vars() -> HashMap<String, String> {
        to_map(&[
            (VAR_NOTIFICATION_TYPE, "RECOVERY"),
            (VAR_HOST_NAME, "myserver1"),
            (VAR_HOST_OUTPUT, "any host output"),
            (VAR_HOST_STATE, "any host state"),
            (VAR_LAST_HOST_PROBLEM_ID, "9999999999999"),
            (VAR_SHORT_DATE_TIME, "11-26-2013 15:42:05"),
        ])
    }

    fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    fn missing_variables(err: Error) -> Vec<&'static str> {
        match err {
            Error::Event(EventError::MissingVariables { variables }) => variables,
            other => panic!("expected a missing-variables failure, got {other}"),
        }
    }

    #[test]
    fn empty_and_absent_variables_normalize_to_none() {
        let mut vars = service_problem_vars();
        vars.insert(VAR_HOST_PROBLEM_ID.to_string(), String::new());
        vars.remove(VAR_NOTIFICATION_COMMENT);

        let event = NotificationEvent::from_env_map(&vars).unwrap();
        assert_eq!(event.host_problem_id(), None);
        assert_eq!(event.notification_comment(), None);
        assert_eq!(event.last_host_problem_id(), None);
    }

    #[test]
    fn empty_environment_fails_naming_the_notification_type() {
        let err = NotificationEvent::from_env_map(&HashMap::new()).unwrap_err();
        assert_eq!(missing_variables(err), vec![VAR_NOTIFICATION_TYPE]);
    }

    #[test]
    fn problem_with_only_notification_type_lists_both_shapes() {
        let vars = to_map(&[(VAR_NOTIFICATION_TYPE, "PROBLEM")]);
        let err = NotificationEvent::from_env_map(&vars).unwrap_err();
        assert_eq!(
            missing_variables(err),
            vec![
                VAR_HOST_NAME,
                VAR_HOST_PROBLEM_ID,
                VAR_HOST_STATE,
                VAR_SERVICE_PROBLEM_ID,
                VAR_SERVICE_STATE,
            ]
        );
    }

    #[test]
    fn problem_with_minimal_service_shape_passes() {
        let vars = to_map(&[
            (VAR_NOTIFICATION_TYPE, "PROBLEM"),
            (VAR_HOST_NAME, "myserver1"),
            (VAR_SERVICE_DESCRIPTION, "foo application services"),
            (VAR_SERVICE_PROBLEM_ID, "12345"),
            (VAR_SERVICE_STATE, "any service state"),
        ]);
        let event = NotificationEvent::from_env_map(&vars).unwrap();
        assert!(event.is_service_issue());
        assert!(event.has_new_problem());
    }

    #[test]
    fn problem_with_empty_service_problem_id_fails() {
        let mut vars = service_problem_vars();
        vars.insert(VAR_SERVICE_PROBLEM_ID.to_string(), String::new());
        // host shape is incomplete too (no host problem ID), so this fails
        let err = NotificationEvent::from_env_map(&vars).unwrap_err();
        assert!(missing_variables(err).contains(&VAR_SERVICE_PROBLEM_ID));
    }

    #[test]
    fn problem_with_complete_host_shape_passes_without_service_fields() {
        let event = NotificationEvent::from_env_map(&host_problem_vars()).unwrap();
        assert!(event.is_host_issue());
        assert!(!event.is_service_issue());
    }

    #[test]
    fn service_recovery_requires_last_service_problem_id() {
        let mut vars = service_recovery_vars();
        vars.remove(VAR_LAST_SERVICE_PROBLEM_ID);
        // keep the event service-classified through the current problem ID
        vars.insert(VAR_SERVICE_PROBLEM_ID.to_string(), "12345".to_string());
        let err = NotificationEvent::from_env_map(&vars).unwrap_err();
        assert_eq!(missing_variables(err), vec![VAR_LAST_SERVICE_PROBLEM_ID]);
    }

    #[test]
    fn recovery_without_any_service_marker_falls_back_to_the_host_shape() {
        let mut vars = service_recovery_vars();
        vars.remove(VAR_LAST_SERVICE_PROBLEM_ID);
        let err = NotificationEvent::from_env_map(&vars).unwrap_err();
        assert_eq!(missing_variables(err), vec![VAR_LAST_HOST_PROBLEM_ID]);
    }

    #[test]
    fn host_recovery_requires_last_host_problem_id() {
        let mut vars = host_recovery_vars();
        vars.remove(VAR_LAST_HOST_PROBLEM_ID);
        let err = NotificationEvent::from_env_map(&vars).unwrap_err();
        assert_eq!(missing_variables(err), vec![VAR_LAST_HOST_PROBLEM_ID]);
    }

    #[test]
    fn acknowledgement_skips_structural_validation() {
        let vars = to_map(&[(VAR_NOTIFICATION_TYPE, "ACKNOWLEDGEMENT")]);
        let event = NotificationEvent::from_env_map(&vars).unwrap();
        assert_eq!(*event.kind(), NotificationKind::Acknowledgement);
    }

    #[test]
    fn unknown_kind_skips_structural_validation() {
        let vars = to_map(&[(VAR_NOTIFICATION_TYPE, "FLAPPINGSTART")]);
        let event = NotificationEvent::from_env_map(&vars).unwrap();
        assert!(!event.has_new_problem());
        assert!(!event.is_recovered());
    }

    #[test]
    fn service_problem_produces_exactly_one_service_label() {
        let event = NotificationEvent::from_env_map(&service_problem_vars()).unwrap();
        assert_eq!(event.labels(), vec!["ICI#12345#myserver1".to_string()]);
    }

    #[test]
    fn host_problem_produces_exactly_one_host_label() {
        let event = NotificationEvent::from_env_map(&host_problem_vars()).unwrap();
        assert_eq!(event.labels(), vec!["ICI#76543#myserver1".to_string()]);
    }

    #[test]
    fn recovery_label_uses_the_last_service_problem_id() {
        let event = NotificationEvent::from_env_map(&service_recovery_vars()).unwrap();
        assert_eq!(event.recovery_label().unwrap(), "ICI#76540#myserver1");
    }

    #[test]
    fn recovery_label_uses_the_last_host_problem_id() {
        let event = NotificationEvent::from_env_map(&host_recovery_vars()).unwrap();
        assert_eq!(event.recovery_label().unwrap(), "ICI#9999999999999#myserver1");
    }

    #[test]
    fn open_label_matches_later_recovery_search_label() {
        let mut vars = host_problem_vars();
        vars.insert(VAR_HOST_PROBLEM_ID.to_string(), "424242".to_string());
        let opened = NotificationEvent::from_env_map(&vars).unwrap();

        let mut recovered = host_recovery_vars();
        recovered.insert(VAR_LAST_HOST_PROBLEM_ID.to_string(), "424242".to_string());
        let recovered = NotificationEvent::from_env_map(&recovered).unwrap();

        assert_eq!(opened.labels()[0], recovered.recovery_label().unwrap());
    }

    #[test]
    fn recovery_accessor_on_problem_event_is_a_usage_error() {
        let event = NotificationEvent::from_env_map(&service_problem_vars()).unwrap();
        let err = event.recovery_last_problem_id().unwrap_err();
        match err {
            Error::Event(EventError::NotRecovery { kind }) => assert_eq!(kind, "PROBLEM"),
            other => panic!("expected a usage error, got {other}"),
        }
    }

    #[test]
    fn recovery_accessor_on_acknowledgement_is_a_usage_error() {
        let vars = to_map(&[(VAR_NOTIFICATION_TYPE, "ACKNOWLEDGEMENT")]);
        let event = NotificationEvent::from_env_map(&vars).unwrap();
        assert!(matches!(
            event.recovery_last_problem_id().unwrap_err(),
            Error::Event(EventError::NotRecovery { .. })
        ));
    }
}
