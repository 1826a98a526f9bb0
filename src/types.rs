use std::fmt::{self, Display};

/// Kind of an inbound Icinga notification.
///
/// Only `Problem` and `Recovery` map to ticket actions; `Acknowledgement`
/// is recognized (it changes how the description renders) but resolves to
/// no action, and anything else is carried verbatim in `Other`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NotificationKind {
    Problem,
    Recovery,
    Acknowledgement,
    Other(String),
}

impl NotificationKind {
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "PROBLEM" => Self::Problem,
            "RECOVERY" => Self::Recovery,
            "ACKNOWLEDGEMENT" => Self::Acknowledgement,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Problem => "PROBLEM",
            Self::Recovery => "RECOVERY",
            Self::Acknowledgement => "ACKNOWLEDGEMENT",
            Self::Other(raw) => raw,
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
