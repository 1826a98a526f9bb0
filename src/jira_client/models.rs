use serde::Deserialize;

/// Opaque reference to a tracker ticket. The core never inspects more than
/// the key (and never constructs one outside of API responses).
#[derive(Debug, Clone)]
pub struct IssueRef {
    pub id: String,
    pub key: String,
}

/// One workflow transition a ticket currently offers.
#[derive(Debug, Clone)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub(crate) id: String,
    pub(crate) key: String,
}

impl From<IssueRow> for IssueRef {
    fn from(value: IssueRow) -> Self {
        Self {
            id: value.id,
            key: value.key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub(crate) issues: Vec<IssueRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionList {
    #[serde(default)]
    pub(crate) transitions: Vec<TransitionRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    name: String,
}

impl From<TransitionRow> for Transition {
    fn from(value: TransitionRow) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

// Jira serializes IDs as strings, but some deployments and proxies hand
// back bare integers. IDs stay opaque strings either way.
fn deserialize_id<'de, D>(de: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeId {
        Str(String),
        Int(i64),
    }

    Ok(match MaybeId::deserialize(de)? {
        MaybeId::Str(value) => value,
        MaybeId::Int(value) => value.to_string(),
    })
}
