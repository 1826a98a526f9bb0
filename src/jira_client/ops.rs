use reqwest::Method;
use serde_json::json;

use crate::Result;

use super::JiraClient;
use super::models::{IssueRef, IssueRow, SearchResults, Transition, TransitionList};

impl JiraClient {
    pub async fn create_issue(
        &self,
        project_key: &str,
        issue_type: &str,
        summary: &str,
        description: &str,
        labels: &[String],
    ) -> Result<IssueRef> {
        let body = json!({
            "fields": {
                "project": { "key": project_key },
                "summary": summary,
                "description": description,
                "issuetype": { "name": issue_type },
                "labels": labels,
            }
        });
        let row: IssueRow = self
            .call(
                "issue.create",
                Method::POST,
                &["rest", "api", "2", "issue"],
                Some(&body),
            )
            .await?;
        Ok(IssueRef::from(row))
    }

    /// All issues currently tagged with `label`.
    pub async fn search_issues(&self, label: &str) -> Result<Vec<IssueRef>> {
        let body = json!({
            "jql": format!("labels = '{label}'"),
            "fields": ["key"],
        });
        let results: SearchResults = self
            .call(
                "issue.search",
                Method::POST,
                &["rest", "api", "2", "search"],
                Some(&body),
            )
            .await?;
        Ok(results.issues.into_iter().map(IssueRef::from).collect())
    }

    pub async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let list: TransitionList = self
            .call(
                "issue.transitions",
                Method::GET,
                &["rest", "api", "2", "issue", key, "transitions"],
                None,
            )
            .await?;
        Ok(list.transitions.into_iter().map(Transition::from).collect())
    }

    pub async fn run_transition(&self, key: &str, transition_id: &str) -> Result<()> {
        let body = json!({ "transition": { "id": transition_id } });
        self.call_no_content(
            "issue.transition",
            Method::POST,
            &["rest", "api", "2", "issue", key, "transitions"],
            Some(&body),
        )
        .await
    }

    pub async fn add_comment(&self, key: &str, text: &str) -> Result<()> {
        let body = json!({ "body": text });
        self.call_no_content(
            "issue.comment",
            Method::POST,
            &["rest", "api", "2", "issue", key, "comment"],
            Some(&body),
        )
        .await
    }
}
