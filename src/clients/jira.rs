use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::Tracker;
use crate::config::Config;
use crate::types::{Sprint, SprintState, WorkItem};

/// Largest page requested from the sprint issue endpoint. Later pages are not fetched.
pub const MAX_RESULTS: usize = 100;

const ISSUE_FIELDS: &str = "summary,status,assignee,priority,issuetype,created,updated,key,duedate";

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("JIRA_BOARD_ID must be set to specify the board to use")]
    MissingBoardId,
    #[error("No active sprints found")]
    NoActiveSprint,
    #[error("Jira request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Jira agile REST client authenticated with email + API token.
pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
    board_id: Option<String>,
}

impl JiraClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config
                .jira_base_url
                .clone()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            email: config.jira_email.clone().unwrap_or_default(),
            api_token: config.jira_api_token.clone().unwrap_or_default(),
            board_id: config.jira_board_id.clone(),
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TrackerError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct SprintPage {
    #[serde(default)]
    values: Vec<JiraSprint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraSprint {
    id: u64,
    name: String,
    state: SprintState,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    goal: Option<String>,
}

#[derive(Deserialize)]
struct IssuePage {
    #[serde(default)]
    issues: Vec<JiraIssue>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    summary: Option<String>,
    status: Option<NamedField>,
    assignee: Option<UserField>,
    priority: Option<NamedField>,
    issuetype: Option<NamedField>,
    created: Option<String>,
    updated: Option<String>,
    duedate: Option<String>,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserField {
    display_name: String,
}

impl From<JiraSprint> for Sprint {
    fn from(sprint: JiraSprint) -> Self {
        Sprint {
            id: sprint.id,
            name: sprint.name,
            state: sprint.state,
            start_date: sprint.start_date.unwrap_or_default(),
            end_date: sprint.end_date.unwrap_or_default(),
            goal: sprint.goal.filter(|g| !g.is_empty()),
        }
    }
}

impl From<JiraIssue> for WorkItem {
    fn from(issue: JiraIssue) -> Self {
        let fields = issue.fields;
        WorkItem {
            id: issue.id,
            key: issue.key,
            title: fields.summary.unwrap_or_default(),
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            assignee: fields.assignee.map(|a| a.display_name),
            priority: fields
                .priority
                .map(|p| p.name)
                .unwrap_or_else(|| "Medium".to_string()),
            issue_type: fields.issuetype.map(|t| t.name).unwrap_or_default(),
            created: fields.created.unwrap_or_default(),
            updated: fields.updated.unwrap_or_default(),
            due_date: fields.duedate,
        }
    }
}

/// How many sprint items a single page left out, if Jira reported more than it returned.
fn omitted_items(total: Option<usize>, returned: usize) -> Option<usize> {
    total.filter(|&t| t > returned).map(|t| t - returned)
}

#[async_trait]
impl Tracker for JiraClient {
    fn name(&self) -> &str {
        "jira"
    }

    async fn get_active_sprint(&self) -> Result<Sprint, TrackerError> {
        let board_id = self.board_id.as_deref().ok_or(TrackerError::MissingBoardId)?;

        let page: SprintPage = self
            .get(
                &format!("/rest/agile/1.0/board/{board_id}/sprint"),
                &[("state", "active".to_string())],
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching active sprint"))?;

        let sprint = page
            .values
            .into_iter()
            .next()
            .ok_or(TrackerError::NoActiveSprint)?;
        Ok(sprint.into())
    }

    async fn get_work_items_in_sprint(&self, sprint_id: u64) -> Result<Vec<WorkItem>, TrackerError> {
        let page: IssuePage = self
            .get(
                &format!("/rest/agile/1.0/sprint/{sprint_id}/issue"),
                &[
                    ("fields", ISSUE_FIELDS.to_string()),
                    ("maxResults", MAX_RESULTS.to_string()),
                ],
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching work items"))?;

        let returned = page.issues.len();
        if let Some(omitted) = omitted_items(page.total, returned) {
            tracing::warn!(
                sprint_id,
                returned,
                omitted,
                "Sprint holds more work items than one page; the rest are not included"
            );
        }

        let items: Vec<WorkItem> = page.issues.into_iter().map(WorkItem::from).collect();
        tracing::debug!(sprint_id, count = items.len(), "Fetched Jira work items");
        Ok(items)
    }
}
