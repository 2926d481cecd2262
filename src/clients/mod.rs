// Clients for the external services the bridge talks to
pub mod jira;
pub mod mock;
pub mod openai;
pub mod slack;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::formatter::ResponseFormatter;
use crate::report::SprintReport;
use crate::types::{ProcessedQuery, Sprint, WorkItem};

pub use jira::{JiraClient, TrackerError};
pub use mock::MockTracker;
pub use openai::{LlmError, OpenAIClient};
pub use slack::{ConsoleNotifier, SlackWebhook};

/// Read access to the project tracker.
#[async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &str;
    async fn get_active_sprint(&self) -> Result<Sprint, TrackerError>;
    async fn get_work_items_in_sprint(&self, sprint_id: u64) -> Result<Vec<WorkItem>, TrackerError>;

    /// Fetch the active sprint, then its items. Either failure is returned as-is.
    async fn generate_sprint_report(&self) -> Result<SprintReport, TrackerError> {
        let sprint = self.get_active_sprint().await?;
        let items = self.get_work_items_in_sprint(sprint.id).await?;
        Ok(SprintReport::build(sprint, items))
    }
}

/// Language model used for intent analysis and prose generation.
///
/// Neither call can fail: implementations degrade to `ProcessedQuery::fallback()`
/// and a fixed apology respectively, so callers never branch on model availability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn analyze_query(&self, text: &str) -> ProcessedQuery;
    /// `report` is `None` when `query` already carries all the context.
    async fn generate_response(&self, report: Option<&SprintReport>, query: &str) -> String;
}

/// Outbound chat delivery. Returns whether the message was accepted; never errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn send_message(&self, text: &str, channel: Option<&str>, thread_ts: Option<&str>) -> bool;

    async fn send_error(
        &self,
        error: &str,
        query: &str,
        channel: Option<&str>,
        thread_ts: Option<&str>,
    ) -> bool {
        let text = ResponseFormatter::new().format_error(error, query);
        self.send_message(&text, channel, thread_ts).await
    }

    async fn send_processing(&self, channel: Option<&str>, thread_ts: Option<&str>) -> bool {
        let text = ResponseFormatter::new().format_processing();
        self.send_message(&text, channel, thread_ts).await
    }

    async fn send_sprint_report(&self, report: &SprintReport, query: &str) -> bool {
        let text = ResponseFormatter::new().format_sprint_report(report, query);
        self.send_message(&text, None, None).await
    }
}

pub fn create_tracker(config: &Config) -> Arc<dyn Tracker> {
    if config.tracker_is_live() {
        Arc::new(JiraClient::new(config))
    } else {
        tracing::warn!("Running in mock mode - using simulated Jira data");
        Arc::new(MockTracker::new())
    }
}

pub fn create_notifier(config: &Config) -> Arc<dyn Notifier> {
    match &config.slack_webhook_url {
        Some(url) => Arc::new(SlackWebhook::new(url.clone())),
        None => {
            tracing::warn!("Running in mock mode - Slack messages will be logged");
            Arc::new(ConsoleNotifier)
        }
    }
}

pub fn create_language_model(config: &Config) -> Arc<dyn LanguageModel> {
    Arc::new(OpenAIClient::new(config))
}
