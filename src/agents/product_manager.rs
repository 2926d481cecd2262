use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;

use super::assignee::{AssigneeFocus, extract_assignee};
use crate::clients::{
    LanguageModel, Notifier, Tracker, create_language_model, create_notifier, create_tracker,
};
use crate::config::Config;
use crate::formatter::ResponseFormatter;
use crate::report::SprintReport;

/// Chat messages are only answered when they mention one of these.
pub const SPRINT_KEYWORDS: [&str; 9] = [
    "sprint",
    "work item",
    "work items",
    "ready for production",
    "blocked",
    "progress",
    "status",
    "how many",
    "count",
];

pub fn is_sprint_query(message: &str) -> bool {
    let lower = message.to_lowercase();
    SPRINT_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// A Slack `message` event as delivered inside an `event_callback` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

/// What the integration self-test observed.
#[derive(Debug, Clone)]
pub struct IntegrationCheck {
    pub intent: String,
    pub sprint: String,
    pub total_items: usize,
    pub chat_delivered: bool,
}

/// Answers sprint questions by chaining the tracker, the language model and chat delivery.
pub struct ProductManagerAgent {
    tracker: Arc<dyn Tracker>,
    llm: Arc<dyn LanguageModel>,
    notifier: Arc<dyn Notifier>,
    formatter: ResponseFormatter,
}

impl ProductManagerAgent {
    pub fn new(
        tracker: Arc<dyn Tracker>,
        llm: Arc<dyn LanguageModel>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tracker,
            llm,
            notifier,
            formatter: ResponseFormatter::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            create_tracker(config),
            create_language_model(config),
            create_notifier(config),
        )
    }

    /// Answer a chat query and deliver the answer to the channel it came from.
    ///
    /// Never fails: a pipeline error is reported back to chat instead.
    pub async fn process_query(&self, message: &str, channel: Option<&str>, thread_ts: Option<&str>) {
        tracing::info!(query = message, "Processing query");

        // Best-effort: the answer is still produced if this notice is lost.
        let _ = self.notifier.send_processing(channel, thread_ts).await;

        if let Err(e) = self.answer_in_chat(message, channel, thread_ts).await {
            tracing::error!(error = %e, "Error processing query");
            // Fire-and-forget: nothing more can be done if the error notice fails too.
            let _ = self
                .notifier
                .send_error(&e.to_string(), message, channel, thread_ts)
                .await;
        }
    }

    async fn answer_in_chat(&self, message: &str, channel: Option<&str>, thread_ts: Option<&str>) -> Result<()> {
        let analysis = self.llm.analyze_query(message).await;
        tracing::info!(intent = %analysis.intent, confidence = analysis.confidence, "Query analysed");

        let report = self.tracker.generate_sprint_report().await?;
        tracing::info!(
            sprint = %report.sprint.name,
            total = report.total_items,
            ready = report.ready_for_production,
            blocked = report.blocked,
            "Sprint report generated"
        );

        let prose = self.llm.generate_response(Some(&report), message).await;
        let answer = self.formatter.format_for_slack(&prose);

        if self.notifier.send_message(&answer, channel, thread_ts).await {
            tracing::info!("Query processed successfully");
        } else {
            tracing::error!("Failed to deliver response to chat");
        }
        Ok(())
    }

    /// Filter a chat event and forward it when it looks like a sprint question.
    /// Returns whether the event was forwarded.
    pub async fn handle_chat_event(&self, event: &ChatEvent) -> bool {
        let message = event.text.as_deref().unwrap_or_default();

        if event.bot_id.is_some() || message.trim().is_empty() {
            return false;
        }

        if !is_sprint_query(message) {
            tracing::info!(query = message, "Ignoring non-sprint query");
            return false;
        }

        tracing::info!(
            user = event.user.as_deref().unwrap_or("unknown"),
            query = message,
            "Detected sprint-related query"
        );
        self.process_query(message, event.channel.as_deref(), event.thread_ts.as_deref())
            .await;
        true
    }

    /// Answer a query synchronously, returning chat-formatted text instead of delivering it.
    ///
    /// "What is <name> working on" questions get a per-person summary; anything
    /// else is answered from the full sprint report.
    pub async fn answer_query(&self, message: &str) -> Result<String> {
        let analysis = self.llm.analyze_query(message).await;
        tracing::debug!(intent = %analysis.intent, "Demo query analysed");

        let report = self.tracker.generate_sprint_report().await?;

        let prose = match extract_assignee(message) {
            Some(person) => {
                let focus = AssigneeFocus::collect(&report, &person);
                tracing::info!(
                    person = %person,
                    main = focus.main.len(),
                    other = focus.other.len(),
                    "Answering assignee lookup"
                );
                self.llm.generate_response(None, &focus.summary_prompt()).await
            }
            None => self.llm.generate_response(Some(&report), message).await,
        };

        Ok(self.formatter.format_for_slack(&prose))
    }

    pub async fn generate_sprint_summary(&self) -> Result<SprintReport> {
        let report = self
            .tracker
            .generate_sprint_report()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error generating sprint summary"))?;
        Ok(report)
    }

    /// Post the rendered sprint report to chat. Returns whether delivery succeeded.
    pub async fn notify_sprint_report(&self, query: &str) -> Result<bool> {
        let report = self.generate_sprint_summary().await?;
        Ok(self.notifier.send_sprint_report(&report, query).await)
    }

    /// Exercise all three collaborators once. Only a tracker failure is fatal.
    pub async fn test_integration(&self) -> Result<IntegrationCheck> {
        tracing::info!("Testing integration");

        let analysis = self
            .llm
            .analyze_query("How many work items are ready for production?")
            .await;
        tracing::info!(intent = %analysis.intent, confidence = analysis.confidence, "Language model check done");

        let report = self
            .tracker
            .generate_sprint_report()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Integration test failed"))?;
        tracing::info!(sprint = %report.sprint.name, total = report.total_items, "Tracker check passed");

        let chat_delivered = self
            .notifier
            .send_message("🧪 Integration test successful!", None, None)
            .await;
        tracing::info!(chat_delivered, "Chat check done");

        Ok(IntegrationCheck {
            intent: analysis.intent.to_string(),
            sprint: report.sprint.name,
            total_items: report.total_items,
            chat_delivered,
        })
    }
}
