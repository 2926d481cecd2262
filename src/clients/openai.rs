use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::LanguageModel;
use crate::config::Config;
use crate::report::SprintReport;
use crate::types::{Intent, ProcessedQuery};

pub const APOLOGY: &str = "Sorry, I encountered an error while processing your request.";
pub const EMPTY_COMPLETION: &str = "Unable to generate response";

const ANALYSIS_FUNCTION: &str = "analyze_sprint_query";

const ANALYSIS_PROMPT: &str = "You are a Product Manager assistant that helps analyse queries about Jira sprints and work items.
Analyse the user's question and extract the intent and relevant parameters.
Common intents include:
- sprint_status: General questions about sprint state
- work_item_count: Questions about number of work items
- ready_for_production: Questions about items ready for production
- blocked_items: Questions about blocked or stuck items
- sprint_progress: Questions about overall sprint progress";

const RESPONSE_PROMPT: &str = "You are a helpful Product Manager assistant. Generate clear, concise responses about sprint status and work items. Be professional but friendly. Use bullet points when appropriate. Always provide actionable insights. Always use British English spellings in your responses.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("OpenAI request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no function call returned from OpenAI")]
    NoStructuredResult,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Chat-completions client. Failures never reach the caller; see `LanguageModel`.
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    arguments: String,
}

#[derive(Deserialize)]
struct AnalysisArguments {
    #[serde(default)]
    intent: Intent,
    #[serde(default)]
    parameters: Option<Map<String, Value>>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl OpenAIClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
        }
    }

    fn analysis_tool() -> Value {
        let intents: Vec<&str> = Intent::ALL.iter().map(Intent::as_str).collect();
        json!({
            "type": "function",
            "function": {
                "name": ANALYSIS_FUNCTION,
                "description": "Analyse a user query about Jira sprint and work items",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "intent": {
                            "type": "string",
                            "enum": intents,
                            "description": "The intent of the user query"
                        },
                        "parameters": {
                            "type": "object",
                            "properties": {
                                "status_filter": {
                                    "type": "string",
                                    "description": "Specific status to filter by (e.g., \"Ready for Production\", \"Blocked\")"
                                },
                                "count_only": {
                                    "type": "boolean",
                                    "description": "Whether the user only wants a count"
                                },
                                "include_details": {
                                    "type": "boolean",
                                    "description": "Whether to include detailed information about work items"
                                }
                            }
                        },
                        "confidence": {
                            "type": "number",
                            "minimum": 0,
                            "maximum": 1,
                            "description": "Confidence score for the analysis"
                        }
                    },
                    "required": ["intent", "parameters", "confidence"]
                }
            }
        })
    }

    async fn complete(&self, body: Value) -> Result<AssistantMessage, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let response: CompletionResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(LlmError::NoStructuredResult)
    }

    async fn try_analyze(&self, text: &str) -> Result<ProcessedQuery, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": ANALYSIS_PROMPT },
                { "role": "user", "content": text }
            ],
            "tools": [Self::analysis_tool()],
            "tool_choice": { "type": "function", "function": { "name": ANALYSIS_FUNCTION } },
            "temperature": self.temperature,
        });

        let message = self.complete(body).await?;
        let call = message
            .tool_calls
            .into_iter()
            .flatten()
            .next()
            .map(|c| c.function)
            .or(message.function_call)
            .ok_or(LlmError::NoStructuredResult)?;

        let args: AnalysisArguments = serde_json::from_str(&call.arguments)?;
        Ok(ProcessedQuery::new(
            args.intent,
            args.parameters.unwrap_or_default(),
            args.confidence.unwrap_or(0.0),
        ))
    }

    async fn try_generate(&self, report: Option<&SprintReport>, query: &str) -> Result<String, LlmError> {
        let sprint_data = match report {
            Some(report) => serde_json::to_string_pretty(report)?,
            None => "{}".to_string(),
        };
        let prompt = format!(
            "Original question: \"{query}\"\n\nSprint data: {sprint_data}\n\nPlease provide a helpful response based on this data."
        );
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": RESPONSE_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
        });

        let message = self.complete(body).await?;
        Ok(message
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION.to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAIClient {
    async fn analyze_query(&self, text: &str) -> ProcessedQuery {
        match self.try_analyze(text).await {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(error = %e, "Query analysis failed, using default analysis");
                ProcessedQuery::fallback()
            }
        }
    }

    async fn generate_response(&self, report: Option<&SprintReport>, query: &str) -> String {
        match self.try_generate(report, query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Response generation failed");
                APOLOGY.to_string()
            }
        }
    }
}
