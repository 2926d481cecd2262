use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    // LLM Configuration
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openai_temperature: f32,

    // Slack Configuration
    pub slack_webhook_url: Option<String>,
    pub slack_bot_token: Option<String>,

    // Jira Configuration
    pub jira_base_url: Option<String>,
    pub jira_api_token: Option<String>,
    pub jira_email: Option<String>,
    pub jira_project_key: Option<String>,
    pub jira_board_id: Option<String>,

    // Server Configuration
    pub port: u16,
    pub environment: String,
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            // LLM Configuration
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            openai_temperature: var("OPENAI_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.1),

            // Slack Configuration
            slack_webhook_url: var("SLACK_WEBHOOK_URL"),
            slack_bot_token: var("SLACK_BOT_TOKEN"),

            // Jira Configuration
            jira_base_url: var("JIRA_BASE_URL"),
            jira_api_token: var("JIRA_API_TOKEN"),
            jira_email: var("JIRA_EMAIL"),
            jira_project_key: var("JIRA_PROJECT_KEY"),
            jira_board_id: var("JIRA_BOARD_ID"),

            // Server Configuration
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            environment: var("APP_ENV")
                .or_else(|| var("NODE_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            static_dir: var("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
        }
    }

    /// Names of required settings that are not set.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let required = [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("SLACK_WEBHOOK_URL", &self.slack_webhook_url),
            ("JIRA_BASE_URL", &self.jira_base_url),
            ("JIRA_API_TOKEN", &self.jira_api_token),
            ("JIRA_EMAIL", &self.jira_email),
            ("JIRA_PROJECT_KEY", &self.jira_project_key),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// Warn about missing settings. Never fails: every client has a degraded mode.
    pub fn log_missing(&self) {
        let missing = self.missing_required();
        if missing.is_empty() {
            tracing::info!("Configuration complete");
        } else {
            tracing::warn!(?missing, "Missing required environment variables");
            tracing::warn!("Please check your .env file or environment variables");
        }
        tracing::info!(
            jira = if self.tracker_is_live() { "live" } else { "mock" },
            slack = if self.chat_is_live() { "live" } else { "mock" },
            "Client modes"
        );
        if self.slack_bot_token.is_none() {
            tracing::debug!("SLACK_BOT_TOKEN not set");
        }
    }

    /// Jira is queried live only when both the base URL and API token are present.
    pub fn tracker_is_live(&self) -> bool {
        self.jira_base_url.is_some() && self.jira_api_token.is_some()
    }

    pub fn chat_is_live(&self) -> bool {
        self.slack_webhook_url.is_some()
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}
