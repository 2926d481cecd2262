use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single Jira issue in the active sprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub key: String,
    #[serde(rename = "summary")]
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub priority: String,
    pub issue_type: String,
    pub created: String,
    pub updated: String,
    #[serde(rename = "duedate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Active,
    Closed,
    Future,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: u64,
    pub name: String,
    pub state: SprintState,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// What the user is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SprintStatus,
    WorkItemCount,
    ReadyForProduction,
    BlockedItems,
    SprintProgress,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::SprintStatus,
        Intent::WorkItemCount,
        Intent::ReadyForProduction,
        Intent::BlockedItems,
        Intent::SprintProgress,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SprintStatus => "sprint_status",
            Intent::WorkItemCount => "work_item_count",
            Intent::ReadyForProduction => "ready_for_production",
            Intent::BlockedItems => "blocked_items",
            Intent::SprintProgress => "sprint_progress",
            Intent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedQuery {
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    pub confidence: f64,
}

impl ProcessedQuery {
    /// Degraded analysis used whenever the language model cannot classify a query.
    pub fn fallback() -> Self {
        Self {
            intent: Intent::SprintStatus,
            parameters: Map::new(),
            confidence: 0.5,
        }
    }

    pub fn new(intent: Intent, parameters: Map<String, Value>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            intent,
            parameters,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_intent_labels_deserialize_as_unknown() {
        let intent: Intent = serde_json::from_str("\"velocity_forecast\"").unwrap();
        assert_eq!(intent, Intent::Unknown);
        let intent: Intent = serde_json::from_str("\"blocked_items\"").unwrap();
        assert_eq!(intent, Intent::BlockedItems);
    }

    #[test]
    fn intent_labels_match_serde_names() {
        for intent in Intent::ALL {
            let json = serde_json::to_value(intent).unwrap();
            assert_eq!(json, intent.as_str());
        }
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(ProcessedQuery::new(Intent::Unknown, Map::new(), 1.7).confidence, 1.0);
        assert_eq!(ProcessedQuery::new(Intent::Unknown, Map::new(), -0.2).confidence, 0.0);
        assert_eq!(ProcessedQuery::new(Intent::Unknown, Map::new(), f64::NAN).confidence, 0.0);
    }

    #[test]
    fn work_item_uses_jira_field_names() {
        let item = WorkItem {
            id: "1".into(),
            key: "PROJ-1".into(),
            title: "Login page".into(),
            status: "In Progress".into(),
            assignee: None,
            priority: "High".into(),
            issue_type: "Story".into(),
            created: "2024-01-10T10:00:00.000Z".into(),
            updated: "2024-01-11T10:00:00.000Z".into(),
            due_date: Some("2024-01-20".into()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["summary"], "Login page");
        assert_eq!(json["issueType"], "Story");
        assert_eq!(json["duedate"], "2024-01-20");
        assert!(json.get("assignee").is_none());
    }
}
