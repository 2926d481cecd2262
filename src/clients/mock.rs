use async_trait::async_trait;

use super::{Tracker, TrackerError};
use crate::types::{Sprint, SprintState, WorkItem};

/// Fixed sample sprint used when Jira credentials are absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTracker;

impl MockTracker {
    pub fn new() -> Self {
        Self
    }

    pub fn sample_sprint() -> Sprint {
        Sprint {
            id: 123,
            name: "Sprint 15 - Product Launch".into(),
            state: SprintState::Active,
            start_date: "2024-01-15T00:00:00.000Z".into(),
            end_date: "2024-01-29T00:00:00.000Z".into(),
            goal: Some("Launch the new user dashboard and improve performance".into()),
        }
    }

    pub fn sample_items() -> Vec<WorkItem> {
        let rows = [
            ("1001", "PROJ-101", "Implement user authentication flow", "Ready for Production", "John Doe", "High", "Story", "2024-01-10T10:00:00.000Z", "2024-01-20T15:30:00.000Z"),
            ("1002", "PROJ-102", "Design new dashboard layout", "In Progress", "Jane Smith", "Medium", "Task", "2024-01-12T09:00:00.000Z", "2024-01-21T11:45:00.000Z"),
            ("1003", "PROJ-103", "Fix performance issues in search", "Blocked", "Mike Johnson", "High", "Bug", "2024-01-14T14:20:00.000Z", "2024-01-22T16:15:00.000Z"),
            ("1004", "PROJ-104", "Add unit tests for API endpoints", "Ready for Production", "Sarah Wilson", "Medium", "Task", "2024-01-16T08:30:00.000Z", "2024-01-23T10:20:00.000Z"),
            ("1005", "PROJ-105", "Update documentation", "In Progress", "Tom Brown", "Low", "Task", "2024-01-18T13:45:00.000Z", "2024-01-24T09:30:00.000Z"),
            ("1006", "PROJ-106", "Implement dark mode toggle", "Code Review", "Lisa Chen", "Medium", "Story", "2024-01-20T11:15:00.000Z", "2024-01-25T14:45:00.000Z"),
        ];

        rows.into_iter()
            .map(
                |(id, key, title, status, assignee, priority, issue_type, created, updated)| WorkItem {
                    id: id.into(),
                    key: key.into(),
                    title: title.into(),
                    status: status.into(),
                    assignee: Some(assignee.into()),
                    priority: priority.into(),
                    issue_type: issue_type.into(),
                    created: created.into(),
                    updated: updated.into(),
                    due_date: None,
                },
            )
            .collect()
    }
}

#[async_trait]
impl Tracker for MockTracker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_active_sprint(&self) -> Result<Sprint, TrackerError> {
        Ok(Self::sample_sprint())
    }

    async fn get_work_items_in_sprint(&self, _sprint_id: u64) -> Result<Vec<WorkItem>, TrackerError> {
        Ok(Self::sample_items())
    }
}
