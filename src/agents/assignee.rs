use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::report::SprintReport;
use crate::types::WorkItem;

static WORKING_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:what|which|show|list)\W+(?:is|tickets|tasks)?\W+([A-Za-z .'-]+)\W+working on")
        .expect("assignee pattern")
});

/// Statuses that count as someone's current focus.
const FOCUS_STATUSES: [&str; 2] = ["in progress", "code review"];

/// Pull the person's name out of "what is <Name> working on" style questions.
pub fn extract_assignee(message: &str) -> Option<String> {
    WORKING_ON
        .captures(message)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// One person's items in the sprint, split by whether they are actively being worked.
#[derive(Debug, Default)]
pub struct AssigneeFocus<'a> {
    pub person: String,
    pub main: Vec<&'a WorkItem>,
    pub other: Vec<&'a WorkItem>,
}

impl<'a> AssigneeFocus<'a> {
    /// Assignee names match by case-insensitive substring, so "michael" finds "Michael Scott".
    pub fn collect(report: &'a SprintReport, person: &str) -> Self {
        let needle = person.to_lowercase();
        let mut focus = Self {
            person: person.to_string(),
            ..Self::default()
        };

        for group in &report.summary {
            let is_focus = FOCUS_STATUSES.contains(&group.status.to_lowercase().as_str());
            for item in &group.items {
                let assigned = item
                    .assignee
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle));
                if !assigned {
                    continue;
                }
                if is_focus {
                    focus.main.push(item);
                } else {
                    focus.other.push(item);
                }
            }
        }

        focus
    }

    /// Text handed to the model in place of the full report.
    pub fn summary_prompt(&self) -> String {
        let person = &self.person;
        let mut text = format!(
            "You are a product manager assistant. The user asked what {person} is working on. Here are their tickets in the current sprint.\n\n"
        );

        if self.main.is_empty() {
            let _ = writeln!(text, "{person} has no tickets currently In Progress or in Code Review.");
        } else {
            text.push_str("Main focus (In Progress or Code Review):\n");
            for item in &self.main {
                let _ = writeln!(text, "• [{}] {}: {}", item.status, item.key, item.title);
            }
        }

        if !self.other.is_empty() {
            text.push_str("\nOther assigned tickets (not In Progress or Code Review):\n");
            for item in &self.other {
                let _ = writeln!(text, "• [{}] {}: {}", item.status, item.key, item.title);
            }
        }

        text.push_str("\nPlease summarise this for the user.");
        text
    }
}
