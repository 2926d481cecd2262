use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};

use crate::report::SprintReport;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]?").expect("heading pattern"));
static NESTED_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\t[ \t]*| [ \t]+)-[ \t]?").expect("nested bullet pattern"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]?[-•][ \t]?").expect("bullet pattern"));
static EXTRA_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern"));

/// Section headings the model tends to emit, each rewritten to its canonical emoji form.
static SECTION_HEADINGS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    [
        ("Active Work on Bunker-Related Tickets", "🚧"),
        ("Completed Bunker-Related Work", "✅"),
        ("Completed Bunkers-Related Tickets", "✅"),
        ("Actionable Insights", "💡"),
    ]
    .into_iter()
    .map(|(phrase, emoji)| {
        // An existing emoji prefix is consumed so the heading is never prefixed twice.
        let pattern = format!(r"(?i)(?:{emoji} )?{}:?", regex::escape(phrase));
        let regex = Regex::new(&pattern).expect("section heading pattern");
        (regex, format!("{emoji} {phrase}:"))
    })
    .collect()
});

/// Indentation width in columns, a tab counting as two.
fn indent_width(indent: &str) -> usize {
    indent.chars().map(|c| if c == '\t' { 2 } else { 1 }).sum()
}

pub struct ResponseFormatter;

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Flatten model markdown into Slack-friendly plain text.
    ///
    /// Lossy: headings, emphasis and underscores are dropped, list markers become
    /// indented bullets. Applying it to its own output changes nothing.
    pub fn format_for_slack(&self, message: &str) -> String {
        let mut text = message.replace('*', "").replace('_', "");
        text = HEADING.replace_all(&text, "").into_owned();

        for (regex, heading) in SECTION_HEADINGS.iter() {
            text = regex.replace_all(&text, NoExpand(heading.as_str())).into_owned();
        }

        text = NESTED_BULLET
            .replace_all(&text, |caps: &Captures| {
                format!("{}• ", "    ".repeat(indent_width(&caps[1]) / 2))
            })
            .into_owned();
        text = BULLET.replace_all(&text, "  • ").into_owned();
        text = EXTRA_NEWLINES.replace_all(&text, "\n\n").into_owned();

        text.trim().to_string()
    }

    /// Render a report as a chat message without going through the model.
    pub fn format_sprint_report(&self, report: &SprintReport, query: &str) -> String {
        let mut message = String::from("📊 *Sprint Report*\n\n");
        let _ = writeln!(message, "*Sprint:* {}", report.sprint.name);
        let _ = writeln!(message, "*Total Work Items:* {}\n", report.total_items);

        message.push_str("*Status Breakdown:*\n");
        for group in &report.summary {
            let _ = writeln!(message, "• {}: {} items", group.status, group.count);
        }

        message.push_str("\n*Key Metrics:*\n");
        let _ = writeln!(message, "• Ready for Production: {}", report.ready_for_production);
        let _ = writeln!(message, "• In Progress: {}", report.in_progress);
        let _ = writeln!(message, "• Blocked: {}", report.blocked);

        if let Some(goal) = &report.sprint.goal {
            let _ = writeln!(message, "\n*Sprint Goal:* {goal}");
        }

        let _ = write!(message, "\n*Original Query:* \"{query}\"");
        message
    }

    pub fn format_error(&self, error: &str, query: &str) -> String {
        format!(
            "❌ *Error Processing Request*\n\n*Query:* \"{query}\"\n*Error:* {error}\n\nPlease try again or contact the development team if the issue persists."
        )
    }

    pub fn format_processing(&self) -> String {
        "🤔 Processing your request... Please wait a moment.".to_string()
    }
}
