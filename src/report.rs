use serde::{Deserialize, Serialize};

use crate::types::{Sprint, WorkItem};

const READY_MARKERS: [&str; 3] = ["ready", "done", "complete"];
const BLOCKED_MARKERS: [&str; 2] = ["blocked", "impediment"];
const IN_PROGRESS_MARKERS: [&str; 2] = ["progress", "development"];

/// Work items sharing one status value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusGroup {
    pub status: String,
    pub count: usize,
    pub items: Vec<WorkItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintReport {
    pub sprint: Sprint,
    pub total_items: usize,
    /// One group per distinct status, in first-seen order.
    pub summary: Vec<StatusGroup>,
    pub ready_for_production: usize,
    pub blocked: usize,
    pub in_progress: usize,
}

impl SprintReport {
    /// Group items by status and compute the derived counters.
    ///
    /// The three counters are evaluated independently, so a status such as
    /// "Done (blocked upstream)" counts as both ready and blocked.
    pub fn build(sprint: Sprint, items: Vec<WorkItem>) -> Self {
        let total_items = items.len();
        let ready_for_production = count_matching(&items, &READY_MARKERS);
        let blocked = count_matching(&items, &BLOCKED_MARKERS);
        let in_progress = count_matching(&items, &IN_PROGRESS_MARKERS);

        let mut summary: Vec<StatusGroup> = Vec::new();
        for item in items {
            match summary.iter_mut().find(|g| g.status == item.status) {
                Some(group) => {
                    group.count += 1;
                    group.items.push(item);
                }
                None => summary.push(StatusGroup {
                    status: item.status.clone(),
                    count: 1,
                    items: vec![item],
                }),
            }
        }

        Self {
            sprint,
            total_items,
            summary,
            ready_for_production,
            blocked,
            in_progress,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.summary.iter().flat_map(|group| group.items.iter())
    }
}

fn count_matching(items: &[WorkItem], markers: &[&str]) -> usize {
    items
        .iter()
        .filter(|item| {
            let status = item.status.to_lowercase();
            markers.iter().any(|m| status.contains(m))
        })
        .count()
}
