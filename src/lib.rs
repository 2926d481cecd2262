pub mod config;
pub mod types;
pub mod report;
pub mod clients;
pub mod agents;
pub mod formatter;
pub mod server;

pub use config::Config;
pub use types::{Intent, ProcessedQuery, Sprint, SprintState, WorkItem};
pub use report::{SprintReport, StatusGroup};
pub use clients::{LanguageModel, Notifier, Tracker};
pub use agents::ProductManagerAgent;
pub use formatter::ResponseFormatter;
pub use server::{AppState, build_router};
