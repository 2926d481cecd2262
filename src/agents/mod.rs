// Query handling built on top of the service clients
pub mod assignee;
pub mod product_manager;

pub use assignee::{AssigneeFocus, extract_assignee};
pub use product_manager::{ChatEvent, IntegrationCheck, ProductManagerAgent, is_sprint_query};
