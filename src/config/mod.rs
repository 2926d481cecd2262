// Process-wide configuration, read once at startup
pub mod config;

pub use config::Config;
