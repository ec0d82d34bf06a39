//! Command handlers for Sibyl's CLI commands

mod analyze;
mod models;

pub use analyze::AnalyzeCommand;
pub use models::ModelsCommand;
