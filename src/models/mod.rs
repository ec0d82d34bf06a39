//! Core data models for Sibyl

pub mod issue;
pub mod request;
pub mod result;
pub mod suggestion;

pub use issue::{Issue, IssueCategory, Severity};
pub use request::{AnalysisDepth, AnalysisRequest, AnalysisType};
pub use result::{AnalysisResult, MetricValue};
pub use suggestion::{Suggestion, SuggestionKind, SuggestionPriority};
