use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::issue::{Issue, Severity};
use super::request::AnalysisType;
use super::suggestion::Suggestion;

/// A metric reported alongside analysis findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Boolean flag
    Flag(bool),

    /// Whole number
    Integer(i64),

    /// Fractional number
    Float(f64),

    /// Free-form text
    Text(String),

    /// List of values
    List(Vec<MetricValue>),
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Kind of analysis that produced this result
    pub analysis_type: AnalysisType,

    /// One-paragraph summary of the findings
    pub summary: String,

    /// Problems found
    pub issues: Vec<Issue>,

    /// Improvements proposed
    pub suggestions: Vec<Suggestion>,

    /// Metrics reported by the analyzer
    pub metrics: BTreeMap<String, MetricValue>,

    /// Highest severity among the issues (Info when there are none)
    pub overall_severity: Severity,

    /// Analyzer confidence in the findings, clamped to 0.0 to 1.0
    pub confidence: f64,

    /// When the analysis completed
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Assemble a result, deriving the overall severity from the issues
    /// and clamping confidence into range.
    pub fn new(
        analysis_type: AnalysisType,
        summary: impl Into<String>,
        issues: Vec<Issue>,
        suggestions: Vec<Suggestion>,
        metrics: BTreeMap<String, MetricValue>,
        confidence: f64,
    ) -> Self {
        let overall_severity = Self::severity_of(&issues);
        Self {
            analysis_type,
            summary: summary.into(),
            issues,
            suggestions,
            metrics,
            overall_severity,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        }
    }

    /// Highest severity among a set of issues, Info when empty
    pub fn severity_of(issues: &[Issue]) -> Severity {
        issues
            .iter()
            .map(|issue| issue.severity)
            .max()
            .unwrap_or(Severity::Info)
    }

    /// Number of issues at or above the given severity
    pub fn issues_at_or_above(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity >= severity)
            .count()
    }

    /// Whether any issue reaches the given severity
    pub fn has_issues_at_or_above(&self, severity: Severity) -> bool {
        self.issues_at_or_above(severity) > 0
    }
}
