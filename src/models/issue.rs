use std::collections::BTreeMap;
use std::path::PathBuf;

use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Severity levels for issues, ordered from least to most severe
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Sequence,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth knowing, no action needed
    Info,

    /// Minor problem
    Low,

    /// Problem that should be addressed
    Medium,

    /// Serious problem
    High,

    /// Must be fixed before shipping
    Critical,
}

impl Severity {
    /// Emoji marker for terminal output
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "💡",
            Severity::Low => "📝",
            Severity::Medium => "⚠️",
            Severity::High => "🔥",
            Severity::Critical => "💀",
        }
    }
}

/// What aspect of the code an issue concerns
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Sequence,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Vulnerabilities and unsafe patterns
    Security,

    /// Inefficient or wasteful code
    Performance,

    /// Logic errors and broken behavior
    Correctness,

    /// Hard-to-change or hard-to-read code
    Maintainability,

    /// Formatting and naming conventions
    CodeStyle,

    /// Structural and design concerns
    Architecture,

    /// Missing or misleading documentation
    Documentation,

    /// General guidance that fits no other bucket
    BestPractice,
}

/// A single problem found in the analyzed code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique id for this issue
    pub id: String,

    /// Short human-readable title
    pub title: String,

    /// Longer explanation of the problem
    pub description: String,

    /// How bad it is
    pub severity: Severity,

    /// What it concerns
    pub category: IssueCategory,

    /// File where the issue was found
    pub file: Option<PathBuf>,

    /// Line number
    pub line: Option<usize>,

    /// Column number
    pub column: Option<usize>,

    /// Rule or check that produced the issue
    pub rule: Option<String>,

    /// Suggested fix, if one is known
    pub fix: Option<String>,

    /// Offending code snippet
    pub snippet: Option<String>,

    /// Extra key/value details
    pub metadata: BTreeMap<String, String>,
}

impl Issue {
    /// Create an issue with a fresh id and no location info
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        category: IssueCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            severity,
            category,
            file: None,
            line: None,
            column: None,
            rule: None,
            fix: None,
            snippet: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach the file the issue was found in
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach the column number
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attach the rule id that produced the issue
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Attach a suggested fix
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// Attach the offending snippet
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}
