use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Kinds of analysis Sibyl can perform
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
pub enum AnalysisType {
    /// General code quality review
    CodeQuality,

    /// Structural and design review
    Architecture,

    /// Performance and efficiency review
    Performance,

    /// Vulnerability and unsafe-pattern review
    Security,
}

/// How thorough an analysis should be
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
pub enum AnalysisDepth {
    /// Quick surface pass
    Basic,

    /// Balanced review (default)
    Standard,

    /// Thorough review with wider context
    Comprehensive,

    /// Exhaustive review at maximum effort
    Expert,
}

impl Default for AnalysisDepth {
    fn default() -> Self {
        Self::Standard
    }
}

/// A single analysis job: a set of source files plus the knobs
/// describing how they should be examined.
///
/// Files and options are kept in ordered maps so that the cache key
/// derived from a request is stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Unique id for this request
    pub id: String,

    /// Kind of analysis to perform
    pub analysis_type: AnalysisType,

    /// Source files keyed by path
    pub files: BTreeMap<PathBuf, String>,

    /// Project flavor hint (e.g. "library", "web-service", "generic")
    pub project_kind: String,

    /// Requested thoroughness
    pub depth: AnalysisDepth,

    /// Specific rules or focus areas to emphasize
    pub rules: Vec<String>,

    /// Free-form per-request options
    pub options: BTreeMap<String, String>,
}

impl AnalysisRequest {
    /// Create a request with a fresh id and default settings
    pub fn new(analysis_type: AnalysisType, files: BTreeMap<PathBuf, String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            analysis_type,
            files,
            project_kind: "generic".to_string(),
            depth: AnalysisDepth::default(),
            rules: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    /// Replace the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the analysis depth
    pub fn with_depth(mut self, depth: AnalysisDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Set the project kind hint
    pub fn with_project_kind(mut self, kind: impl Into<String>) -> Self {
        self.project_kind = kind.into();
        self
    }

    /// Set the rules to emphasize
    pub fn with_rules(mut self, rules: Vec<String>) -> Self {
        self.rules = rules;
        self
    }

    /// Add a single free-form option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Combined byte length of all file contents
    pub fn total_code_len(&self) -> usize {
        self.files.values().map(|content| content.len()).sum()
    }

    /// Combined line count of all file contents
    pub fn total_line_count(&self) -> usize {
        self.files.values().map(|content| content.lines().count()).sum()
    }

    /// Deterministic cache key for this request when handled by the
    /// named analyzer.
    ///
    /// The key covers everything that influences the outcome: analysis
    /// type, analyzer, project kind, depth, rules, options and the full
    /// file contents. The request id is deliberately excluded so that
    /// re-submissions of identical content hit the cache.
    pub fn cache_key(&self, analyzer_name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.analysis_type.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(analyzer_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.project_kind.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.depth.to_string().as_bytes());
        hasher.update([0u8]);
        for rule in &self.rules {
            hasher.update(rule.as_bytes());
            hasher.update([0u8]);
        }
        for (key, value) in &self.options {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
            hasher.update(value.as_bytes());
            hasher.update([0u8]);
        }
        for (path, content) in &self.files {
            hasher.update(path.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            hasher.update(content.as_bytes());
            hasher.update([0u8]);
        }

        let mut key = format!("{}:{}:", self.analysis_type, analyzer_name);
        for byte in hasher.finalize() {
            // Infallible for String targets
            let _ = write!(key, "{:02x}", byte);
        }
        key
    }
}
