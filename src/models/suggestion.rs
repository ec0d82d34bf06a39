use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// What kind of improvement a suggestion proposes
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
pub enum SuggestionKind {
    /// Restructure code without changing behavior
    Refactoring,

    /// Make code faster or leaner
    Optimization,

    /// Close a security gap
    SecurityHardening,

    /// Rework structure or boundaries
    Architecture,

    /// Add or improve tests
    Testing,

    /// Add or improve documentation
    Documentation,

    /// Remove dead weight or tidy up
    CodeCleanup,
}

/// How urgent a suggestion is
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
pub enum SuggestionPriority {
    /// Nice to have
    Low,

    /// Worth scheduling
    Medium,

    /// Should happen soon
    High,

    /// Should happen now
    Critical,
}

impl SuggestionPriority {
    /// Numeric weight for scoring and sorting
    pub fn weight(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

/// A proposed improvement to the analyzed code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Unique id for this suggestion
    pub id: String,

    /// Short human-readable title
    pub title: String,

    /// Longer explanation of the proposal
    pub description: String,

    /// Kind of improvement
    pub kind: SuggestionKind,

    /// Urgency
    pub priority: SuggestionPriority,

    /// Concrete steps or replacement code
    pub implementation: Option<String>,

    /// Why the change is worth making
    pub reasoning: Option<String>,

    /// Example of the improved code
    pub example: Option<String>,

    /// Expected benefits
    pub benefits: Vec<String>,

    /// Estimated impact on a 0.0 to 1.0 scale
    pub estimated_impact: Option<f64>,
}

impl Suggestion {
    /// Create a suggestion with a fresh id
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: SuggestionKind,
        priority: SuggestionPriority,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            kind,
            priority,
            implementation: None,
            reasoning: None,
            example: None,
            benefits: Vec::new(),
            estimated_impact: None,
        }
    }

    /// Attach concrete implementation guidance
    pub fn with_implementation(mut self, implementation: impl Into<String>) -> Self {
        self.implementation = Some(implementation.into());
        self
    }

    /// Attach the reasoning behind the proposal
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Attach an example of the improved code
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Attach the expected benefits
    pub fn with_benefits(mut self, benefits: Vec<String>) -> Self {
        self.benefits = benefits;
        self
    }

    /// Attach an impact estimate, clamped to the 0.0 to 1.0 range
    pub fn with_estimated_impact(mut self, impact: f64) -> Self {
        self.estimated_impact = Some(impact.clamp(0.0, 1.0));
        self
    }
}
