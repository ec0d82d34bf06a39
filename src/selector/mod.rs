//! Model selection: which model answers a request, what the fallback
//! order is, and what a call is expected to cost.

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::DepthProfiles;
use crate::models::{AnalysisDepth, AnalysisRequest, AnalysisType};

/// Capability tiers models are grouped into
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
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Most capable, most expensive
    Premium,

    /// Solid default
    Standard,

    /// Cheapest option, last resort
    Economy,
}

/// One model in the fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model identifier as the backend knows it
    pub id: String,

    /// Capability tier
    pub tier: ModelTier,

    /// Price per thousand tokens
    pub cost_per_1k_tokens: f64,
}

impl ModelSpec {
    /// Convenience constructor
    pub fn new(id: impl Into<String>, tier: ModelTier, cost_per_1k_tokens: f64) -> Self {
        Self {
            id: id.into(),
            tier,
            cost_per_1k_tokens,
        }
    }
}

/// The model chain plus the thresholds that push a request upmarket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPolicy {
    /// Models ordered best first; fallback walks toward the end
    pub chain: Vec<ModelSpec>,

    /// More rules than this forces the premium tier
    pub rule_threshold: usize,

    /// More code bytes than this forces the premium tier
    pub code_len_threshold: usize,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            chain: vec![
                ModelSpec::new("gpt-4o", ModelTier::Premium, 0.01),
                ModelSpec::new("gpt-4o-mini", ModelTier::Standard, 0.0006),
                ModelSpec::new("gpt-3.5-turbo", ModelTier::Economy, 0.0005),
            ],
            rule_threshold: 5,
            code_len_threshold: 20_000,
        }
    }
}

/// Picks models for requests and prices the calls.
///
/// Selection is tier based: security and architecture reviews always
/// get the premium tier, while quality and performance reviews only
/// escalate when the request is demanding (expert depth, many rules,
/// or a large body of code).
#[derive(Debug, Clone)]
pub struct ModelSelector {
    policy: ModelPolicy,
    profiles: DepthProfiles,
}

impl ModelSelector {
    /// Create a selector over the given policy and depth tuning.
    ///
    /// The chain is expected to be non-empty; configuration loading
    /// enforces that before a selector is built.
    pub fn new(policy: ModelPolicy, profiles: DepthProfiles) -> Self {
        debug_assert!(!policy.chain.is_empty(), "model chain validated at load");
        Self { policy, profiles }
    }

    /// Tier a request deserves under the current policy
    pub fn required_tier(&self, request: &AnalysisRequest) -> ModelTier {
        match request.analysis_type {
            AnalysisType::Security | AnalysisType::Architecture => ModelTier::Premium,
            AnalysisType::CodeQuality | AnalysisType::Performance => {
                let demanding = request.depth == AnalysisDepth::Expert
                    || request.rules.len() > self.policy.rule_threshold
                    || request.total_code_len() > self.policy.code_len_threshold;
                if demanding {
                    ModelTier::Premium
                } else {
                    ModelTier::Standard
                }
            }
        }
    }

    /// Pick the model that should answer the request.
    ///
    /// The first chain entry matching the required tier wins; when no
    /// entry carries that tier the head of the chain is used instead.
    pub fn select_model(&self, request: &AnalysisRequest) -> String {
        let tier = self.required_tier(request);
        let spec = self
            .policy
            .chain
            .iter()
            .find(|model| model.tier == tier)
            .or_else(|| self.policy.chain.first());

        match spec {
            Some(model) => {
                debug!(
                    "Request {} needs {} tier, selected model {}",
                    request.id, tier, model.id
                );
                model.id.clone()
            }
            None => String::new(),
        }
    }

    /// Next model in the chain after the given one, if any
    pub fn fallback_model(&self, model: &str) -> Option<String> {
        let position = self.policy.chain.iter().position(|spec| spec.id == model)?;
        self.policy
            .chain
            .get(position + 1)
            .map(|spec| spec.id.clone())
    }

    /// Estimated cost of answering the request with the given model.
    ///
    /// Tokens are approximated as one per four bytes of code, plus the
    /// prompt overhead configured for the request's depth. Unknown
    /// models price at zero.
    pub fn estimate_cost(&self, request: &AnalysisRequest, model: &str) -> f64 {
        let overhead = self.profiles.for_depth(request.depth).prompt_overhead_tokens;
        let tokens = request.total_code_len() as f64 / 4.0 + f64::from(overhead);
        let unit_cost = self
            .policy
            .chain
            .iter()
            .find(|spec| spec.id == model)
            .map(|spec| spec.cost_per_1k_tokens)
            .unwrap_or(0.0);

        tokens / 1000.0 * unit_cost
    }

    /// The configured chain, best model first
    pub fn chain(&self) -> &[ModelSpec] {
        &self.policy.chain
    }
}
