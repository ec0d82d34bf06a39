//! Analyzers supported by Sibyl

use async_trait::async_trait;

use crate::errors::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};

mod ai;
mod fallback;
mod registry;

pub use ai::AiAnalyzer;
pub use fallback::StaticAnalyzer;
pub use registry::AnalyzerRegistry;

/// Trait for analysis strategies
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Get the analyzer name
    fn name(&self) -> &str;

    /// Get the selection priority; higher wins when several analyzers
    /// support the same request
    fn priority(&self) -> u32;

    /// Check whether this analyzer can handle the given request
    fn supports(&self, request: &AnalysisRequest) -> bool;

    /// Run the analysis using the given model.
    ///
    /// Implementations MUST follow these guidelines:
    /// 1. Treat the request as read-only; never mutate caller state
    /// 2. Absorb reply-decoding trouble into a degraded result rather
    ///    than an error; reserve errors for transport-level failures
    /// 3. Return a result whose analysis type matches the request
    async fn analyze(
        &self,
        request: &AnalysisRequest,
        model: &str,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Common fields for analyzer implementations
pub struct AnalyzerBase {
    /// Analyzer name
    pub name: String,

    /// Analysis type this analyzer handles
    pub analysis_type: AnalysisType,

    /// Selection priority
    pub priority: u32,
}
