//! AI-powered analyzer variants

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::{Analyzer, AnalyzerBase};
use crate::backend::{ChatBackend, CompletionOptions};
use crate::config::DepthProfiles;
use crate::errors::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisType};
use crate::parser::ResponseParser;
use crate::prompt::PromptEngine;

/// Default selection priority for AI analyzers
const AI_PRIORITY: u32 = 100;

/// Analyzer that asks a chat model to review the code.
///
/// One variant exists per analysis type; they differ only in name,
/// prompt template and the type they claim, so they share this one
/// implementation.
pub struct AiAnalyzer {
    base: AnalyzerBase,
    template: String,
    backend: Arc<dyn ChatBackend>,
    engine: PromptEngine,
    parser: ResponseParser,
    profiles: DepthProfiles,
    timeout: Duration,
}

impl AiAnalyzer {
    /// Code quality variant
    pub fn code_quality(
        backend: Arc<dyn ChatBackend>,
        engine: PromptEngine,
        profiles: DepthProfiles,
        timeout: Duration,
    ) -> Self {
        Self::for_type(AnalysisType::CodeQuality, backend, engine, profiles, timeout)
    }

    /// Architecture variant
    pub fn architecture(
        backend: Arc<dyn ChatBackend>,
        engine: PromptEngine,
        profiles: DepthProfiles,
        timeout: Duration,
    ) -> Self {
        Self::for_type(AnalysisType::Architecture, backend, engine, profiles, timeout)
    }

    /// Performance variant
    pub fn performance(
        backend: Arc<dyn ChatBackend>,
        engine: PromptEngine,
        profiles: DepthProfiles,
        timeout: Duration,
    ) -> Self {
        Self::for_type(AnalysisType::Performance, backend, engine, profiles, timeout)
    }

    /// Security variant
    pub fn security(
        backend: Arc<dyn ChatBackend>,
        engine: PromptEngine,
        profiles: DepthProfiles,
        timeout: Duration,
    ) -> Self {
        Self::for_type(AnalysisType::Security, backend, engine, profiles, timeout)
    }

    /// Build the variant for an analysis type
    pub fn for_type(
        analysis_type: AnalysisType,
        backend: Arc<dyn ChatBackend>,
        engine: PromptEngine,
        profiles: DepthProfiles,
        timeout: Duration,
    ) -> Self {
        Self {
            base: AnalyzerBase {
                name: format!("ai_{analysis_type}"),
                analysis_type,
                priority: AI_PRIORITY,
            },
            template: analysis_type.to_string(),
            backend,
            engine,
            parser: ResponseParser::new(),
            profiles,
            timeout,
        }
    }

    /// Override the selection priority
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.base.priority = priority;
        self
    }

    /// The analysis type this variant handles
    pub fn analysis_type(&self) -> AnalysisType {
        self.base.analysis_type
    }
}

#[async_trait]
impl Analyzer for AiAnalyzer {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn priority(&self) -> u32 {
        self.base.priority
    }

    fn supports(&self, request: &AnalysisRequest) -> bool {
        request.analysis_type == self.base.analysis_type && self.backend.is_configured()
    }

    async fn analyze(
        &self,
        request: &AnalysisRequest,
        model: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = self.engine.generate_prompt(&self.template, request);
        let messages = self.engine.message_bag(&prompt, request);

        let settings = self.profiles.for_depth(request.depth);
        let options = CompletionOptions {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: self.timeout,
        };

        debug!(
            "{} asking {} ({} bytes of prompt)",
            self.base.name,
            model,
            prompt.len()
        );
        let reply = self.backend.complete(model, &messages, &options).await?;

        Ok(self.parser.parse(self.base.analysis_type, &reply))
    }
}
