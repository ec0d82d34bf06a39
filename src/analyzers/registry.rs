//! Analyzer registration and selection

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use super::{AiAnalyzer, Analyzer, StaticAnalyzer};
use crate::backend::ChatBackend;
use crate::config::SibylConfig;
use crate::models::AnalysisRequest;
use crate::prompt::PromptEngine;

/// Registry of available analyzers.
///
/// Registration order matters: when two supporting analyzers carry the
/// same priority, the one registered first wins.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard lineup: one AI analyzer per
    /// analysis type backed by the given backend, plus the static
    /// analyzer as the always-available fallback.
    pub fn with_default_analyzers(backend: Arc<dyn ChatBackend>, config: &SibylConfig) -> Self {
        let engine = PromptEngine::with_overrides(&config.templates);
        let timeout = Duration::from_secs(config.backend.timeout_secs);
        let profiles = config.depths.clone();

        let mut registry = Self::new();
        registry.register(Arc::new(AiAnalyzer::code_quality(
            Arc::clone(&backend),
            engine.clone(),
            profiles.clone(),
            timeout,
        )));
        registry.register(Arc::new(AiAnalyzer::architecture(
            Arc::clone(&backend),
            engine.clone(),
            profiles.clone(),
            timeout,
        )));
        registry.register(Arc::new(AiAnalyzer::performance(
            Arc::clone(&backend),
            engine.clone(),
            profiles.clone(),
            timeout,
        )));
        registry.register(Arc::new(AiAnalyzer::security(
            Arc::clone(&backend),
            engine,
            profiles,
            timeout,
        )));
        registry.register(Arc::new(StaticAnalyzer::new()));

        registry
    }

    /// Register an analyzer
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        debug!(
            "Registered analyzer {} (priority {})",
            analyzer.name(),
            analyzer.priority()
        );
        self.analyzers.push(analyzer);
    }

    /// All registered analyzers in registration order
    pub fn all(&self) -> &[Arc<dyn Analyzer>] {
        &self.analyzers
    }

    /// Number of registered analyzers
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Pick the highest-priority analyzer supporting the request.
    ///
    /// Ties go to the earliest registration.
    pub fn select_for(&self, request: &AnalysisRequest) -> Option<Arc<dyn Analyzer>> {
        let mut best: Option<&Arc<dyn Analyzer>> = None;
        for analyzer in &self.analyzers {
            if !analyzer.supports(request) {
                continue;
            }
            if best.map_or(true, |current| analyzer.priority() > current.priority()) {
                best = Some(analyzer);
            }
        }
        best.map(Arc::clone)
    }
}
