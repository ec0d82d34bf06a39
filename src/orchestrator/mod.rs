//! Coordinates a request through validation, analyzer selection,
//! caching, rate limiting, and the retry loop with model fallback.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, warn};

use crate::analyzers::AnalyzerRegistry;
use crate::cache::ResultCache;
use crate::errors::{AnalysisError, SibylError, ValidationError};
use crate::limiter::RateLimiter;
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::selector::ModelSelector;

/// Per-request outcomes of a batch run, keyed by input position
pub type BatchOutcomes = BTreeMap<usize, Result<AnalysisResult, SibylError>>;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_MIN_CACHE_CONFIDENCE: f64 = 0.7;
const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Drives analysis requests end to end.
///
/// One request costs at most one rate-limit permit, however many
/// attempts the retry loop makes.
pub struct AnalysisOrchestrator<C: ResultCache, L: RateLimiter> {
    registry: AnalyzerRegistry,
    selector: ModelSelector,
    cache: C,
    limiter: L,
    max_attempts: u32,
    cache_ttl: Duration,
    min_cache_confidence: f64,
    max_request_bytes: usize,
}

impl<C: ResultCache, L: RateLimiter> AnalysisOrchestrator<C, L> {
    /// Assemble an orchestrator with default retry and cache settings
    pub fn new(registry: AnalyzerRegistry, selector: ModelSelector, cache: C, limiter: L) -> Self {
        Self {
            registry,
            selector,
            cache,
            limiter,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cache_ttl: DEFAULT_CACHE_TTL,
            min_cache_confidence: DEFAULT_MIN_CACHE_CONFIDENCE,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }

    /// Set the attempt ceiling, floored at one
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the lifetime for cached results
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the confidence a result must exceed to be cached
    pub fn with_min_cache_confidence(mut self, confidence: f64) -> Self {
        self.min_cache_confidence = confidence;
        self
    }

    /// Set the combined code size ceiling in bytes
    pub fn with_max_request_bytes(mut self, max: usize) -> Self {
        self.max_request_bytes = max;
        self
    }

    /// Run one request through the full pipeline.
    ///
    /// On a cache hit the stored result is returned without consuming a
    /// rate-limit permit. Attempts after the first run against the next
    /// model in the fallback chain; when every attempt fails the last
    /// error is returned wrapped with the attempt count.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, SibylError> {
        self.validate(request)?;

        let analyzer = self
            .registry
            .select_for(request)
            .ok_or(AnalysisError::NoAnalyzer {
                analysis_type: request.analysis_type,
            })?;
        debug!(
            "Selected analyzer {} for request {}",
            analyzer.name(),
            request.id
        );

        let cache_key = request.cache_key(analyzer.name());
        if let Some(hit) = self.cache.get(&cache_key) {
            debug!("Cache hit for request {}", request.id);
            return Ok(hit);
        }

        if !self.limiter.try_consume(1) {
            return Err(AnalysisError::RateLimited.into());
        }

        let mut model = self.selector.select_model(request);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(
                "Attempt {}/{} for request {} with model '{}'",
                attempt, self.max_attempts, request.id, model
            );

            match analyzer.analyze(request, &model).await {
                Ok(result) => {
                    if result.confidence > self.min_cache_confidence {
                        self.cache.put(&cache_key, &result, self.cache_ttl);
                    } else {
                        debug!(
                            "Not caching request {}: confidence {:.2} at or below {:.2}",
                            request.id, result.confidence, self.min_cache_confidence
                        );
                    }
                    return Ok(result);
                }
                Err(err) => {
                    warn!(
                        "Attempt {} for request {} failed: {}",
                        attempt, request.id, err
                    );
                    if attempt >= self.max_attempts {
                        return Err(AnalysisError::Exhausted {
                            attempts: attempt,
                            source: Box::new(err),
                        }
                        .into());
                    }
                    if let Some(next) = self.selector.fallback_model(&model) {
                        debug!("Falling back from model '{}' to '{}'", model, next);
                        model = next;
                    }
                }
            }
        }
    }

    /// Run several requests in order.
    ///
    /// One failure does not stop the rest; every input position gets an
    /// entry in the returned map.
    pub async fn analyze_batch(&self, requests: &[AnalysisRequest]) -> BatchOutcomes {
        let mut outcomes = BatchOutcomes::new();
        for (index, request) in requests.iter().enumerate() {
            debug!(
                "Batch item {}/{}: {} analysis of {} file(s)",
                index + 1,
                requests.len(),
                request.analysis_type,
                request.files.len()
            );
            let outcome = self.analyze(request).await;
            if let Err(err) = &outcome {
                warn!("Batch item {} failed: {}", index + 1, err);
            }
            outcomes.insert(index, outcome);
        }
        outcomes
    }

    fn validate(&self, request: &AnalysisRequest) -> Result<(), ValidationError> {
        if request.id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        if request.files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        if let Some((path, _)) = request
            .files
            .iter()
            .find(|(_, content)| content.trim().is_empty())
        {
            return Err(ValidationError::EmptyFile(path.clone()));
        }
        let len = request.total_code_len();
        if len > self.max_request_bytes {
            return Err(ValidationError::Oversized {
                len,
                max: self.max_request_bytes,
            });
        }
        Ok(())
    }
}
