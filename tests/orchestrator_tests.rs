use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sibyl::analyzers::AnalyzerRegistry;
use sibyl::cache::{MemoryCache, ResultCache};
use sibyl::errors::{AnalysisError, SibylError, ValidationError};
use sibyl::limiter::{FixedWindowLimiter, Unlimited};
use sibyl::models::{AnalysisRequest, AnalysisType};
use sibyl::orchestrator::AnalysisOrchestrator;
use sibyl::selector::{ModelPolicy, ModelSelector};

// Import our mock analyzer and backend
use self::test_mocks::{RecordingAnalyzer, ScriptedOutcome};

// Define a module with mock implementations for this test file
mod test_mocks {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use sibyl::analyzers::Analyzer;
    use sibyl::errors::{AnalysisError, BackendError};
    use sibyl::models::{AnalysisRequest, AnalysisResult, AnalysisType};

    /// What the mock analyzer should do on one call
    pub enum ScriptedOutcome {
        /// Succeed with a result at the given confidence
        Succeed(f64),

        /// Fail with a transport-style backend error
        Fail,
    }

    /// An analyzer that follows a script and records every call it gets
    pub struct RecordingAnalyzer {
        name: String,
        analysis_type: AnalysisType,
        priority: u32,
        script: Mutex<Vec<ScriptedOutcome>>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingAnalyzer {
        /// Create a mock that plays the scripted outcomes in order.
        ///
        /// When the script runs out the mock keeps succeeding at full
        /// confidence.
        pub fn new(
            name: &str,
            analysis_type: AnalysisType,
            priority: u32,
            script: Vec<ScriptedOutcome>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                analysis_type,
                priority,
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            })
        }

        /// Models this mock was called with, in call order
        pub fn models_seen(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        /// How many times analyze ran
        pub fn call_count(&self) -> usize {
            self.calls.lock().expect("calls lock").len()
        }
    }

    #[async_trait]
    impl Analyzer for RecordingAnalyzer {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> u32 {
            self.priority
        }

        fn supports(&self, request: &AnalysisRequest) -> bool {
            request.analysis_type == self.analysis_type
        }

        async fn analyze(
            &self,
            request: &AnalysisRequest,
            model: &str,
        ) -> Result<AnalysisResult, AnalysisError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(model.to_string());

            let outcome = {
                let mut script = self.script.lock().expect("script lock");
                if script.is_empty() {
                    ScriptedOutcome::Succeed(1.0)
                } else {
                    script.remove(0)
                }
            };
            match outcome {
                ScriptedOutcome::Succeed(confidence) => Ok(AnalysisResult::new(
                    request.analysis_type,
                    format!("Mock analysis by {}", self.name),
                    Vec::new(),
                    Vec::new(),
                    std::collections::BTreeMap::new(),
                    confidence,
                )),
                ScriptedOutcome::Fail => Err(AnalysisError::Backend(BackendError::Api {
                    status: 503,
                    message: "scripted failure".to_string(),
                })),
            }
        }
    }
}

/// Build a small valid request for the given analysis type
fn sample_request(analysis_type: AnalysisType) -> AnalysisRequest {
    let mut files = BTreeMap::new();
    files.insert(
        PathBuf::from("src/app.py"),
        "def handler(request):\n    return process(request)\n".to_string(),
    );
    AnalysisRequest::new(analysis_type, files).with_id("test-request")
}

/// Default selector over the built-in model chain
fn default_selector() -> ModelSelector {
    ModelSelector::new(ModelPolicy::default(), Default::default())
}

fn registry_with(analyzer: Arc<test_mocks::RecordingAnalyzer>) -> AnalyzerRegistry {
    let mut registry = AnalyzerRegistry::new();
    registry.register(analyzer);
    registry
}

#[tokio::test]
async fn test_successful_analysis_first_attempt() {
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![ScriptedOutcome::Succeed(0.9)],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    );

    let request = sample_request(AnalysisType::CodeQuality);
    let result = orchestrator
        .analyze(&request)
        .await
        .expect("analysis should succeed");

    assert_eq!(result.analysis_type, AnalysisType::CodeQuality);
    assert_eq!(analyzer.call_count(), 1);

    // A standard-tier request starts on the standard model
    assert_eq!(analyzer.models_seen(), vec!["gpt-4o-mini".to_string()]);
}

#[tokio::test]
async fn test_retry_walks_the_fallback_chain() {
    // Two failures, then success: the orchestrator should step through
    // the chain one model per failed attempt
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::Security,
        100,
        vec![
            ScriptedOutcome::Fail,
            ScriptedOutcome::Fail,
            ScriptedOutcome::Succeed(0.9),
        ],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    )
    .with_max_attempts(3);

    let request = sample_request(AnalysisType::Security);
    orchestrator
        .analyze(&request)
        .await
        .expect("third attempt should succeed");

    // Security starts premium, then falls back through the chain
    assert_eq!(
        analyzer.models_seen(),
        vec![
            "gpt-4o".to_string(),
            "gpt-4o-mini".to_string(),
            "gpt-3.5-turbo".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_exhausted_after_max_attempts() {
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![
            ScriptedOutcome::Fail,
            ScriptedOutcome::Fail,
            ScriptedOutcome::Fail,
        ],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    )
    .with_max_attempts(3);

    let request = sample_request(AnalysisType::CodeQuality);
    let err = orchestrator
        .analyze(&request)
        .await
        .expect_err("all attempts fail");

    assert_eq!(analyzer.call_count(), 3);
    match err {
        SibylError::Analysis(AnalysisError::Exhausted { attempts, .. }) => {
            assert_eq!(attempts, 3);
        }
        other => panic!("Expected Exhausted error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cache_hit_skips_the_analyzer() {
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![ScriptedOutcome::Succeed(0.9)],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    );

    let request = sample_request(AnalysisType::CodeQuality);
    let first = orchestrator.analyze(&request).await.expect("first run");

    // Same content, different id: must hit the cache
    let resubmission = sample_request(AnalysisType::CodeQuality).with_id("resubmission");
    let second = orchestrator.analyze(&resubmission).await.expect("second run");

    assert_eq!(analyzer.call_count(), 1);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.timestamp, second.timestamp);
}

#[tokio::test]
async fn test_low_confidence_results_are_not_cached() {
    // Confidence 0.5 sits below the 0.7 default threshold
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![
            ScriptedOutcome::Succeed(0.5),
            ScriptedOutcome::Succeed(0.5),
        ],
    );
    let cache = MemoryCache::new();
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        cache,
        Unlimited,
    );

    let request = sample_request(AnalysisType::CodeQuality);
    orchestrator.analyze(&request).await.expect("first run");
    orchestrator.analyze(&request).await.expect("second run");

    // No cache hit: the analyzer ran both times
    assert_eq!(analyzer.call_count(), 2);
}

#[tokio::test]
async fn test_rate_limited_request_is_rejected() {
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![
            ScriptedOutcome::Succeed(0.5),
            ScriptedOutcome::Succeed(0.5),
        ],
    );
    // One permit per minute; the second distinct request must be refused
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        FixedWindowLimiter::per_minute(1),
    );

    let first = sample_request(AnalysisType::CodeQuality);
    orchestrator.analyze(&first).await.expect("first run fits");

    let mut files = BTreeMap::new();
    files.insert(PathBuf::from("other.py"), "x = 1\n".to_string());
    let second = AnalysisRequest::new(AnalysisType::CodeQuality, files).with_id("second");
    let err = orchestrator
        .analyze(&second)
        .await
        .expect_err("second run exceeds the window");

    assert!(matches!(
        err,
        SibylError::Analysis(AnalysisError::RateLimited)
    ));
    assert_eq!(analyzer.call_count(), 1);
}

#[tokio::test]
async fn test_retries_consume_a_single_permit() {
    // Fail, fail, succeed: three attempts, one request, one permit
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![
            ScriptedOutcome::Fail,
            ScriptedOutcome::Fail,
            ScriptedOutcome::Succeed(0.9),
        ],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        FixedWindowLimiter::per_minute(1),
    )
    .with_max_attempts(3);

    let request = sample_request(AnalysisType::CodeQuality);
    orchestrator
        .analyze(&request)
        .await
        .expect("retries stay within the single permit");

    assert_eq!(analyzer.call_count(), 3);
}

#[tokio::test]
async fn test_no_analyzer_for_request() {
    // Registry only handles code quality; ask for security
    let analyzer = RecordingAnalyzer::new("mock", AnalysisType::CodeQuality, 100, Vec::new());
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    );

    let request = sample_request(AnalysisType::Security);
    let err = orchestrator.analyze(&request).await.expect_err("no analyzer");

    assert!(matches!(
        err,
        SibylError::Analysis(AnalysisError::NoAnalyzer {
            analysis_type: AnalysisType::Security
        })
    ));
}

#[tokio::test]
async fn test_validation_rejects_bad_requests() {
    let analyzer = RecordingAnalyzer::new("mock", AnalysisType::CodeQuality, 100, Vec::new());
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    );

    // Blank id
    let blank_id = sample_request(AnalysisType::CodeQuality).with_id("   ");
    let err = orchestrator.analyze(&blank_id).await.expect_err("blank id");
    assert!(matches!(
        err,
        SibylError::Validation(ValidationError::MissingId)
    ));

    // No files
    let empty = AnalysisRequest::new(AnalysisType::CodeQuality, BTreeMap::new());
    let err = orchestrator.analyze(&empty).await.expect_err("no files");
    assert!(matches!(err, SibylError::Validation(ValidationError::NoFiles)));

    // A file with only whitespace
    let mut files = BTreeMap::new();
    files.insert(PathBuf::from("blank.py"), "   \n\n".to_string());
    let blank_file = AnalysisRequest::new(AnalysisType::CodeQuality, files);
    let err = orchestrator
        .analyze(&blank_file)
        .await
        .expect_err("empty file");
    match err {
        SibylError::Validation(ValidationError::EmptyFile(path)) => {
            assert_eq!(path, PathBuf::from("blank.py"));
        }
        other => panic!("Expected EmptyFile error, got {other:?}"),
    }

    // None of the rejects reached the analyzer
    assert_eq!(analyzer.call_count(), 0);
}

#[tokio::test]
async fn test_validation_rejects_oversized_requests() {
    let analyzer = RecordingAnalyzer::new("mock", AnalysisType::CodeQuality, 100, Vec::new());
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    )
    .with_max_request_bytes(64);

    let mut files = BTreeMap::new();
    files.insert(PathBuf::from("big.py"), "x = 1\n".repeat(100));
    let request = AnalysisRequest::new(AnalysisType::CodeQuality, files);
    let err = orchestrator.analyze(&request).await.expect_err("too large");

    match err {
        SibylError::Validation(ValidationError::Oversized { len, max }) => {
            assert_eq!(len, 600);
            assert_eq!(max, 64);
        }
        other => panic!("Expected Oversized error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_keeps_every_outcome() {
    // One supported request, one unsupported, one invalid
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![ScriptedOutcome::Succeed(0.9)],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    );

    let requests = vec![
        sample_request(AnalysisType::CodeQuality),
        sample_request(AnalysisType::Security).with_id("unsupported"),
        AnalysisRequest::new(AnalysisType::CodeQuality, BTreeMap::new()),
    ];
    let outcomes = orchestrator.analyze_batch(&requests).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.get(&0).expect("first outcome").is_ok());
    assert!(outcomes.get(&1).expect("second outcome").is_err());
    assert!(outcomes.get(&2).expect("third outcome").is_err());
}

#[tokio::test]
async fn test_cache_expiry_forces_a_fresh_run() {
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![
            ScriptedOutcome::Succeed(0.9),
            ScriptedOutcome::Succeed(0.9),
        ],
    );
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer.clone()),
        default_selector(),
        MemoryCache::new(),
        Unlimited,
    )
    .with_cache_ttl(Duration::from_millis(10));

    let request = sample_request(AnalysisType::CodeQuality);
    orchestrator.analyze(&request).await.expect("first run");

    tokio::time::sleep(Duration::from_millis(30)).await;

    orchestrator.analyze(&request).await.expect("second run");
    assert_eq!(analyzer.call_count(), 2);
}

#[tokio::test]
async fn test_high_confidence_result_lands_in_the_cache() {
    let analyzer = RecordingAnalyzer::new(
        "mock",
        AnalysisType::CodeQuality,
        100,
        vec![ScriptedOutcome::Succeed(0.95)],
    );
    let cache = Arc::new(MemoryCache::new());
    let orchestrator = AnalysisOrchestrator::new(
        registry_with(analyzer),
        default_selector(),
        Arc::clone(&cache),
        Unlimited,
    );

    let request = sample_request(AnalysisType::CodeQuality);
    orchestrator.analyze(&request).await.expect("analysis");

    let key = request.cache_key("mock");
    assert!(cache.get(&key).is_some(), "result should be cached under {key}");
}
