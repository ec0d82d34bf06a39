//! Tests for the static fallback analyzer and the AI analyzer

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sibyl::analyzers::{AiAnalyzer, Analyzer, StaticAnalyzer};
use sibyl::config::DepthProfiles;
use sibyl::errors::AnalysisError;
use sibyl::models::{
    AnalysisDepth, AnalysisRequest, AnalysisType, IssueCategory, MetricValue, Severity,
};
use sibyl::prompt::PromptEngine;

use self::test_mocks::CannedBackend;

// Define a module with mock implementations for this test file
mod test_mocks {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use sibyl::backend::{ChatBackend, CompletionOptions, MessageBag};
    use sibyl::errors::BackendError;

    /// Backend that replies with a canned string and records what it
    /// was asked
    pub struct CannedBackend {
        reply: Result<String, u16>,
        calls: Mutex<Vec<(String, MessageBag, CompletionOptions)>>,
    }

    impl CannedBackend {
        /// Backend that always answers with the given text
        pub fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        /// Backend that always fails with the given HTTP status
        pub fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: Mutex::new(Vec::new()),
            })
        }

        /// Everything complete() was called with, in order
        pub fn calls(&self) -> Vec<(String, MessageBag, CompletionOptions)> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl ChatBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn complete(
            &self,
            model: &str,
            messages: &MessageBag,
            options: &CompletionOptions,
        ) -> Result<String, BackendError> {
            self.calls.lock().expect("calls lock").push((
                model.to_string(),
                messages.clone(),
                options.clone(),
            ));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(BackendError::Api {
                    status: *status,
                    message: "canned failure".to_string(),
                }),
            }
        }
    }

    /// Backend that claims to be unconfigured
    pub struct UnconfiguredBackend;

    #[async_trait]
    impl ChatBackend for UnconfiguredBackend {
        fn name(&self) -> &str {
            "unconfigured"
        }

        fn is_configured(&self) -> bool {
            false
        }

        async fn complete(
            &self,
            _model: &str,
            _messages: &MessageBag,
            _options: &CompletionOptions,
        ) -> Result<String, BackendError> {
            Err(BackendError::NotConfigured)
        }
    }
}

fn request_with(analysis_type: AnalysisType, path: &str, code: &str) -> AnalysisRequest {
    let mut files = BTreeMap::new();
    files.insert(PathBuf::from(path), code.to_string());
    AnalysisRequest::new(analysis_type, files)
}

#[tokio::test]
async fn test_concatenated_sql_yields_one_critical_security_issue() {
    let analyzer = StaticAnalyzer::new();
    let request = request_with(
        AnalysisType::Security,
        "db.php",
        "<?php\nfunction load($db, $id) {\n    return $db->query(\"SELECT name FROM users WHERE id = \" . $id);\n}\n",
    );

    let result = analyzer
        .analyze(&request, "unused")
        .await
        .expect("static analysis never fails");

    assert_eq!(result.issues.len(), 1);
    let issue = &result.issues[0];
    assert_eq!(issue.category, IssueCategory::Security);
    assert_eq!(issue.severity, Severity::Critical);
    assert_eq!(issue.rule.as_deref(), Some("sql_string_concat"));
    assert_eq!(issue.line, Some(3));
    assert_eq!(result.overall_severity, Severity::Critical);
}

#[tokio::test]
async fn test_static_security_rules_catch_the_classics() {
    let analyzer = StaticAnalyzer::new();
    let request = request_with(
        AnalysisType::Security,
        "bad.py",
        "password = \"hunter2-prod\"\nresult = eval(user_input)\ndigest = md5(data)\n",
    );

    let result = analyzer.analyze(&request, "unused").await.unwrap();
    let rules: Vec<&str> = result
        .issues
        .iter()
        .filter_map(|issue| issue.rule.as_deref())
        .collect();

    assert!(rules.contains(&"hardcoded_credential"), "rules: {rules:?}");
    assert!(rules.contains(&"eval_call"), "rules: {rules:?}");
    assert!(rules.contains(&"weak_hash"), "rules: {rules:?}");

    // Security hits come with a hardening suggestion
    assert!(!result.suggestions.is_empty());
}

#[tokio::test]
async fn test_static_rules_respect_the_analysis_type() {
    let analyzer = StaticAnalyzer::new();
    // Contains a performance smell, but we ask for a security review
    let request = request_with(
        AnalysisType::Security,
        "report.py",
        "rows = run(\"SELECT * FROM reports\")\n",
    );

    let result = analyzer.analyze(&request, "unused").await.unwrap();
    assert!(
        result.issues.is_empty(),
        "select_star is a performance rule, not a security one"
    );
}

#[tokio::test]
async fn test_static_performance_and_quality_rules() {
    let analyzer = StaticAnalyzer::new();

    let performance = request_with(
        AnalysisType::Performance,
        "slow.py",
        "rows = run(\"SELECT * FROM big_table\")\nsleep(5)\n",
    );
    let result = analyzer.analyze(&performance, "unused").await.unwrap();
    assert_eq!(result.issues.len(), 2);

    let quality = request_with(
        AnalysisType::CodeQuality,
        "messy.js",
        "console.log(state);\n// TODO clean this up\ntry { run() } catch (e) {}\n",
    );
    let result = analyzer.analyze(&quality, "unused").await.unwrap();
    let rules: Vec<&str> = result
        .issues
        .iter()
        .filter_map(|issue| issue.rule.as_deref())
        .collect();
    assert!(rules.contains(&"debug_output"));
    assert!(rules.contains(&"todo_marker"));
    assert!(rules.contains(&"empty_catch"));
}

#[tokio::test]
async fn test_static_architecture_flags_oversized_modules() {
    let analyzer = StaticAnalyzer::new();
    let request = request_with(
        AnalysisType::Architecture,
        "monolith.py",
        &"x = 1\n".repeat(700),
    );

    let result = analyzer.analyze(&request, "unused").await.unwrap();
    let rules: Vec<&str> = result
        .issues
        .iter()
        .filter_map(|issue| issue.rule.as_deref())
        .collect();
    assert!(rules.contains(&"oversized_module"));
}

#[tokio::test]
async fn test_static_results_carry_reduced_confidence_and_metrics() {
    let analyzer = StaticAnalyzer::new();
    let request = request_with(AnalysisType::CodeQuality, "ok.py", "x = 1\ny = 2\n");

    let result = analyzer.analyze(&request, "unused").await.unwrap();
    assert_eq!(result.confidence, 0.6);
    assert_eq!(
        result.metrics.get("files_scanned"),
        Some(&MetricValue::Integer(1))
    );
    assert_eq!(
        result.metrics.get("lines_scanned"),
        Some(&MetricValue::Integer(2))
    );
}

#[test]
fn test_static_analyzer_supports_everything() {
    let analyzer = StaticAnalyzer::new();
    assert_eq!(analyzer.name(), "static_fallback");
    assert_eq!(analyzer.priority(), 10);

    for analysis_type in [
        AnalysisType::CodeQuality,
        AnalysisType::Architecture,
        AnalysisType::Performance,
        AnalysisType::Security,
    ] {
        let request = request_with(analysis_type, "a.py", "x = 1\n");
        assert!(analyzer.supports(&request));
    }
}

fn ai_analyzer(backend: Arc<dyn sibyl::backend::ChatBackend>) -> AiAnalyzer {
    AiAnalyzer::security(
        backend,
        PromptEngine::new(),
        DepthProfiles::default(),
        Duration::from_secs(30),
    )
}

#[tokio::test]
async fn test_ai_analyzer_parses_the_backend_reply() {
    let backend = CannedBackend::replying(
        r#"```json
{"summary": "Looks risky", "issues": [{"title": "Injection", "severity": "high", "category": "security"}], "confidence": 0.9}
```"#,
    );
    let analyzer = ai_analyzer(backend.clone());
    let request = request_with(AnalysisType::Security, "api.py", "run(cmd)\n")
        .with_depth(AnalysisDepth::Expert);

    let result = analyzer.analyze(&request, "gpt-4o").await.expect("analysis");

    assert_eq!(result.summary, "Looks risky");
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.overall_severity, Severity::High);

    // The backend saw the selected model and the expert depth tuning
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    let (model, messages, options) = &calls[0];
    assert_eq!(model, "gpt-4o");
    assert!(messages.system.content.contains("security engineer"));
    assert!(messages.user.content.contains("run(cmd)"));
    let expert = DepthProfiles::default();
    assert_eq!(options.temperature, expert.expert.temperature);
    assert_eq!(options.max_tokens, expert.expert.max_tokens);
}

#[tokio::test]
async fn test_ai_analyzer_degrades_unparseable_replies() {
    let backend = CannedBackend::replying("The stars are silent today.");
    let analyzer = ai_analyzer(backend);
    let request = request_with(AnalysisType::Security, "api.py", "run(cmd)\n");

    // Not an error: the parser absorbs it into a low-confidence result
    let result = analyzer.analyze(&request, "gpt-4o").await.expect("analysis");
    assert_eq!(result.confidence, 0.1);
    assert_eq!(
        result.metrics.get("parse_error"),
        Some(&MetricValue::Flag(true))
    );
}

#[tokio::test]
async fn test_ai_analyzer_propagates_backend_errors() {
    let backend = CannedBackend::failing(503);
    let analyzer = ai_analyzer(backend);
    let request = request_with(AnalysisType::Security, "api.py", "run(cmd)\n");

    let err = analyzer
        .analyze(&request, "gpt-4o")
        .await
        .expect_err("transport failures must surface for the retry loop");
    assert!(matches!(err, AnalysisError::Backend(_)));
}

#[test]
fn test_ai_analyzer_supports_only_its_type_with_a_configured_backend() {
    let configured = ai_analyzer(CannedBackend::replying("{}"));
    assert_eq!(configured.name(), "ai_security");
    assert!(configured.supports(&request_with(AnalysisType::Security, "a.py", "x\n")));
    assert!(!configured.supports(&request_with(AnalysisType::CodeQuality, "a.py", "x\n")));

    let unconfigured = ai_analyzer(Arc::new(test_mocks::UnconfiguredBackend));
    assert!(!unconfigured.supports(&request_with(AnalysisType::Security, "a.py", "x\n")));
}
