//! Regex-based static analyzer, the fallback when no AI backend is
//! available.
//!
//! The rules are deliberately crude: they catch the patterns that are
//! embarrassing to miss (string-built SQL, eval, hardcoded secrets)
//! and make no attempt at real parsing. Findings carry a reduced
//! confidence so they are never mistaken for a full review.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Analyzer, AnalyzerBase};
use crate::errors::AnalysisError;
use crate::models::{
    AnalysisRequest, AnalysisResult, AnalysisType, Issue, IssueCategory, MetricValue, Severity,
    Suggestion, SuggestionKind, SuggestionPriority,
};

/// Selection priority; low so any AI analyzer outranks it
const STATIC_PRIORITY: u32 = 10;

/// Confidence attached to heuristic findings
const STATIC_CONFIDENCE: f64 = 0.6;

/// Files longer than this are flagged as oversized modules
const MAX_FILE_LINES: usize = 600;

/// Longest snippet echoed into an issue
const MAX_SNIPPET_CHARS: usize = 160;

struct StaticRule {
    id: &'static str,
    pattern: Regex,
    title: &'static str,
    description: &'static str,
    severity: Severity,
    category: IssueCategory,
    applies_to: &'static [AnalysisType],
    fix: Option<&'static str>,
}

static RULES: Lazy<Vec<StaticRule>> = Lazy::new(|| {
    let rule = |id, pattern: &str, title, description, severity, category, applies_to, fix| {
        StaticRule {
            id,
            pattern: Regex::new(pattern).expect("static rule pattern is valid"),
            title,
            description,
            severity,
            category,
            applies_to,
            fix,
        }
    };

    vec![
        rule(
            "sql_string_concat",
            r#"(?i)\b(query|exec|execute)\s*\(\s*["'][^"']*["']\s*[.+]"#,
            "SQL built by string concatenation",
            "Concatenating values into a query string invites SQL injection.",
            Severity::Critical,
            IssueCategory::Security,
            &[AnalysisType::Security],
            Some("Use parameterized queries or prepared statements."),
        ),
        rule(
            "eval_call",
            r"(?i)\beval\s*\(",
            "Dynamic code execution via eval",
            "Evaluating runtime strings as code executes whatever an attacker can inject.",
            Severity::High,
            IssueCategory::Security,
            &[AnalysisType::Security],
            Some("Replace eval with explicit dispatch over known operations."),
        ),
        rule(
            "hardcoded_credential",
            r#"(?i)(password|passwd|secret|api[_-]?key|token)\s*[:=]\s*["'][^"']{4,}["']"#,
            "Possible hardcoded credential",
            "Secrets embedded in source end up in version control and builds.",
            Severity::High,
            IssueCategory::Security,
            &[AnalysisType::Security],
            Some("Load secrets from the environment or a secret store."),
        ),
        rule(
            "weak_hash",
            r"(?i)\b(md5|sha1)\s*\(",
            "Weak hash function",
            "MD5 and SHA-1 are broken for any security-sensitive use.",
            Severity::Medium,
            IssueCategory::Security,
            &[AnalysisType::Security],
            Some("Use SHA-256 or a dedicated password hash like argon2."),
        ),
        rule(
            "select_star",
            r"(?i)\bselect\s+\*\s+from\b",
            "SELECT * query",
            "Fetching every column moves data nobody reads and breaks when schemas grow.",
            Severity::Medium,
            IssueCategory::Performance,
            &[AnalysisType::Performance],
            Some("Name the columns the caller actually uses."),
        ),
        rule(
            "blocking_sleep",
            r"(?i)\b(u?sleep)\s*\(",
            "Blocking sleep call",
            "Sleeping on a request path stalls the caller and hides real synchronization needs.",
            Severity::Medium,
            IssueCategory::Performance,
            &[AnalysisType::Performance],
            None,
        ),
        rule(
            "debug_output",
            r"(?i)\b(var_dump|print_r|console\.log)\s*\(|\bdbg!\s*\(",
            "Leftover debug output",
            "Debug printing leaks internals and clutters production logs.",
            Severity::Low,
            IssueCategory::CodeStyle,
            &[AnalysisType::CodeQuality],
            Some("Remove the call or route it through the logging layer."),
        ),
        rule(
            "todo_marker",
            r"\b(TODO|FIXME|HACK|XXX)\b",
            "Unresolved marker comment",
            "Marker comments accumulate as silent debt unless tracked.",
            Severity::Info,
            IssueCategory::Maintainability,
            &[AnalysisType::CodeQuality],
            None,
        ),
        rule(
            "empty_catch",
            r"(?i)catch\s*\([^)]*\)\s*\{\s*\}",
            "Swallowed exception",
            "An empty catch block hides failures from both users and logs.",
            Severity::Medium,
            IssueCategory::Correctness,
            &[AnalysisType::CodeQuality],
            Some("Log the error or let it propagate."),
        ),
        rule(
            "wildcard_import",
            r"^\s*use\s+.*::\*\s*;|^\s*from\s+\w[\w.]*\s+import\s+\*",
            "Wildcard import",
            "Glob imports hide where names come from and invite collisions.",
            Severity::Low,
            IssueCategory::Architecture,
            &[AnalysisType::Architecture],
            Some("Import the specific names in use."),
        ),
        rule(
            "mutable_global",
            r"(?i)^\s*global\s+\w+|\bstatic\s+mut\b",
            "Mutable global state",
            "Globals couple distant code and defeat testing in isolation.",
            Severity::Medium,
            IssueCategory::Architecture,
            &[AnalysisType::Architecture],
            None,
        ),
    ]
});

/// Heuristic analyzer that needs no backend and supports every
/// analysis type
pub struct StaticAnalyzer {
    base: AnalyzerBase,
}

impl Default for StaticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticAnalyzer {
    /// Create the static analyzer
    pub fn new() -> Self {
        Self {
            base: AnalyzerBase {
                name: "static_fallback".to_string(),
                // Nominal; the analyzer accepts every type
                analysis_type: AnalysisType::CodeQuality,
                priority: STATIC_PRIORITY,
            },
        }
    }

    fn scan(&self, request: &AnalysisRequest) -> (Vec<Issue>, usize, usize) {
        let rules: Vec<&StaticRule> = RULES
            .iter()
            .filter(|rule| rule.applies_to.contains(&request.analysis_type))
            .collect();

        let mut issues = Vec::new();
        let mut lines_scanned = 0;

        for (path, content) in &request.files {
            for (index, line) in content.lines().enumerate() {
                lines_scanned += 1;
                for rule in &rules {
                    if rule.pattern.is_match(line) {
                        let snippet: String = line.trim().chars().take(MAX_SNIPPET_CHARS).collect();
                        let mut issue = Issue::new(
                            rule.title,
                            rule.description,
                            rule.severity,
                            rule.category,
                        )
                        .with_file(path.clone())
                        .with_line(index + 1)
                        .with_rule(rule.id)
                        .with_snippet(snippet);
                        if let Some(fix) = rule.fix {
                            issue = issue.with_fix(fix);
                        }
                        issues.push(issue);
                    }
                }
            }

            if request.analysis_type == AnalysisType::Architecture {
                let line_total = content.lines().count();
                if line_total > MAX_FILE_LINES {
                    issues.push(
                        Issue::new(
                            "Oversized module",
                            format!(
                                "{} lines in one file is a sign it carries too many responsibilities.",
                                line_total
                            ),
                            Severity::Medium,
                            IssueCategory::Architecture,
                        )
                        .with_file(path.clone())
                        .with_rule("oversized_module"),
                    );
                }
            }
        }

        (issues, rules.len(), lines_scanned)
    }
}

#[async_trait]
impl Analyzer for StaticAnalyzer {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn priority(&self) -> u32 {
        self.base.priority
    }

    fn supports(&self, _request: &AnalysisRequest) -> bool {
        true
    }

    async fn analyze(
        &self,
        request: &AnalysisRequest,
        _model: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let (issues, rules_applied, lines_scanned) = self.scan(request);
        debug!(
            "Static scan applied {} rules over {} lines, found {} issues",
            rules_applied,
            lines_scanned,
            issues.len()
        );

        let mut suggestions = Vec::new();
        if issues.iter().any(|issue| issue.category == IssueCategory::Security) {
            suggestions.push(
                Suggestion::new(
                    "Review flagged security findings",
                    "Heuristic security hits are usually real; each flagged line should be \
                     fixed or explicitly cleared.",
                    SuggestionKind::SecurityHardening,
                    SuggestionPriority::High,
                )
                .with_benefits(vec!["Closes the most likely attack paths".to_string()]),
            );
        }
        if issues.iter().any(|issue| issue.category == IssueCategory::Performance) {
            suggestions.push(Suggestion::new(
                "Profile the flagged hot spots",
                "Pattern matches only hint at cost; a profiler run will confirm which ones matter.",
                SuggestionKind::Optimization,
                SuggestionPriority::Medium,
            ));
        }

        let mut metrics = BTreeMap::new();
        metrics.insert("files_scanned".to_string(), MetricValue::from(request.files.len()));
        metrics.insert("lines_scanned".to_string(), MetricValue::from(lines_scanned));
        metrics.insert("rules_applied".to_string(), MetricValue::from(rules_applied));

        let summary = format!(
            "Static scan of {} file(s) found {} issue(s)",
            request.files.len(),
            issues.len()
        );

        Ok(AnalysisResult::new(
            request.analysis_type,
            summary,
            issues,
            suggestions,
            metrics,
            STATIC_CONFIDENCE,
        ))
    }
}
