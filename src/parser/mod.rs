//! Turns raw model replies into structured analysis results.
//!
//! Models are asked for bare JSON but routinely wrap it in prose,
//! markdown fences or XML-ish tags. The parser peels those wrappers
//! off, reads the payload defensively (every field optional, every
//! enum falling back to a documented default) and never fails outward:
//! a reply that defeats every extraction strategy still produces a
//! low-confidence result that says so.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{
    AnalysisRequest, AnalysisResult, AnalysisType, Issue, IssueCategory, MetricValue, Severity,
    Suggestion, SuggestionKind, SuggestionPriority,
};

/// Confidence assumed when the payload does not state one
const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Confidence attached to unparseable-reply fallback results
const FALLBACK_CONFIDENCE: f64 = 0.1;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.+?)\s*```").expect("fence regex is valid"));

static TAGGED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<json>\s*(.+?)\s*</json>").expect("tag regex is valid"));

#[derive(Debug, Error)]
enum ParseError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply JSON is not an object")]
    NotAnObject,
}

#[derive(Debug, Error)]
enum EntryError {
    #[error("entry is not an object")]
    NotAnObject,

    #[error("entry has no title")]
    MissingTitle,
}

/// Parses model replies into [`AnalysisResult`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a reply to a code quality prompt
    pub fn parse_code_quality_response(&self, raw: &str) -> AnalysisResult {
        self.parse(AnalysisType::CodeQuality, raw)
    }

    /// Parse a reply to an architecture prompt
    pub fn parse_architecture_response(&self, raw: &str) -> AnalysisResult {
        self.parse(AnalysisType::Architecture, raw)
    }

    /// Parse a reply to a performance prompt
    pub fn parse_performance_response(&self, raw: &str) -> AnalysisResult {
        self.parse(AnalysisType::Performance, raw)
    }

    /// Parse a reply to a security prompt
    pub fn parse_security_response(&self, raw: &str) -> AnalysisResult {
        self.parse(AnalysisType::Security, raw)
    }

    /// Parse a raw reply for the given analysis type.
    ///
    /// Never fails: replies that cannot be decoded produce a fallback
    /// result flagged with `parse_error` and minimal confidence.
    pub fn parse(&self, analysis_type: AnalysisType, raw: &str) -> AnalysisResult {
        match try_parse(analysis_type, raw) {
            Ok(result) => result,
            Err(err) => {
                warn!("Could not parse {analysis_type} reply ({err}); returning fallback result");
                fallback_result(analysis_type, raw, &err)
            }
        }
    }
}

fn try_parse(analysis_type: AnalysisType, raw: &str) -> Result<AnalysisResult, ParseError> {
    let value = decode_json(raw)?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let summary = str_field(object, "summary")
        .unwrap_or_else(|| format!("{analysis_type} analysis completed"));
    let confidence = f64_field(object, "confidence").unwrap_or(DEFAULT_CONFIDENCE);

    let issues = entries(object, "issues")
        .enumerate()
        .filter_map(|(index, entry)| match parse_issue(entry) {
            Ok(issue) => Some(issue),
            Err(err) => {
                warn!("Skipping malformed issue entry {index}: {err}");
                None
            }
        })
        .collect();

    let suggestions = entries(object, "suggestions")
        .enumerate()
        .filter_map(|(index, entry)| match parse_suggestion(entry) {
            Ok(suggestion) => Some(suggestion),
            Err(err) => {
                warn!("Skipping malformed suggestion entry {index}: {err}");
                None
            }
        })
        .collect();

    let metrics = object
        .get("metrics")
        .and_then(Value::as_object)
        .map(parse_metrics)
        .unwrap_or_default();

    Ok(AnalysisResult::new(
        analysis_type,
        summary,
        issues,
        suggestions,
        metrics,
        confidence,
    ))
}

/// Locate and decode the JSON payload inside a raw reply.
///
/// Candidates are tried in order until one parses: each fenced code
/// block, the first-to-last brace span, a `<json>` wrapper. A candidate
/// that is not valid JSON (a prose code fence, say) falls through to
/// the next strategy instead of poisoning the whole reply. The raw text
/// itself is the final attempt and supplies the error when all fail.
fn decode_json(raw: &str) -> Result<Value, serde_json::Error> {
    let fenced = FENCED_BLOCK
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|block| block.as_str());

    let braced = raw
        .find('{')
        .zip(raw.rfind('}'))
        .filter(|(start, end)| end > start)
        .map(|(start, end)| &raw[start..=end]);

    let tagged = TAGGED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|block| block.as_str());

    for candidate in fenced.chain(braced).chain(tagged) {
        if let Ok(value) = serde_json::from_str(candidate.trim()) {
            return Ok(value);
        }
    }

    serde_json::from_str(raw.trim())
}

fn parse_issue(value: &Value) -> Result<Issue, EntryError> {
    let object = value.as_object().ok_or(EntryError::NotAnObject)?;
    let title = str_field(object, "title")
        .or_else(|| str_field(object, "message"))
        .ok_or(EntryError::MissingTitle)?;

    let mut issue = Issue::new(
        title,
        str_field(object, "description").unwrap_or_default(),
        enum_field(object, "severity", Severity::Medium),
        enum_field(object, "category", IssueCategory::BestPractice),
    );

    if let Some(id) = str_field(object, "id") {
        issue.id = id;
    }
    issue.file = str_field(object, "file").map(Into::into);
    issue.line = usize_field(object, "line");
    issue.column = usize_field(object, "column");
    issue.rule = str_field(object, "rule");
    issue.fix = str_field(object, "fix");
    issue.snippet = str_field(object, "snippet");
    if let Some(metadata) = object.get("metadata").and_then(Value::as_object) {
        issue.metadata = metadata
            .iter()
            .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
            .collect();
    }

    Ok(issue)
}

fn parse_suggestion(value: &Value) -> Result<Suggestion, EntryError> {
    let object = value.as_object().ok_or(EntryError::NotAnObject)?;
    let title = str_field(object, "title").ok_or(EntryError::MissingTitle)?;

    let kind = object
        .get("type")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
        .and_then(|text| SuggestionKind::from_str(text.trim()).ok())
        .unwrap_or(SuggestionKind::CodeCleanup);

    let mut suggestion = Suggestion::new(
        title,
        str_field(object, "description").unwrap_or_default(),
        kind,
        enum_field(object, "priority", SuggestionPriority::Medium),
    );

    if let Some(id) = str_field(object, "id") {
        suggestion.id = id;
    }
    suggestion.implementation = str_field(object, "implementation");
    suggestion.reasoning = str_field(object, "reasoning");
    suggestion.example = str_field(object, "example");
    if let Some(benefits) = object.get("benefits").and_then(Value::as_array) {
        suggestion.benefits = benefits
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_string))
            .collect();
    }
    suggestion.estimated_impact =
        f64_field(object, "estimated_impact").map(|impact| impact.clamp(0.0, 1.0));

    Ok(suggestion)
}

fn parse_metrics(object: &Map<String, Value>) -> BTreeMap<String, MetricValue> {
    object
        .iter()
        .filter_map(|(key, value)| metric_value(value).map(|metric| (key.clone(), metric)))
        .collect()
}

fn metric_value(value: &Value) -> Option<MetricValue> {
    match value {
        Value::Bool(flag) => Some(MetricValue::Flag(*flag)),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Some(MetricValue::Integer(integer))
            } else {
                number.as_f64().map(MetricValue::Float)
            }
        }
        Value::String(text) => Some(MetricValue::Text(text.clone())),
        Value::Array(items) => Some(MetricValue::List(
            items.iter().filter_map(metric_value).collect(),
        )),
        _ => None,
    }
}

/// Iterate the entries of an array field, empty when absent or not an array
fn entries<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Value> + 'a {
    object.get(key).and_then(Value::as_array).into_iter().flatten()
}

fn str_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Numeric field tolerant of numbers passed as strings
fn f64_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn usize_field(object: &Map<String, Value>, key: &str) -> Option<usize> {
    match object.get(key)? {
        Value::Number(number) => number.as_u64().map(|n| n as usize),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Enum field parsed case-insensitively, defaulting when absent or unknown
fn enum_field<T: FromStr + Copy>(object: &Map<String, Value>, key: &str, default: T) -> T {
    object
        .get(key)
        .and_then(Value::as_str)
        .and_then(|text| T::from_str(text.trim()).ok())
        .unwrap_or(default)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

/// Result returned when a reply defeats every extraction strategy
fn fallback_result(analysis_type: AnalysisType, raw: &str, err: &ParseError) -> AnalysisResult {
    let mut metrics = BTreeMap::new();
    metrics.insert("parse_error".to_string(), MetricValue::Flag(true));
    metrics.insert(
        "raw_response_len".to_string(),
        MetricValue::Integer(raw.len() as i64),
    );

    AnalysisResult::new(
        analysis_type,
        format!("Analysis reply could not be parsed: {err}"),
        Vec::new(),
        Vec::new(),
        metrics,
        FALLBACK_CONFIDENCE,
    )
}
