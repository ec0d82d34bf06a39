use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::AnalysisType;

/// Main error type for Sibyl
#[derive(Debug, Error)]
pub enum SibylError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request validation errors
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Analysis pipeline errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Failed to load config from {path}: {message}")]
    LoadError { path: PathBuf, message: String },

    /// Model chain must list at least one model
    #[error("Model chain is empty; at least one model must be configured")]
    EmptyModelChain,

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Request validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Request carries no files to analyze
    #[error("Request contains no files to analyze")]
    NoFiles,

    /// Request id is blank
    #[error("Request id is empty")]
    MissingId,

    /// A file in the request has no content
    #[error("File '{0}' is empty")]
    EmptyFile(PathBuf),

    /// Combined code size exceeds the configured ceiling
    #[error("Request too large: {len} bytes exceeds the {max} byte limit")]
    Oversized { len: usize, max: usize },

    /// Unrecognized analysis type name
    #[error("Unknown analysis type '{0}' (expected code_quality, architecture, performance, security or all)")]
    UnknownAnalysisType(String),

    /// Unrecognized analysis depth name
    #[error("Unknown analysis depth '{0}' (expected basic, standard, comprehensive or expert)")]
    UnknownDepth(String),
}

/// Analysis pipeline errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Rate limit window is exhausted
    #[error("Rate limit exceeded, request rejected")]
    RateLimited,

    /// No registered analyzer can handle the request
    #[error("No analyzer available for {analysis_type} analysis")]
    NoAnalyzer { analysis_type: AnalysisType },

    /// Backend call failed
    #[error("Backend call failed: {0}")]
    Backend(#[from] BackendError),

    /// Every attempt failed; carries the last error seen
    #[error("Analysis failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<AnalysisError>,
    },
}

/// Model backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend has no API key available
    #[error("Backend is not configured (no API key found)")]
    NotConfigured,

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend answered with a body we could not decode
    #[error("Backend returned an unparseable response: {0}")]
    MalformedResponse(String),

    /// Backend answered but the completion text was missing
    #[error("Backend returned an empty response")]
    EmptyResponse,
}
