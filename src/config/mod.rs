//! Configuration management for Sibyl

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigError, SibylError};
use crate::models::{AnalysisDepth, Severity};
use crate::selector::ModelPolicy;

/// Configuration provider trait
pub trait ConfigProvider {
    /// Load configuration starting from the given directory
    fn load_config(&self, base_dir: &Path) -> Result<SibylConfig, SibylError>;
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// How many times one analysis may be attempted before giving up
    pub max_attempts: u32,

    /// How long cached results stay valid, in seconds
    pub cache_ttl_secs: u64,

    /// Results at or below this confidence are not cached
    pub min_cache_confidence: f64,

    /// Exit non-zero when issues reach this severity
    pub fail_severity: Severity,

    /// Honor .gitignore files when collecting sources
    pub respect_gitignore: bool,

    /// Glob patterns to exclude from collection
    pub exclude: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cache_ttl_secs: 3600,
            min_cache_confidence: 0.7,
            fail_severity: Severity::High,
            respect_gitignore: true,
            exclude: Vec::new(),
        }
    }
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "SIBYL_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Per-depth completion tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthSettings {
    /// Sampling temperature
    pub temperature: f64,

    /// Reply length ceiling in tokens
    pub max_tokens: u32,

    /// Tokens the prompt scaffolding adds on top of the code itself
    pub prompt_overhead_tokens: u32,
}

impl Default for DepthSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 2048,
            prompt_overhead_tokens: 500,
        }
    }
}

/// Completion tuning for each analysis depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthProfiles {
    /// Settings for basic depth
    pub basic: DepthSettings,

    /// Settings for standard depth
    pub standard: DepthSettings,

    /// Settings for comprehensive depth
    pub comprehensive: DepthSettings,

    /// Settings for expert depth
    pub expert: DepthSettings,
}

impl Default for DepthProfiles {
    fn default() -> Self {
        Self {
            basic: DepthSettings {
                temperature: 0.3,
                max_tokens: 1024,
                prompt_overhead_tokens: 200,
            },
            standard: DepthSettings {
                temperature: 0.2,
                max_tokens: 2048,
                prompt_overhead_tokens: 500,
            },
            comprehensive: DepthSettings {
                temperature: 0.2,
                max_tokens: 3072,
                prompt_overhead_tokens: 1000,
            },
            expert: DepthSettings {
                temperature: 0.1,
                max_tokens: 4096,
                prompt_overhead_tokens: 2000,
            },
        }
    }
}

impl DepthProfiles {
    /// Settings for the given depth
    pub fn for_depth(&self, depth: AnalysisDepth) -> &DepthSettings {
        match depth {
            AnalysisDepth::Basic => &self.basic,
            AnalysisDepth::Standard => &self.standard,
            AnalysisDepth::Comprehensive => &self.comprehensive,
            AnalysisDepth::Expert => &self.expert,
        }
    }
}

/// Rate limiting and request size ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Analysis requests allowed per minute (0 disables the limit)
    pub requests_per_minute: u32,

    /// Largest combined code size accepted, in bytes
    pub max_request_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 0,
            max_request_bytes: 1024 * 1024,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Show offending code snippets
    pub show_code_snippets: bool,

    /// Show suggested fixes
    pub show_fixes: bool,

    /// Max issues to show per result
    pub max_issues: usize,

    /// Use relative paths in output
    pub use_relative_paths: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_code_snippets: true,
            show_fixes: true,
            max_issues: usize::MAX,
            use_relative_paths: true,
        }
    }
}

/// Main configuration for Sibyl
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SibylConfig {
    /// General configuration
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Model chain and selection thresholds
    #[serde(default)]
    pub models: ModelPolicy,

    /// Per-depth completion tuning
    #[serde(default)]
    pub depths: DepthProfiles,

    /// Prompt template overrides keyed by template name
    #[serde(default)]
    pub templates: HashMap<String, String>,

    /// Rate limiting and size ceilings
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl SibylConfig {
    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.chain.is_empty() {
            return Err(ConfigError::EmptyModelChain);
        }
        Ok(())
    }
}

/// TOML configuration provider
#[derive(Debug, Clone, Default)]
pub struct TomlConfigProvider {
    /// When set, load exactly this file instead of searching
    explicit_path: Option<PathBuf>,
}

impl TomlConfigProvider {
    /// Create a new TOML configuration provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a specific config file instead of searching upward
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            explicit_path: Some(path),
        }
    }

    fn load_file(&self, path: &Path) -> Result<SibylConfig, SibylError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::LoadError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let config: SibylConfig = toml::from_str(&content).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn load_config(&self, base_dir: &Path) -> Result<SibylConfig, SibylError> {
        if let Some(path) = &self.explicit_path {
            return self.load_file(path);
        }

        // Look for .sibyl.toml or sibyl.toml in the given directory and parents
        let mut current_dir = Some(base_dir);

        while let Some(dir) = current_dir {
            for name in [".sibyl.toml", "sibyl.toml"] {
                let config_path = dir.join(name);
                if config_path.exists() {
                    return self.load_file(&config_path);
                }
            }

            // Move up to parent directory
            current_dir = dir.parent();
        }

        // No config found, return defaults
        Ok(SibylConfig::default())
    }
}
