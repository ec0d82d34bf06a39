//! Prompt construction for AI-powered analysis.
//!
//! Templates are plain text with `{{placeholder}}` markers. Rendering
//! never fails outward: when a template is missing or references an
//! unknown placeholder, a minimal hardcoded prompt is used instead so
//! an analysis always has something to send.

use std::collections::HashMap;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::backend::MessageBag;
use crate::models::{AnalysisRequest, AnalysisType};
use crate::utils;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("placeholder regex is valid"));

/// Reply-format contract appended to every prompt
const RESPONSE_CONTRACT: &str = "Respond with a single JSON object using exactly these keys:\n\
{\n\
  \"summary\": string,\n\
  \"issues\": [{\"title\": string, \"description\": string, \"severity\": \"info|low|medium|high|critical\", \"category\": string, \"file\": string, \"line\": number, \"fix\": string}],\n\
  \"suggestions\": [{\"title\": string, \"description\": string, \"type\": string, \"priority\": \"low|medium|high|critical\", \"implementation\": string, \"benefits\": [string]}],\n\
  \"metrics\": object,\n\
  \"confidence\": number between 0 and 1\n\
}";

#[derive(Debug, Error)]
enum PromptError {
    #[error("No template named '{0}'")]
    UnknownTemplate(String),

    #[error("Template '{template}' references unknown placeholder '{placeholder}'")]
    UnknownPlaceholder { template: String, placeholder: String },
}

/// Renders analysis prompts from named templates
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<String, String>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    /// Create an engine with the built-in templates
    pub fn new() -> Self {
        Self {
            templates: default_templates(),
        }
    }

    /// Create an engine with the built-in templates plus overrides.
    ///
    /// An override with a built-in name replaces it; other names are
    /// added as new templates.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut templates = default_templates();
        for (name, template) in overrides {
            templates.insert(name.clone(), template.clone());
        }
        Self { templates }
    }

    /// Render the named template for the request.
    ///
    /// Falls back to a minimal prompt when rendering fails.
    pub fn generate_prompt(&self, template_name: &str, request: &AnalysisRequest) -> String {
        match self.render(template_name, request) {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!("Prompt rendering failed ({err}); using minimal prompt");
                minimal_prompt(template_name, request)
            }
        }
    }

    /// Wrap a rendered prompt in the message pair sent to the backend
    pub fn message_bag(&self, prompt: &str, request: &AnalysisRequest) -> MessageBag {
        MessageBag::new(system_message(request.analysis_type), prompt)
    }

    fn render(&self, name: &str, request: &AnalysisRequest) -> Result<String, PromptError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| PromptError::UnknownTemplate(name.to_string()))?;

        let context = build_context(request);
        let mut missing: Option<String> = None;
        let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            match context.get(key) {
                Some(value) => value.clone(),
                None => {
                    missing.get_or_insert_with(|| key.to_string());
                    String::new()
                }
            }
        });

        if let Some(placeholder) = missing {
            return Err(PromptError::UnknownPlaceholder {
                template: name.to_string(),
                placeholder,
            });
        }

        Ok(rendered.into_owned())
    }
}

/// Values available to template placeholders
fn build_context(request: &AnalysisRequest) -> HashMap<&'static str, String> {
    let code = render_code_block(request);
    let complexity = utils::estimate_complexity(&code);

    let mut context = HashMap::new();
    context.insert("analysis_type", request.analysis_type.to_string());
    context.insert("depth", request.depth.to_string());
    context.insert("project_kind", request.project_kind.clone());
    context.insert("file_count", request.files.len().to_string());
    context.insert("line_count", request.total_line_count().to_string());
    context.insert("code_len", request.total_code_len().to_string());
    context.insert("complexity", format!("{complexity:.1}"));
    context.insert(
        "rules",
        if request.rules.is_empty() {
            "none".to_string()
        } else {
            request.rules.join(", ")
        },
    );
    context.insert("response_contract", RESPONSE_CONTRACT.to_string());
    context.insert("code", code);
    context
}

/// Concatenate request files into one annotated code block
fn render_code_block(request: &AnalysisRequest) -> String {
    let mut block = String::new();
    for (path, content) in &request.files {
        block.push_str(&format!("// file: {}\n", path.display()));
        block.push_str(content);
        if !content.ends_with('\n') {
            block.push('\n');
        }
        block.push('\n');
    }
    block
}

/// Bare-bones prompt used when template rendering fails
fn minimal_prompt(template_name: &str, request: &AnalysisRequest) -> String {
    format!(
        "Perform a {} analysis of the following code. {}\n\n{}",
        template_name.replace('_', " "),
        RESPONSE_CONTRACT,
        render_code_block(request)
    )
}

/// System framing for each analysis type
fn system_message(analysis_type: AnalysisType) -> String {
    let framing = match analysis_type {
        AnalysisType::CodeQuality => {
            "You are a meticulous senior code reviewer. You judge readability, \
             correctness, error handling and test-worthiness without nitpicking style."
        }
        AnalysisType::Architecture => {
            "You are a pragmatic software architect. You judge module boundaries, \
             coupling, layering and how well the structure will absorb change."
        }
        AnalysisType::Performance => {
            "You are a performance engineer. You hunt for wasted work, needless \
             allocation, pathological complexity and blocking calls on hot paths."
        }
        AnalysisType::Security => {
            "You are an application security engineer. You hunt for injection, \
             unsafe input handling, secret leakage and privilege mistakes."
        }
    };

    format!(
        "{framing} Reply with a single JSON object and nothing else: no prose, \
         no markdown fences."
    )
}

/// Built-in templates, one per analysis type
fn default_templates() -> HashMap<String, String> {
    let mut templates = HashMap::new();

    templates.insert(
        AnalysisType::CodeQuality.to_string(),
        "Review the following {{project_kind}} code for quality problems at {{depth}} depth.\n\
         The submission spans {{file_count}} file(s), {{line_count}} lines, approximate \
         complexity {{complexity}}.\n\
         Focus areas: {{rules}}.\n\
         Report naming problems, unclear control flow, missing error handling, dead code \
         and risky duplication. Prefer a few substantial findings over many trivial ones.\n\n\
         {{response_contract}}\n\nCode:\n{{code}}"
            .to_string(),
    );

    templates.insert(
        AnalysisType::Architecture.to_string(),
        "Assess the architecture of the following {{project_kind}} code at {{depth}} depth.\n\
         The submission spans {{file_count}} file(s), {{line_count}} lines.\n\
         Focus areas: {{rules}}.\n\
         Report tangled dependencies, leaky boundaries, missing abstractions and modules \
         carrying too many responsibilities. Suggest concrete restructurings.\n\n\
         {{response_contract}}\n\nCode:\n{{code}}"
            .to_string(),
    );

    templates.insert(
        AnalysisType::Performance.to_string(),
        "Analyze the following {{project_kind}} code for performance problems at {{depth}} \
         depth. The submission spans {{line_count}} lines, approximate complexity \
         {{complexity}}.\n\
         Focus areas: {{rules}}.\n\
         Report needless allocation, repeated work inside loops, unbounded growth, blocking \
         calls and query patterns that will not scale. Estimate impact where you can.\n\n\
         {{response_contract}}\n\nCode:\n{{code}}"
            .to_string(),
    );

    templates.insert(
        AnalysisType::Security.to_string(),
        "Audit the following {{project_kind}} code for security vulnerabilities at {{depth}} \
         depth. The submission spans {{file_count}} file(s), {{line_count}} lines.\n\
         Focus areas: {{rules}}.\n\
         Report injection risks, unsafe deserialization, hardcoded credentials, weak \
         cryptography and missing input validation. Rate severity conservatively high.\n\n\
         {{response_contract}}\n\nCode:\n{{code}}"
            .to_string(),
    );

    templates
}
