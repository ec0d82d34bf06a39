//! Output formatting for Sibyl

pub mod terminal;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::config::OutputConfig;
use crate::models::{AnalysisResult, AnalysisType, Severity, SuggestionPriority};
use crate::orchestrator::BatchOutcomes;
use crate::selector::ModelTier;

/// One row of the model chain listing
#[derive(Debug, Clone, Serialize)]
pub struct ModelListing {
    /// Model identifier
    pub id: String,

    /// Capability tier
    pub tier: ModelTier,

    /// Price per thousand tokens
    pub cost_per_1k_tokens: f64,

    /// Estimated cost for the selected files, when files were given
    pub estimated_cost: Option<f64>,
}

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a single analysis result
    fn format_result(&self, result: &AnalysisResult, config: &OutputConfig) -> String;

    /// Format the outcomes of a batch run
    fn format_batch(&self, outcomes: &BatchOutcomes, config: &OutputConfig) -> String;

    /// Format a closing summary over finished results
    fn format_summary(&self, results: &[&AnalysisResult]) -> String;

    /// Format the model chain listing
    fn format_models(&self, listings: &[ModelListing]) -> String;
}

/// Default implementation that uses pretty formatting with colors
#[derive(Clone)]
pub struct PrettyFormatter {
    /// Whether to use emojis
    use_emoji: bool,
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrettyFormatter {
    /// Create a new PrettyFormatter
    pub fn new() -> Self {
        Self { use_emoji: true }
    }

    /// Create a new PrettyFormatter with emoji control
    pub fn with_emoji(use_emoji: bool) -> Self {
        Self { use_emoji }
    }

    fn emoji(&self, symbol: &'static str) -> &'static str {
        if self.use_emoji {
            symbol
        } else {
            ""
        }
    }

    fn analysis_emoji(&self, analysis_type: AnalysisType) -> &'static str {
        if !self.use_emoji {
            return "";
        }
        match analysis_type {
            AnalysisType::CodeQuality => "✨ ",
            AnalysisType::Architecture => "🏛️ ",
            AnalysisType::Performance => "⚡ ",
            AnalysisType::Security => "🛡️ ",
        }
    }

    fn severity_label(severity: Severity) -> ColoredString {
        match severity {
            Severity::Critical => severity.to_string().red().bold(),
            Severity::High => severity.to_string().red(),
            Severity::Medium => severity.to_string().yellow(),
            Severity::Low => severity.to_string().magenta(),
            Severity::Info => severity.to_string().blue(),
        }
    }

    fn priority_label(priority: SuggestionPriority) -> ColoredString {
        match priority {
            SuggestionPriority::Critical => priority.to_string().red().bold(),
            SuggestionPriority::High => priority.to_string().red(),
            SuggestionPriority::Medium => priority.to_string().yellow(),
            SuggestionPriority::Low => priority.to_string().blue(),
        }
    }
}

impl OutputFormatter for PrettyFormatter {
    fn format_result(&self, result: &AnalysisResult, config: &OutputConfig) -> String {
        let mut output = String::new();

        // Header with a nice separator
        let separator = "━".repeat(60).dimmed();
        output.push_str(&format!("\n{}\n\n", separator));
        output.push_str(&format!(
            "{}{} analysis {}\n",
            self.analysis_emoji(result.analysis_type),
            result.analysis_type.to_string().bold(),
            format!("({:.0}% confidence)", result.confidence * 100.0).dimmed()
        ));
        output.push_str(&format!("{}\n\n", separator));

        output.push_str(&format!("{}\n", result.summary));

        // Issues, most severe first
        if !result.issues.is_empty() {
            output.push_str(&format!(
                "\n{}{}\n",
                self.emoji("🔍 "),
                format!("Issues ({})", result.issues.len()).bold()
            ));

            let mut issues: Vec<_> = result.issues.iter().collect();
            issues.sort_by(|a, b| b.severity.cmp(&a.severity));

            for issue in issues.iter().take(config.max_issues) {
                let marker = if self.use_emoji {
                    issue.severity.emoji()
                } else {
                    "-"
                };
                output.push_str(&format!(
                    "\n  {} {} [{}]\n",
                    marker,
                    issue.title.bold(),
                    Self::severity_label(issue.severity)
                ));

                // Location line, when we have one
                if let Some(file) = &issue.file {
                    let shown = if config.use_relative_paths {
                        crate::utils::display_path(file)
                    } else {
                        file.display().to_string()
                    };
                    let mut location = shown;
                    if let Some(line) = issue.line {
                        location.push_str(&format!(":{}", line));
                        if let Some(column) = issue.column {
                            location.push_str(&format!(":{}", column));
                        }
                    }
                    if let Some(rule) = &issue.rule {
                        location.push_str(&format!(" ({})", rule));
                    }
                    output.push_str(&format!("     {}\n", location.dimmed()));
                }

                output.push_str(&format!("     {}\n", issue.description));

                if config.show_code_snippets {
                    if let Some(snippet) = &issue.snippet {
                        output.push_str(&format!("     ┃ {}\n", snippet.dimmed()));
                    }
                }

                if config.show_fixes {
                    if let Some(fix) = &issue.fix {
                        output.push_str(&format!(
                            "     {}{}\n",
                            self.emoji("💡 "),
                            format!("Fix: {}", fix).green()
                        ));
                    }
                }
            }

            if result.issues.len() > config.max_issues {
                output.push_str(&format!(
                    "\n  … and {} more issues\n",
                    result.issues.len() - config.max_issues
                ));
            }
        } else {
            output.push_str(&format!(
                "\n  {} {}\n",
                self.emoji("✨"),
                "No issues detected!".green()
            ));
        }

        // Suggestions
        if !result.suggestions.is_empty() {
            output.push_str(&format!(
                "\n{}{}\n",
                self.emoji("🌱 "),
                format!("Suggestions ({})", result.suggestions.len()).bold()
            ));

            for suggestion in &result.suggestions {
                output.push_str(&format!(
                    "\n  • {} [{}]\n",
                    suggestion.title.bold(),
                    Self::priority_label(suggestion.priority)
                ));
                output.push_str(&format!("     {}\n", suggestion.description));
                if let Some(implementation) = &suggestion.implementation {
                    output.push_str(&format!("     {}\n", implementation.dimmed()));
                }
            }
        }

        // Compact metrics line
        if !result.metrics.is_empty() {
            let rendered: Vec<_> = result
                .metrics
                .iter()
                .map(|(name, value)| format!("{}={}", name, render_metric(value)))
                .collect();
            output.push_str(&format!(
                "\n{}{}\n",
                self.emoji("📊 "),
                format!("Metrics: {}", rendered.join(", ")).dimmed()
            ));
        }

        output
    }

    fn format_batch(&self, outcomes: &BatchOutcomes, config: &OutputConfig) -> String {
        let mut output = String::new();

        for (index, outcome) in outcomes {
            match outcome {
                Ok(result) => output.push_str(&self.format_result(result, config)),
                Err(err) => {
                    let separator = "━".repeat(60).dimmed();
                    output.push_str(&format!("\n{}\n\n", separator));
                    output.push_str(&format!(
                        "  {} Analysis {} failed: {}\n",
                        self.emoji("❌"),
                        index + 1,
                        err.to_string().red()
                    ));
                }
            }
        }

        output
    }

    fn format_summary(&self, results: &[&AnalysisResult]) -> String {
        // Count issues by severity
        let mut critical_count = 0;
        let mut high_count = 0;
        let mut medium_count = 0;
        let mut low_count = 0;
        let mut info_count = 0;
        let mut suggestion_count = 0;

        // Count issues by analysis type
        let mut type_issues = std::collections::HashMap::new();

        // Count files with issues
        let mut unique_files = std::collections::HashSet::new();

        for result in results {
            for issue in &result.issues {
                match issue.severity {
                    Severity::Critical => critical_count += 1,
                    Severity::High => high_count += 1,
                    Severity::Medium => medium_count += 1,
                    Severity::Low => low_count += 1,
                    Severity::Info => info_count += 1,
                }

                if let Some(file) = &issue.file {
                    unique_files.insert(file.clone());
                }
            }
            suggestion_count += result.suggestions.len();

            let issue_count = result.issues.len();
            if issue_count > 0 {
                type_issues
                    .entry(result.analysis_type)
                    .and_modify(|count| *count += issue_count)
                    .or_insert(issue_count);
            }
        }

        let total_issues = critical_count + high_count + medium_count + low_count + info_count;

        // Determine overall status
        let (status_icon, status_text) = if critical_count > 0 {
            ("💀", "Critical issues found".red().bold())
        } else if high_count > 0 {
            ("🔥", "Serious issues found".red().bold())
        } else if medium_count > 0 {
            ("⚠️", "Issues found".yellow().bold())
        } else if low_count > 0 {
            ("📝", "Minor issues found".blue().bold())
        } else if total_issues == 0 {
            ("✨", "Perfect! No issues found".green().bold())
        } else {
            ("💡", "Only informational notes".green().bold())
        };
        let status_icon = if self.use_emoji { status_icon } else { "" };

        // Create the summary header with a nice separator
        let separator = "━".repeat(80).dimmed();
        let mut output = format!("\n\n{}\n\n  {} {}\n\n", separator, status_icon, status_text);

        // Create a detailed breakdown with pretty colors
        let mut counts = Vec::new();

        if critical_count > 0 {
            counts.push(format!("{} {}", critical_count, "critical".red().bold()));
        }

        if high_count > 0 {
            counts.push(format!("{} {}", high_count, "high".red()));
        }

        if medium_count > 0 {
            counts.push(format!("{} {}", medium_count, "medium".yellow()));
        }

        if low_count > 0 {
            counts.push(format!("{} {}", low_count, "low".magenta()));
        }

        if info_count > 0 {
            counts.push(format!("{} {}", info_count, "info".blue()));
        }

        if !counts.is_empty() {
            output.push_str(&format!(
                "  {}Found: {}\n",
                self.emoji("📊 "),
                counts.join(", ")
            ));
            output.push_str(&format!(
                "  {}Affected: {} files\n",
                self.emoji("📁 "),
                unique_files.len()
            ));
        }

        if suggestion_count > 0 {
            output.push_str(&format!(
                "  {}Suggestions: {}\n",
                self.emoji("🌱 "),
                suggestion_count
            ));
        }

        // Add per-analysis breakdown
        if !type_issues.is_empty() {
            output.push_str(&format!("\n  {}Breakdown by analysis:\n", self.emoji("🔍 ")));

            // Sort analyses by number of issues (descending)
            let mut types: Vec<_> = type_issues.iter().collect();
            types.sort_by(|a, b| b.1.cmp(a.1));

            for (analysis_type, count) in types {
                let percentage = (*count as f64 / total_issues as f64 * 100.0).round() as usize;
                output.push_str(&format!(
                    "    {}{} - {} issues ({}%)\n",
                    self.analysis_emoji(*analysis_type),
                    analysis_type.to_string().bold(),
                    count,
                    percentage
                ));
            }
        }

        // Add final separator with more space
        output.push_str(&format!("\n{}\n", separator));

        output
    }

    fn format_models(&self, listings: &[ModelListing]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}{}\n\n",
            self.emoji("🔮 "),
            "Model chain (best first):".bold()
        ));

        for (position, listing) in listings.iter().enumerate() {
            let tier_icon = if self.use_emoji {
                match listing.tier {
                    ModelTier::Premium => "🏆 ",
                    ModelTier::Standard => "🎯 ",
                    ModelTier::Economy => "💰 ",
                }
            } else {
                ""
            };

            output.push_str(&format!(
                "  {}. {}{} {} ${:.4}/1K tokens",
                position + 1,
                tier_icon,
                listing.id.bold(),
                format!("[{}]", listing.tier).dimmed(),
                listing.cost_per_1k_tokens
            ));

            if let Some(cost) = listing.estimated_cost {
                output.push_str(&format!(" {}", format!("(est. ${:.4})", cost).green()));
            }

            output.push('\n');
        }

        output
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JsonFormatter
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &AnalysisResult, _config: &OutputConfig) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_batch(&self, outcomes: &BatchOutcomes, _config: &OutputConfig) -> String {
        let entries: Vec<_> = outcomes
            .iter()
            .map(|(index, outcome)| match outcome {
                Ok(result) => serde_json::json!({
                    "index": index,
                    "ok": true,
                    "result": result,
                }),
                Err(err) => serde_json::json!({
                    "index": index,
                    "ok": false,
                    "error": err.to_string(),
                }),
            })
            .collect();

        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_summary(&self, results: &[&AnalysisResult]) -> String {
        let mut critical_count = 0;
        let mut high_count = 0;
        let mut issue_count = 0;
        let mut suggestion_count = 0;

        for result in results {
            for issue in &result.issues {
                match issue.severity {
                    Severity::Critical => critical_count += 1,
                    Severity::High => high_count += 1,
                    _ => {}
                }
                issue_count += 1;
            }
            suggestion_count += result.suggestions.len();
        }

        let summary = serde_json::json!({
            "success": critical_count == 0 && high_count == 0,
            "analysis_count": results.len(),
            "issue_count": issue_count,
            "critical_count": critical_count,
            "high_count": high_count,
            "suggestion_count": suggestion_count,
        });

        serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_models(&self, listings: &[ModelListing]) -> String {
        serde_json::to_string_pretty(listings).unwrap_or_else(|_| "[]".to_string())
    }
}

fn render_metric(value: &crate::models::MetricValue) -> String {
    use crate::models::MetricValue;
    match value {
        MetricValue::Flag(flag) => flag.to_string(),
        MetricValue::Integer(number) => number.to_string(),
        MetricValue::Float(number) => format!("{:.2}", number),
        MetricValue::Text(text) => text.clone(),
        MetricValue::List(values) => {
            let rendered: Vec<_> = values.iter().map(render_metric).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}
