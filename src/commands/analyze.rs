use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::backend::HttpChatBackend;
use crate::cache::MemoryCache;
use crate::cli::{AnalyzeArgs, Verbosity};
use crate::config::SibylConfig;
use crate::errors::{SibylError, ValidationError};
use crate::limiter::FixedWindowLimiter;
use crate::models::{AnalysisDepth, AnalysisRequest, AnalysisResult, AnalysisType};
use crate::orchestrator::{AnalysisOrchestrator, BatchOutcomes};
use crate::output::{terminal, JsonFormatter, OutputFormatter};
use crate::selector::ModelSelector;
use crate::utils::{self, file_selection};

/// Command handler for the analyze command
pub struct AnalyzeCommand<O>
where
    O: OutputFormatter,
{
    output_formatter: O,
    verbosity: Verbosity,
}

impl<O> AnalyzeCommand<O>
where
    O: OutputFormatter,
{
    /// Create a new analyze command handler
    pub fn new(output_formatter: O, verbosity: Verbosity) -> Self {
        Self {
            output_formatter,
            verbosity,
        }
    }

    /// Execute the analyze command.
    ///
    /// Returns whether the failure gate tripped, so the binary can exit
    /// non-zero without treating findings as an error.
    pub async fn execute(
        &self,
        args: AnalyzeArgs,
        paths: Vec<PathBuf>,
        config: &SibylConfig,
    ) -> Result<bool, SibylError> {
        // Clone paths from args to avoid ownership issues
        let args_paths = args.paths.clone();

        // Combine paths from the Cli struct and AnalyzeArgs
        let all_paths = if args_paths.is_empty() {
            if paths.is_empty() {
                // If no paths provided at all, use current directory
                vec![PathBuf::from(".")]
            } else {
                paths.clone()
            }
        } else {
            args_paths
        };

        // Reject bad type/depth names before any file work happens
        let analysis_types = parse_analysis_types(&args.analysis_type)?;
        let depth = parse_depth(&args.depth)?;

        let pretty_output = args.format != "json";

        // Gather candidate files behind a spinner; walking a big tree
        // can take a moment
        let spinner = if self.verbosity >= Verbosity::Normal && pretty_output {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.magenta} {msg}")
                    .unwrap(),
            );
            pb.set_message("Gathering source files...");
            pb.enable_steady_tick(Duration::from_millis(80));
            Some(pb)
        } else {
            None
        };

        let files = file_selection::collect_source_files(
            &all_paths,
            &config.general.exclude,
            config.general.respect_gitignore,
        )?;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if files.is_empty() {
            println!("⚠️ No source files found in the given paths.");
            return Ok(false);
        }

        let contents = utils::read_files(&files)?;
        if contents.is_empty() {
            println!("⚠️ No readable source files found in the given paths.");
            return Ok(false);
        }

        if self.verbosity >= Verbosity::Normal && pretty_output {
            println!("📂 Found {} files to analyze", contents.len());

            if self.verbosity >= Verbosity::Verbose {
                for file in contents.keys() {
                    println!("  - {}", file.display());
                }
            }
        }

        // One request per analysis type over the same files
        let mut requests = Vec::new();
        for analysis_type in analysis_types {
            let mut request =
                AnalysisRequest::new(analysis_type, contents.clone()).with_depth(depth);
            if !args.rules.is_empty() {
                request = request.with_rules(args.rules.clone());
            }
            if let Some(project) = &args.project {
                request = request.with_project_kind(project.clone());
            }
            requests.push(request);
        }

        if self.verbosity >= Verbosity::Verbose && pretty_output {
            println!("{}", terminal::section_header("Divination Plan"));
            for request in &requests {
                println!(
                    "  {} · {} files · {} depth · {} bytes",
                    request.analysis_type,
                    request.files.len(),
                    request.depth,
                    request.total_code_len()
                );
            }
            println!("{}", terminal::divider());
        }

        // Assemble the analysis pipeline from configuration
        let backend = Arc::new(HttpChatBackend::from_config(&config.backend));
        let registry = crate::analyzers::AnalyzerRegistry::with_default_analyzers(backend, config);
        let selector = ModelSelector::new(config.models.clone(), config.depths.clone());
        let cache = MemoryCache::new();
        let limiter = FixedWindowLimiter::per_minute(config.limits.requests_per_minute);

        // --no-cache keeps the pipeline intact but expires entries at once
        let cache_ttl = if args.no_cache {
            Duration::ZERO
        } else {
            Duration::from_secs(config.general.cache_ttl_secs)
        };

        let orchestrator = AnalysisOrchestrator::new(registry, selector, cache, limiter)
            .with_max_attempts(config.general.max_attempts)
            .with_cache_ttl(cache_ttl)
            .with_min_cache_confidence(config.general.min_cache_confidence)
            .with_max_request_bytes(config.limits.max_request_bytes);

        let outcomes = if self.verbosity >= Verbosity::Normal && pretty_output {
            self.run_with_display(&orchestrator, &requests).await
        } else {
            orchestrator.analyze_batch(&requests).await
        };

        // Print the results
        if args.format == "json" {
            let json_formatter = JsonFormatter::new();
            println!("{}", json_formatter.format_batch(&outcomes, &config.output));
        } else {
            println!(
                "{}",
                self.output_formatter.format_batch(&outcomes, &config.output)
            );

            let finished: Vec<&AnalysisResult> = outcomes
                .values()
                .filter_map(|outcome| outcome.as_ref().ok())
                .collect();

            if !finished.is_empty() {
                println!("{}", self.output_formatter.format_summary(&finished));
            }
        }

        // Failure gate: findings at or above the configured severity
        let gate = config.general.fail_severity;
        let tripped = outcomes
            .values()
            .any(|outcome| matches!(outcome, Ok(result) if result.has_issues_at_or_above(gate)));

        Ok(tripped)
    }

    /// Run requests one by one, narrating progress with spinners
    async fn run_with_display(
        &self,
        orchestrator: &AnalysisOrchestrator<MemoryCache, FixedWindowLimiter>,
        requests: &[AnalysisRequest],
    ) -> BatchOutcomes {
        let mut status_display = terminal::ScryingDisplay::new();

        let mut spinner_indices = Vec::new();
        for request in requests {
            let detail = format!("{} files, {} depth", request.files.len(), request.depth);
            let index =
                status_display.add_analysis_status(&request.analysis_type.to_string(), &detail);
            spinner_indices.push(index);
        }

        let mut outcomes = BatchOutcomes::new();
        let mut total_issues = 0;

        for (index, request) in requests.iter().enumerate() {
            let outcome = orchestrator.analyze(request).await;

            match &outcome {
                Ok(result) => {
                    let issues_count = result.issues.len();
                    total_issues += issues_count;

                    if issues_count > 0 {
                        status_display.finish_spinner(
                            spinner_indices[index],
                            format!("{} issues found", issues_count),
                        );
                    } else {
                        status_display
                            .finish_spinner(spinner_indices[index], "no issues found".to_string());
                    }
                }
                Err(err) => {
                    debug!("Analysis {} failed: {}", request.id, err);
                    status_display
                        .finish_spinner(spinner_indices[index], "analysis failed".to_string());
                }
            }

            outcomes.insert(index, outcome);
        }

        // Finish the status display
        status_display.finish(total_issues);

        // A moment to appreciate the UI
        std::thread::sleep(std::time::Duration::from_millis(300));

        outcomes
    }
}

/// Expand the type flag into concrete analysis types
fn parse_analysis_types(raw: &str) -> Result<Vec<AnalysisType>, ValidationError> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(enum_iterator::all::<AnalysisType>().collect());
    }
    raw.parse::<AnalysisType>()
        .map(|analysis_type| vec![analysis_type])
        .map_err(|_| ValidationError::UnknownAnalysisType(raw.to_string()))
}

fn parse_depth(raw: &str) -> Result<AnalysisDepth, ValidationError> {
    raw.parse::<AnalysisDepth>()
        .map_err(|_| ValidationError::UnknownDepth(raw.to_string()))
}
