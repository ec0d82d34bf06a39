use std::path::PathBuf;

use crate::cli::{ModelsArgs, Verbosity};
use crate::config::SibylConfig;
use crate::errors::{SibylError, ValidationError};
use crate::models::{AnalysisDepth, AnalysisRequest, AnalysisType};
use crate::output::{JsonFormatter, ModelListing, OutputFormatter};
use crate::selector::ModelSelector;
use crate::utils::{self, file_selection};

/// Command handler for the models command
pub struct ModelsCommand<O>
where
    O: OutputFormatter,
{
    output_formatter: O,
    verbosity: Verbosity,
}

impl<O> ModelsCommand<O>
where
    O: OutputFormatter,
{
    /// Create a new models command handler
    pub fn new(output_formatter: O, verbosity: Verbosity) -> Self {
        Self {
            output_formatter,
            verbosity,
        }
    }

    /// Execute the models command.
    ///
    /// Lists the configured chain; when paths are given, each model row
    /// also carries the estimated cost of analyzing those files.
    pub fn execute(
        &self,
        args: ModelsArgs,
        paths: Vec<PathBuf>,
        config: &SibylConfig,
    ) -> Result<(), SibylError> {
        let depth = parse_depth(&args.depth)?;
        let selector = ModelSelector::new(config.models.clone(), config.depths.clone());

        // Build a throwaway request over the given files so estimates
        // reflect real code volume
        let estimate_request = if args.paths.is_empty() && paths.is_empty() {
            None
        } else {
            let all_paths = if args.paths.is_empty() {
                paths
            } else {
                args.paths.clone()
            };

            let files = file_selection::collect_source_files(
                &all_paths,
                &config.general.exclude,
                config.general.respect_gitignore,
            )?;
            let contents = utils::read_files(&files)?;

            if contents.is_empty() {
                None
            } else {
                Some(AnalysisRequest::new(AnalysisType::CodeQuality, contents).with_depth(depth))
            }
        };

        let listings: Vec<ModelListing> = selector
            .chain()
            .iter()
            .map(|spec| ModelListing {
                id: spec.id.clone(),
                tier: spec.tier,
                cost_per_1k_tokens: spec.cost_per_1k_tokens,
                estimated_cost: estimate_request
                    .as_ref()
                    .map(|request| selector.estimate_cost(request, &spec.id)),
            })
            .collect();

        if args.format == "json" {
            let json_formatter = JsonFormatter::new();
            println!("{}", json_formatter.format_models(&listings));
        } else {
            if let Some(request) = &estimate_request {
                if self.verbosity >= Verbosity::Normal {
                    println!(
                        "📂 Estimating against {} files ({} bytes of code, {} depth)\n",
                        request.files.len(),
                        request.total_code_len(),
                        request.depth
                    );
                }
            }
            println!("{}", self.output_formatter.format_models(&listings));
        }

        Ok(())
    }
}

fn parse_depth(raw: &str) -> Result<AnalysisDepth, ValidationError> {
    raw.parse::<AnalysisDepth>()
        .map_err(|_| ValidationError::UnknownDepth(raw.to_string()))
}
