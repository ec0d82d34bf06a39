use std::path::{Path, PathBuf};

use crate::cli::{AnalyzeArgs, ModelsArgs, Verbosity};
use crate::commands::{AnalyzeCommand, ModelsCommand};
use crate::config::{ConfigProvider, SibylConfig};
use crate::errors::SibylError;
use crate::output::OutputFormatter;

/// Core application that orchestrates the workflow of Sibyl
pub struct SibylApp<C, O>
where
    C: ConfigProvider,
    O: OutputFormatter + Clone,
{
    config_provider: C,
    output_formatter: O,
    verbosity: Verbosity,
}

impl<C, O> SibylApp<C, O>
where
    C: ConfigProvider,
    O: OutputFormatter + Clone,
{
    /// Create a new instance of SibylApp
    pub fn new(config_provider: C, output_formatter: O) -> Self {
        Self {
            config_provider,
            output_formatter,
            verbosity: Verbosity::default(),
        }
    }

    /// Set the verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Run the analyze command.
    ///
    /// The returned flag is true when the failure gate tripped, so the
    /// caller decides the process exit code.
    pub async fn analyze(&self, args: AnalyzeArgs, paths: Vec<PathBuf>) -> Result<bool, SibylError> {
        // Load configuration
        let config = self.load_config(&paths)?;

        // Create an AnalyzeCommand instance and delegate execution
        let analyze_command = AnalyzeCommand::new(self.output_formatter.clone(), self.verbosity);

        analyze_command.execute(args, paths, &config).await
    }

    /// Run the models command
    pub fn models(&self, args: ModelsArgs, paths: Vec<PathBuf>) -> Result<(), SibylError> {
        // Load configuration
        let config = self.load_config(&paths)?;

        // Create a ModelsCommand instance and delegate execution
        let models_command = ModelsCommand::new(self.output_formatter.clone(), self.verbosity);

        models_command.execute(args, paths, &config)
    }

    // Helper methods

    /// Load configuration from the provided paths
    fn load_config(&self, paths: &[PathBuf]) -> Result<SibylConfig, SibylError> {
        // Use the first path as base directory or current dir if empty
        let base_dir = paths
            .first()
            .map(|p| p.as_path())
            .unwrap_or_else(|| Path::new("."));

        self.config_provider.load_config(base_dir)
    }
}
