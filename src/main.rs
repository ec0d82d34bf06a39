mod analyzers;
mod app;
mod backend;
mod cache;
mod cli;
mod commands;
mod config;
mod errors;
mod limiter;
mod models;
mod orchestrator;
mod output;
mod parser;
mod prompt;
mod selector;
mod utils;

use clap::Parser;
use cli::{Cli, Commands, Verbosity};
use output::terminal;

#[tokio::main]
async fn main() {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Convert verbosity flag
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::from(cli.verbose)
    };

    // Print a welcome message if not in quiet mode
    if verbosity != Verbosity::Quiet {
        println!("🔮 Sibyl - Prophetic code analysis with AI-powered insight");
    }

    // Create the core components
    let config_provider = match cli.config.clone() {
        Some(path) => config::TomlConfigProvider::with_path(path),
        None => config::TomlConfigProvider::new(),
    };
    let output_formatter = output::PrettyFormatter::with_emoji(!cli.no_emoji);

    // Create the Sibyl app
    let app = app::SibylApp::new(config_provider, output_formatter).with_verbosity(verbosity);

    // Determine which command to run
    let command = cli.command.unwrap_or(Commands::Analyze(cli::AnalyzeArgs {
        analysis_type: "code_quality".to_string(),
        depth: "standard".to_string(),
        rules: Vec::new(),
        project: None,
        format: "pretty".to_string(),
        no_cache: false,
        paths: Vec::new(),
    }));

    let outcome = match command {
        Commands::Analyze(args) => app.analyze(args, cli.paths).await,
        Commands::Models(args) => app.models(args, cli.paths).map(|_| false),
    };

    match outcome {
        // Findings at or above the configured severity fail the run
        Ok(true) => std::process::exit(1),
        Ok(false) => {}
        Err(err) => {
            terminal::error_panel("Sibyl stumbled", &err.to_string(), None);
            std::process::exit(2);
        }
    }
}
