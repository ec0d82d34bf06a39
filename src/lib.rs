//! 🔮 Sibyl - Prophetic code analysis with AI-powered insight
//!
//! Sibyl asks large language models pointed questions about your code
//! and distills their answers into structured findings, with built-in
//! heuristics standing by for when no model is reachable.

pub mod analyzers;
pub mod app;
pub mod backend;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod limiter;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod prompt;
pub mod selector;
pub mod utils;
