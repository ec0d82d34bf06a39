// Integration tests for the sibyl crate
// Each test module should be publicly declared here

mod analyzer_tests;
mod cache_tests;
mod orchestrator_tests;
