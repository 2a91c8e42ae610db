//! Operator tooling for switching LLM provider presets in a research
//! agent's `.env` file and smoke-testing the resulting configuration.

pub mod cli;
pub mod config;
pub mod envfile;
pub mod error;
pub mod llm;
pub mod presets;
