// Run configuration
pub mod config;

// Error types
pub mod error;

// Repository file loading
pub mod loader;

// Prompt templates
pub mod templates;

// Generation backends
pub mod llm;

// Pipeline stages and orchestration
pub mod planner;

// Markdown / JSON output
pub mod report;

// Command-line interface
pub mod cli;

pub use error::{PlannerError, Result};
