//! Error types for the migration planner.
//!
//! Every failure is fatal to the run. Library code returns [`PlannerError`];
//! the binary wraps it in `anyhow` for reporting.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::GenerationError;
use crate::loader::LoadError;
use crate::templates::{TemplateError, TemplateId};

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Invalid or missing run parameters, detected before the pipeline starts.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The input repository could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The LLM client or its response cache could not be set up.
    #[error("Failed to initialize the LLM client: {0}")]
    Client(#[from] GenerationError),

    /// A single prompted operation failed.
    #[error("{template} operation failed for {context}: {source}")]
    Operation {
        template: TemplateId,
        context: String,
        #[source]
        source: OperationCause,
    },

    /// The analysis stage produced nothing to plan from.
    #[error("Couldn't analyze requested files: the analysis stage produced no results")]
    EmptyAnalysis,

    /// A report or state file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Identifying context of an operation failure (file, table or plan).
    pub fn operation_context(&self) -> Option<&str> {
        match self {
            PlannerError::Operation { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Underlying cause of a failed prompted operation.
#[derive(Debug, Error)]
pub enum OperationCause {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("response did not match the {schema} schema: {source}")]
    Validation {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
