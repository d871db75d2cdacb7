//! Migration planning pipeline.
//!
//! ## Module Structure
//!
//! - `types` - Stage outputs and the final report
//! - `operation` - Prompted operations and the template to result type mapping
//! - `structured` - JSON extraction for structured responses
//! - `batch` - Scatter-gather execution used by the concurrent steps
//! - `step1_analyze` - Analyze every repository file
//! - `step2_overview` - Synthesize the application overview
//! - `step3_schemas` - Propose MongoDB collections per table
//! - `step4_migrate` - Generate replacement files
//! - `step5_plan` - Create the implementation plan
//! - `assemble` - Categorize migrated files and merge the report
//! - `audit` - Optional persistence of raw stage outputs
//! - `workflow` - Main workflow orchestration

pub mod assemble;
pub mod audit;
pub mod batch;
pub mod operation;
pub mod step1_analyze;
pub mod step2_overview;
pub mod step3_schemas;
pub mod step4_migrate;
pub mod step5_plan;
pub mod structured;
pub mod types;
pub mod workflow;

pub use workflow::{run_workflow, run_workflow_with, MigrationPlanner, PipelineSettings};
