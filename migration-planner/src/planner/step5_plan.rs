//! Step 5: Produce the implementation plan
//!
//! The planner sees the original files, their replacements and the proposed
//! collections, so the plan can order the work across all three.

use crate::error::Result;
use crate::loader::Document;
use crate::planner::operation::{OperationRunner, WorkItem};
use crate::planner::types::{ImplementationPlan, MigratedFile, SchemaProposal};
use migration_planner_sdk::log_info;

pub const STAGE: usize = 5;

pub async fn step5_create_plan(
    runner: &OperationRunner,
    documents: &[Document],
    migrated: &[MigratedFile],
    proposals: &[SchemaProposal],
) -> Result<ImplementationPlan> {
    log_info!(
        "Planning {} file replacements and {} collections",
        migrated.len(),
        proposals.len()
    );

    let existing_files: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    let new_files: Vec<String> = migrated.iter().map(|f| f.new_file().to_string()).collect();
    let schemas: Vec<String> = proposals.iter().map(|p| p.mongo_db_schema.clone()).collect();

    let item = WorkItem::new("implementation plan")
        .bind("existing_files", existing_files)
        .bind("new_files", new_files)
        .bind("mongo_db_schemas", schemas);
    let plan: ImplementationPlan = runner.run(item).await?;

    tracing::info!(
        steps = plan.implementation_steps.len(),
        "Successfully generated an implementation plan"
    );
    Ok(plan)
}
