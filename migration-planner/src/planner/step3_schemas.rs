//! Step 3: Propose a MongoDB collection for every discovered table

use crate::error::{PlannerError, Result};
use crate::planner::batch::scatter_gather;
use crate::planner::operation::{OperationRunner, WorkItem};
use crate::planner::types::{AnalysisContext, ApplicationOverview, DbTable, SchemaProposal};
use migration_planner_sdk::{log_parallel_complete, log_parallel_start, log_task_complete, log_task_start};

pub const STAGE: usize = 3;

/// One proposal per table of `overview`, in table order.
///
/// Returns an empty list without calling the generator when no tables were found.
pub async fn step3_create_schemas(
    runner: &OperationRunner,
    context: &AnalysisContext,
    overview: &ApplicationOverview,
    max_concurrency: Option<usize>,
) -> Result<Vec<SchemaProposal>> {
    if overview.database_tables.is_empty() {
        return Ok(Vec::new());
    }

    let analyses = context.analyses();
    let tables: Vec<&DbTable> = overview.database_tables.iter().collect();
    log_parallel_start!(overview.database_tables.len(), "schema proposals");

    let proposals = scatter_gather(
        STAGE,
        tables,
        max_concurrency,
        |table, ctx| {
            let analyses = analyses.clone();
            async move {
                log_task_start!(ctx.stage, &table.name, format!("Propose collection for {}", table.name), ctx.total_tasks);

                let item = WorkItem::new(table.name.clone())
                    .bind("analyses", analyses)
                    .bind("schema", table.db_schema.as_str());
                let proposal: SchemaProposal = runner.run(item).await?;

                tracing::info!(table = %table.name, task = ctx.task_number, collection = %proposal.collection_name, "Successfully generated a MongoDB schema");
                log_task_complete!(&table.name, &proposal.collection_name);
                Ok::<_, PlannerError>(proposal)
            }
        },
    )
    .await?;

    log_parallel_complete!(proposals.len(), "schema proposals");
    Ok(proposals)
}
