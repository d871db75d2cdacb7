//! Step 2: Synthesize an application overview from all file analyses

use crate::error::Result;
use crate::planner::operation::{OperationRunner, WorkItem};
use crate::planner::types::{AnalysisContext, ApplicationOverview};
use migration_planner_sdk::{log_found, log_info};

pub const STAGE: usize = 2;

pub async fn step2_create_overview(
    runner: &OperationRunner,
    context: &AnalysisContext,
) -> Result<ApplicationOverview> {
    log_info!("Summarizing {} file analyses", context.len());

    let item = WorkItem::new("application overview").bind("analyses", context.analyses());
    let overview: ApplicationOverview = runner.run(item).await?;

    tracing::info!(
        tables = overview.database_tables.len(),
        entities = overview.db_entities.len(),
        apis = overview.api_definitions.len(),
        "Successfully generated an application overview"
    );
    log_found!(overview.database_tables.len(), "database tables");
    Ok(overview)
}
