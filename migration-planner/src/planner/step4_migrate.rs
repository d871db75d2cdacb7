//! Step 4: Generate a replacement for every eligible analyzed file

use std::collections::BTreeSet;

use crate::config::normalize_extension;
use crate::error::{PlannerError, Result};
use crate::planner::batch::scatter_gather;
use crate::planner::operation::{OperationRunner, WorkItem};
use crate::planner::types::{AnalysisContext, AnalyzedFile, FileMigration, MigratedFile};
use migration_planner_sdk::{log_found, log_parallel_complete, log_parallel_start, log_task_complete, log_task_start};

pub const STAGE: usize = 4;

/// Analyzed files whose extension is in `extensions`, in analysis order.
pub fn files_to_migrate<'a>(
    context: &'a AnalysisContext,
    extensions: &BTreeSet<String>,
) -> Vec<&'a AnalyzedFile> {
    context
        .files()
        .iter()
        .filter(|file| extensions.contains(&normalize_extension(&file.file_extension)))
        .collect()
}

pub async fn step4_migrate_files(
    runner: &OperationRunner,
    context: &AnalysisContext,
    extensions: &BTreeSet<String>,
    max_concurrency: Option<usize>,
) -> Result<Vec<MigratedFile>> {
    let eligible = files_to_migrate(context, extensions);
    log_found!(eligible.len(), "files to migrate");
    log_parallel_start!(eligible.len(), "file migrations");

    let migrated = scatter_gather(STAGE, eligible, max_concurrency, |file, ctx| async move {
        log_task_start!(ctx.stage, &file.relative_path, format!("Migrate {}", file.name), ctx.total_tasks);

        let item = WorkItem::new(file.relative_path.clone())
            .bind("analysis", file.analysis.as_str())
            .bind("file_content", file.document.content.as_str());
        let migration: FileMigration = runner.run(item).await?;

        tracing::info!(
            file = %file.relative_path,
            task = ctx.task_number,
            category = %migration.file_category,
            "Successfully generated a new migrated file"
        );
        log_task_complete!(&file.relative_path, &migration.file_category);
        Ok::<_, PlannerError>(MigratedFile::new(migration, file.clone()))
    })
    .await?;

    log_parallel_complete!(migrated.len(), "file migrations");
    Ok(migrated)
}
