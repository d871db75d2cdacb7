//! Step 1: Analyze every repository file
//!
//! One raw-text operation per document, all submitted at once. The analyses
//! come back as a fresh [`AnalysisContext`] owned by the calling run.

use crate::error::{PlannerError, Result};
use crate::loader::Document;
use crate::planner::batch::scatter_gather;
use crate::planner::operation::{FileAnalysis, OperationRunner, WorkItem};
use crate::planner::types::{AnalysisContext, AnalyzedFile};
use migration_planner_sdk::{log_parallel_complete, log_parallel_start, log_task_complete, log_task_start};

pub const STAGE: usize = 1;

/// Analyze `documents` concurrently.
///
/// Fails on the first analysis error; no partial context is returned.
pub async fn step1_analyze_files(
    runner: &OperationRunner,
    documents: &[Document],
    max_concurrency: Option<usize>,
) -> Result<AnalysisContext> {
    log_parallel_start!(documents.len(), "file analyses");

    let files = scatter_gather(STAGE, documents.to_vec(), max_concurrency, |document, ctx| async move {
        let task_id = document.source.display().to_string();
        log_task_start!(ctx.stage, &task_id, format!("Analyze {}", document.file_name()), ctx.total_tasks);

        let item = WorkItem::new(task_id.clone()).bind("file_content", document.content.as_str());
        let FileAnalysis(analysis) = runner.run(item).await?;

        tracing::info!(file = %task_id, task = ctx.task_number, total = ctx.total_tasks, "Successfully analyzed file with LLM");
        log_task_complete!(&task_id, format!("{} chars of analysis", analysis.len()));
        Ok::<_, PlannerError>(AnalyzedFile::new(document, analysis))
    })
    .await?;

    log_parallel_complete!(files.len(), "file analyses");
    Ok(AnalysisContext::new(files))
}
