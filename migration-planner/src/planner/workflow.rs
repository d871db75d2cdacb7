//! Main workflow orchestration for the migration planner.
//!
//! This module coordinates the execution of all 5 steps:
//! 1. Analyze every repository file
//! 2. Synthesize an application overview
//! 3. Propose MongoDB collections for the discovered tables
//! 4. Migrate the eligible files
//! 5. Create the implementation plan
//!
//! The step results are then merged into one [`Report`].

use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::llm::{CachedGenerator, Generator, OpenAiClient};
use crate::loader::{load_documents, Document};
use crate::planner::{
    assemble::assemble_report,
    audit::AuditSink,
    operation::OperationRunner,
    step1_analyze::{self, step1_analyze_files},
    step2_overview::{self, step2_create_overview},
    step3_schemas::{self, step3_create_schemas},
    step4_migrate::{self, step4_migrate_files},
    step5_plan::{self, step5_create_plan},
    types::Report,
};
use crate::report;
use crate::templates::TemplateStore;
use migration_planner_sdk::{
    log_file_saved, log_info, log_phase_complete_console, log_phase_start_console,
    log_stage_complete, log_stage_failed, log_stage_start, log_state_file,
};

pub const TOTAL_STAGES: usize = 5;

/// Pipeline settings derived from the run configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    /// Extensions (lower-case, no dot) of the files to migrate
    pub extensions_to_migrate: BTreeSet<String>,

    /// Upper bound on concurrent operations within a stage
    pub max_concurrency: Option<usize>,

    /// Where to persist raw stage outputs, if anywhere
    pub audit: Option<AuditSink>,
}

impl From<&PlannerConfig> for PipelineSettings {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            extensions_to_migrate: config.extensions_to_migrate(),
            max_concurrency: config.max_concurrency,
            audit: config
                .log_llm_responses
                .then(|| AuditSink::new(&config.llm_responses_dir)),
        }
    }
}

/// Runs the five stages for one repository.
///
/// Every call to [`create_migration_plan`](Self::create_migration_plan) starts
/// from scratch, so nothing from a failed run is visible to the next one.
pub struct MigrationPlanner {
    runner: OperationRunner,
    settings: PipelineSettings,
}

impl MigrationPlanner {
    pub fn new(
        generator: Arc<dyn Generator>,
        templates: TemplateStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            runner: OperationRunner::new(generator, templates),
            settings,
        }
    }

    pub async fn create_migration_plan(&self, documents: &[Document]) -> Result<Report> {
        let settings = &self.settings;
        let runner = &self.runner;

        let analysis = timed_stage(
            step1_analyze::STAGE,
            "File Analysis",
            &format!("Analyzing {} repository files with LLM", documents.len()),
            step1_analyze_files(runner, documents, settings.max_concurrency),
        )
        .await?;
        if analysis.is_empty() {
            tracing::error!("Couldn't analyze requested files");
            return Err(PlannerError::EmptyAnalysis);
        }
        self.audit(|sink| sink.record_analyses(step1_analyze::STAGE, &analysis));

        let overview = timed_stage(
            step2_overview::STAGE,
            "Application Overview",
            "Generating an application overview with LLM",
            step2_create_overview(runner, &analysis),
        )
        .await?;
        self.audit(|sink| sink.record_overview(step2_overview::STAGE, &overview));

        let proposals = if overview.database_tables.is_empty() {
            log_info!("No database tables found, skipping schema proposals");
            Vec::new()
        } else {
            timed_stage(
                step3_schemas::STAGE,
                "MongoDB Schemas",
                "Generating MongoDB schemas with LLM",
                step3_create_schemas(runner, &analysis, &overview, settings.max_concurrency),
            )
            .await?
        };
        self.audit(|sink| sink.record_schemas(step3_schemas::STAGE, &proposals));

        let migrated = timed_stage(
            step4_migrate::STAGE,
            "File Migration",
            "Generating migrated files with LLM",
            step4_migrate_files(
                runner,
                &analysis,
                &settings.extensions_to_migrate,
                settings.max_concurrency,
            ),
        )
        .await?;
        self.audit(|sink| sink.record_migrated_files(step4_migrate::STAGE, &migrated));

        let plan = timed_stage(
            step5_plan::STAGE,
            "Implementation Plan",
            "Generating an implementation plan with LLM",
            step5_create_plan(runner, documents, &migrated, &proposals),
        )
        .await?;
        self.audit(|sink| sink.record_plan(step5_plan::STAGE, &plan));

        Ok(assemble_report(overview, proposals, migrated, plan))
    }

    fn audit(&self, record: impl FnOnce(&AuditSink)) {
        if let Some(sink) = &self.settings.audit {
            record(sink);
        }
    }
}

/// Run one stage, logging its start, duration and outcome.
async fn timed_stage<T, Fut>(
    stage: usize,
    name: &str,
    label: &str,
    work: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    log_phase_start_console!(stage, name, label);
    log_stage_start!(stage, name, TOTAL_STAGES);
    tracing::info!("{} started.", label);

    let started = Instant::now();
    match work.await {
        Ok(value) => {
            let elapsed = started.elapsed();
            tracing::info!("{} finished in {:.2} seconds.", label, elapsed.as_secs_f64());
            log_stage_complete!(stage, name, elapsed.as_millis() as u64);
            log_phase_complete_console!(stage, elapsed.as_secs_f64());
            Ok(value)
        }
        Err(e) => {
            tracing::error!(stage, error = %e, "{} failed.", label);
            log_stage_failed!(stage, name, &e);
            Err(e)
        }
    }
}

/// Build the generator the configuration asks for.
pub fn build_generator(config: &PlannerConfig) -> Result<Arc<dyn Generator>> {
    let client = OpenAiClient::new(&config.openai)?;
    if config.cache.enabled {
        log_info!("Using cached LLM responses from {}", config.cache.path.display());
        let cached = CachedGenerator::open(client, &config.cache.path)?;
        Ok(Arc::new(cached))
    } else {
        Ok(Arc::new(client))
    }
}

/// Run the complete workflow against the configured OpenAI backend.
pub async fn run_workflow(config: &PlannerConfig) -> Result<Report> {
    config.validate()?;
    let generator = build_generator(config)?;
    run_workflow_with(config, generator).await
}

/// Load the repository, plan the migration and write the report files.
///
/// The report files are written only after every stage has succeeded.
pub async fn run_workflow_with(
    config: &PlannerConfig,
    generator: Arc<dyn Generator>,
) -> Result<Report> {
    let started = Instant::now();
    tracing::info!(project = %config.input_project, model = generator.model_id(), "Code migration planner started.");

    let documents = load_documents(&config.project_dir(), &config.extensions_to_analyze())?;

    let templates = match &config.templates_dir {
        Some(dir) => TemplateStore::from_dir(dir),
        None => TemplateStore::builtin(),
    };
    let planner = MigrationPlanner::new(generator, templates, PipelineSettings::from(config));
    let report = planner.create_migration_plan(&documents).await?;

    let markdown = report::render_markdown(&report, &config.input_project);
    write_output(&config.output_path, markdown.as_bytes())?;
    log_file_saved!(config.output_path.display());
    log_state_file!(TOTAL_STAGES, config.output_path.display(), "Migration plan");

    if let Some(json_path) = &config.report_json_path {
        report::write_json(&report, json_path)?;
        log_file_saved!(json_path.display());
        log_state_file!(TOTAL_STAGES, json_path.display(), "Migration report (JSON)");
    }

    tracing::info!(
        "Code migration planner finished in {:.2} seconds.",
        started.elapsed().as_secs_f64()
    );
    Ok(report)
}

pub(crate) fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let result = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
    .and_then(|_| std::fs::write(path, contents));

    result.map_err(|source| PlannerError::Output {
        path: path.to_path_buf(),
        source,
    })
}
