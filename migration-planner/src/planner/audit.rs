//! Optional persistence of every stage's LLM output for later inspection.
//!
//! Writes are best effort: a failure is reported as a warning and never
//! reaches the pipeline result.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::planner::types::{
    AnalysisContext, ApplicationOverview, ImplementationPlan, MigratedFile, SchemaProposal,
};
use migration_planner_sdk::{log_state_file, log_warning};

#[derive(Debug, Clone)]
pub struct AuditSink {
    dir: PathBuf,
}

impl AuditSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_analyses(&self, stage: usize, context: &AnalysisContext) {
        let text = context.analyses().join("\n");
        self.write(stage, "file_analyses.txt", text.as_bytes(), "File analyses");
    }

    pub fn record_overview(&self, stage: usize, overview: &ApplicationOverview) {
        self.write_json(stage, "application_overview.json", overview, "Application overview");
    }

    pub fn record_schemas(&self, stage: usize, proposals: &[SchemaProposal]) {
        for proposal in proposals {
            let file_name = format!("{}.json", sanitize(&proposal.collection_name));
            self.write_json(stage, &file_name, proposal, "MongoDB schema proposal");
        }
    }

    pub fn record_migrated_files(&self, stage: usize, files: &[MigratedFile]) {
        for file in files {
            let relative = Path::new("migrated").join(flattened_name(&file.source.relative_path));
            self.write(stage, relative, file.new_file().as_bytes(), "Migrated file");
        }
    }

    pub fn record_plan(&self, stage: usize, plan: &ImplementationPlan) {
        self.write_json(stage, "implementation_plan.json", plan, "Implementation plan");
    }

    fn write_json<T: Serialize>(&self, stage: usize, name: &str, value: &T, description: &str) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => self.write(stage, name, json.as_bytes(), description),
            Err(e) => warn_failed(&self.dir.join(name), &e),
        }
    }

    fn write(&self, stage: usize, relative: impl AsRef<Path>, contents: &[u8], description: &str) {
        let path = self.dir.join(relative);
        let result = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(&path, contents));

        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Wrote LLM response");
                log_state_file!(stage, path.display(), description);
            }
            Err(e) => warn_failed(&path, &e),
        }
    }
}

fn warn_failed(path: &Path, error: &dyn std::fmt::Display) {
    tracing::warn!(path = %path.display(), error = %error, "Failed to persist LLM response");
    log_warning!("Could not write {}: {}", path.display(), error);
}

/// File-name-safe form of a model-provided name.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

/// Single file name for a source path, so identically named files in
/// different directories do not overwrite each other.
fn flattened_name(relative_path: &str) -> String {
    let parts: Vec<String> = Path::new(relative_path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(sanitize(&part.to_string_lossy())),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        "unnamed".to_string()
    } else {
        parts.join("__")
    }
}
