//! Merge of all stage outputs into the final report

use crate::planner::types::{
    ApplicationOverview, CategorizedFiles, ImplementationPlan, MigratedFile, Report, SchemaProposal,
};

/// Bucket for files the model did not label
pub const UNCATEGORIZED: &str = "uncategorized";

/// Group migrated files by category label, keeping submission order in each bucket.
pub fn categorize_migrated_files(files: Vec<MigratedFile>) -> CategorizedFiles {
    let mut categorized = CategorizedFiles::new();
    for file in files {
        let label = file.category().trim();
        let label = if label.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            label.to_string()
        };
        categorized.entry(label).or_default().push(file);
    }
    categorized
}

pub fn assemble_report(
    overview: ApplicationOverview,
    mongo_db_schemas: Vec<SchemaProposal>,
    migrated_files: Vec<MigratedFile>,
    plan: ImplementationPlan,
) -> Report {
    Report {
        overview,
        mongo_db_schemas,
        migrated_files: categorize_migrated_files(migrated_files),
        plan,
    }
}
