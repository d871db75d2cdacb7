//! Markdown and JSON rendering of a finished report.

use std::fmt::Write;
use std::path::Path;

use crate::error::Result;
use crate::planner::types::Report;
use crate::planner::workflow::write_output;

/// Render the migration plan document for `application_name`.
pub fn render_markdown(report: &Report, application_name: &str) -> String {
    let mut md = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut md, report, application_name);
    md
}

fn write_report(md: &mut String, report: &Report, application_name: &str) -> std::fmt::Result {
    let overview = &report.overview;
    let plan = &report.plan;

    writeln!(md, "# Migration plan: {}\n", application_name)?;

    writeln!(md, "## Current application\n")?;
    writeln!(md, "{}\n", overview.application_summary.trim())?;

    if !overview.db_entities.is_empty() {
        writeln!(md, "### Entities\n")?;
        for entity in &overview.db_entities {
            writeln!(md, "- **{}**: {}", entity.entity_name, entity.summary)?;
        }
        writeln!(md)?;
    }

    if !overview.database_tables.is_empty() {
        writeln!(md, "### Database tables\n")?;
        for table in &overview.database_tables {
            writeln!(md, "#### {}\n", table.name)?;
            write_code_block(md, "sql", &table.db_schema)?;
        }
    }

    write_list_section(md, "### Repositories", &overview.repositories)?;
    write_list_section(md, "### Database configuration", &overview.database_configurations)?;

    if !overview.api_definitions.is_empty() {
        writeln!(md, "### APIs\n")?;
        writeln!(md, "| Name | Path | Summary |")?;
        writeln!(md, "| --- | --- | --- |")?;
        for api in &overview.api_definitions {
            writeln!(
                md,
                "| {} | `{}` | {} |",
                escape_cell(&api.api_name),
                api.api_path,
                escape_cell(&api.api_summary)
            )?;
        }
        writeln!(md)?;
    }

    writeln!(md, "## Proposed MongoDB collections\n")?;
    if report.mongo_db_schemas.is_empty() {
        writeln!(md, "No database tables were found.\n")?;
    }
    for proposal in &report.mongo_db_schemas {
        writeln!(md, "### {}\n", proposal.collection_name)?;
        write_code_block(md, "json", &proposal.mongo_db_schema)?;
        for decision in &proposal.schema_decisions {
            writeln!(md, "**{}**\n", decision.name)?;
            for consideration in &decision.considerations {
                writeln!(md, "- {}", consideration)?;
            }
            writeln!(md)?;
        }
    }

    writeln!(md, "## Migrated files\n")?;
    for (category, files) in &report.migrated_files {
        writeln!(md, "### {}\n", category)?;
        for file in files {
            writeln!(md, "#### {}\n", file.name())?;
            writeln!(md, "Replaces `{}`\n", file.source.relative_path)?;
            write_code_block(md, &file.source.file_extension, file.new_file())?;
        }
    }

    writeln!(md, "## Implementation steps\n")?;
    for (idx, step) in plan.implementation_steps.iter().enumerate() {
        writeln!(md, "### {}. {}\n", idx + 1, step.name)?;
        for sub_task in &step.sub_tasks {
            writeln!(md, "- [ ] {}", sub_task)?;
        }
        writeln!(md)?;
    }

    writeln!(md, "## Data initialization\n")?;
    write_code_block(md, "javascript", &plan.data_initialization_script)?;

    if !plan.additional_considerations.is_empty() {
        writeln!(md, "## Additional considerations\n")?;
        for consideration in &plan.additional_considerations {
            writeln!(md, "### {}\n", consideration.consideration_name)?;
            for point in &consideration.consideration_points {
                writeln!(md, "- {}", point)?;
            }
            writeln!(md)?;
        }
    }

    let testing = &plan.testing_strategy;
    writeln!(md, "## Testing strategy\n")?;
    write_list_section(md, "### Unit tests", &testing.unit_test_considerations)?;
    write_list_section(md, "### Integration tests", &testing.integration_test_considerations)?;
    if !testing.test_class_template.trim().is_empty() {
        writeln!(md, "### Test class template\n")?;
        write_code_block(md, "", &testing.test_class_template)?;
    }

    Ok(())
}

fn write_list_section(md: &mut String, heading: &str, items: &[String]) -> std::fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(md, "{}\n", heading)?;
    for item in items {
        writeln!(md, "- {}", item)?;
    }
    writeln!(md)
}

fn write_code_block(md: &mut String, language: &str, code: &str) -> std::fmt::Result {
    // Longer fence than any backtick run in the code itself
    let longest_run = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    writeln!(md, "{}{}\n{}\n{}\n", fence, language, code.trim_end(), fence)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Write the report as pretty-printed JSON.
pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.to_json()).unwrap_or_default();
    write_output(path, json.as_bytes())
}
