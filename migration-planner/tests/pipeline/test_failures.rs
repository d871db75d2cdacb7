//! Fail-fast behavior of the pipeline

use super::common::*;
use std::sync::Arc;

use migration_planner::config::PlannerConfig;
use migration_planner::error::OperationCause;
use migration_planner::llm::GenerationError;
use migration_planner::planner::run_workflow_with;
use migration_planner::templates::{TemplateError, TemplateId};
use migration_planner::PlannerError;

#[tokio::test]
async fn test_empty_documents_fail_before_any_downstream_stage() {
    let generator = Arc::new(MockGenerator::new());

    let err = planner(&generator, &["java"])
        .create_migration_plan(&[])
        .await
        .unwrap_err();

    assert!(matches!(err, PlannerError::EmptyAnalysis));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_single_analysis_failure_aborts_run() {
    let generator =
        Arc::new(MockGenerator::new().failing_on(TemplateId::AnalyzeFile, "class Broken"));
    let docs = documents(&[
        ("app/Good.java", "class Good {}"),
        ("app/Broken.java", "class Broken {}"),
        ("app/Other.java", "class Other {}"),
    ]);

    let err = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap_err();

    assert_eq!(err.operation_context(), Some("app/Broken.java"));
    assert!(matches!(
        &err,
        PlannerError::Operation {
            template: TemplateId::AnalyzeFile,
            source: OperationCause::Generation(GenerationError::Api { status: 500, .. }),
            ..
        }
    ));
    assert_eq!(generator.calls(TemplateId::CreateOverview), 0);
    assert_eq!(generator.calls(TemplateId::MigrateFile), 0);
    assert_eq!(generator.calls(TemplateId::CreateImplementationPlan), 0);
}

#[tokio::test]
async fn test_failed_run_leaves_nothing_for_the_next() {
    let generator =
        Arc::new(MockGenerator::new().failing_on(TemplateId::AnalyzeFile, "class Broken"));
    let planner = planner(&generator, &["java"]);

    let failed = planner
        .create_migration_plan(&documents(&[
            ("app/Good.java", "class Good {}"),
            ("app/Broken.java", "class Broken {}"),
        ]))
        .await;
    assert!(failed.is_err());

    let report = planner
        .create_migration_plan(&documents(&[("app/Fresh.java", "class Fresh {}")]))
        .await
        .unwrap();

    let migrated: Vec<&str> = report
        .migrated_files
        .values()
        .flatten()
        .map(|f| f.name())
        .collect();
    assert_eq!(migrated, vec!["Fresh.java"]);
    assert_eq!(generator.calls(TemplateId::MigrateFile), 1);

    let migrate = &generator.requests_for(TemplateId::MigrateFile)[0];
    assert!(migrate.prompt.contains("class Fresh {}"));
    assert!(!migrate.prompt.contains("class Good {}"));
}

#[tokio::test]
async fn test_table_failure_aborts_run() {
    let generator = Arc::new(
        MockGenerator::new()
            .with_tables(&[
                ("owners", "CREATE TABLE owners (id INT)"),
                ("orders", "CREATE TABLE orders (id INT)"),
            ])
            .failing_on(TemplateId::CreateSchema, "CREATE TABLE orders"),
    );
    let docs = documents(&[("app/Order.java", "class Order {}")]);

    let err = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap_err();

    assert_eq!(err.operation_context(), Some("orders"));
    assert_eq!(generator.calls(TemplateId::MigrateFile), 0);
    assert_eq!(generator.calls(TemplateId::CreateImplementationPlan), 0);
}

#[tokio::test]
async fn test_migration_failure_aborts_run() {
    let generator =
        Arc::new(MockGenerator::new().failing_on(TemplateId::MigrateFile, "class Pet"));
    let docs = documents(&[
        ("app/Owner.java", "class Owner {}"),
        ("app/Pet.java", "class Pet {}"),
    ]);

    let err = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap_err();

    assert_eq!(err.operation_context(), Some("app/Pet.java"));
    assert_eq!(generator.calls(TemplateId::CreateImplementationPlan), 0);
}

#[tokio::test]
async fn test_malformed_overview_is_validation_failure() {
    let generator = Arc::new(
        MockGenerator::new().with_overview_response("{\"application_summary\": \"missing fields\"}"),
    );
    let docs = documents(&[("app/User.java", "class User {}")]);

    let err = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlannerError::Operation {
            template: TemplateId::CreateOverview,
            source: OperationCause::Validation {
                schema: "application_overview",
                ..
            },
            ..
        }
    ));
    assert_eq!(generator.calls(TemplateId::CreateSchema), 0);
}

#[tokio::test]
async fn test_plan_failure_is_fatal() {
    let generator = Arc::new(
        MockGenerator::new().failing_on(TemplateId::CreateImplementationPlan, "public class Migrated"),
    );
    let docs = documents(&[("app/User.java", "class User {}")]);

    let err = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap_err();

    assert_eq!(err.operation_context(), Some("implementation plan"));
}

#[tokio::test]
async fn test_failed_workflow_writes_no_report() {
    let dir = tempfile::tempdir().unwrap();
    write_project(
        &dir.path().join("input/shop"),
        &[("User.java", "class Broken {}")],
    );

    let mut config = PlannerConfig::from_yaml(
        "input_project: shop\nfile_extensions_to_analyze: java\nfile_extensions_to_migrate: java\n",
    )
    .unwrap();
    config.input_root = dir.path().join("input");
    config.output_path = dir.path().join("output/migration_plan.md");
    config.report_json_path = Some(dir.path().join("output/report.json"));

    let generator =
        Arc::new(MockGenerator::new().failing_on(TemplateId::AnalyzeFile, "class Broken"));
    let result = run_workflow_with(&config, generator).await;

    assert!(result.is_err());
    assert!(!config.output_path.exists());
    assert!(!dir.path().join("output/report.json").exists());
}

#[tokio::test]
async fn test_missing_project_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PlannerConfig::from_yaml(
        "input_project: absent\nfile_extensions_to_analyze: java\nfile_extensions_to_migrate: java\n",
    )
    .unwrap();
    config.input_root = dir.path().to_path_buf();

    let generator = Arc::new(MockGenerator::new());
    let err = run_workflow_with(&config, generator.clone()).await.unwrap_err();

    assert!(matches!(err, PlannerError::Load(_)));
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_custom_template_with_unknown_placeholder_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_project(&dir.path().join("input/shop"), &[("User.java", "class User {}")]);
    let templates = dir.path().join("prompts");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(
        templates.join("analyze_file.prompt"),
        "{file_content}\nTarget database: {target_db}",
    )
    .unwrap();

    let mut config = PlannerConfig::from_yaml(
        "input_project: shop\nfile_extensions_to_analyze: java\nfile_extensions_to_migrate: java\n",
    )
    .unwrap();
    config.input_root = dir.path().join("input");
    config.output_path = dir.path().join("output/migration_plan.md");
    config.templates_dir = Some(templates);

    let generator = Arc::new(MockGenerator::new());
    let err = run_workflow_with(&config, generator.clone()).await.unwrap_err();

    assert!(matches!(
        err,
        PlannerError::Operation {
            template: TemplateId::AnalyzeFile,
            source: OperationCause::Template(TemplateError::UndeclaredPlaceholder { .. }),
            ..
        }
    ));
    assert!(generator.requests().is_empty());
    assert!(!config.output_path.exists());
}
