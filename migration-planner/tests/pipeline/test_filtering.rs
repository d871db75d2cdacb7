//! Extension filtering, schema skipping and categorization

use super::common::*;
use serde_json::json;
use std::sync::Arc;

use migration_planner::planner::assemble::UNCATEGORIZED;
use migration_planner::templates::TemplateId;

#[tokio::test]
async fn test_only_allowed_extensions_are_migrated() {
    let generator = Arc::new(MockGenerator::new());
    let docs = documents(&[
        ("app/Owner.java", "class Owner {}"),
        ("app/beans.xml", "<beans/>"),
        ("app/Pet.java", "class Pet {}"),
        ("pom.xml", "<project/>"),
    ]);

    let report = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap();

    assert_eq!(generator.calls(TemplateId::AnalyzeFile), 4);
    let migrations = generator.requests_for(TemplateId::MigrateFile);
    assert_eq!(migrations.len(), 2);
    assert!(migrations.iter().all(|r| !r.prompt.contains("<beans/>")));
    assert!(migrations.iter().all(|r| !r.prompt.contains("<project/>")));

    let mut names: Vec<&str> = report.migrated_files["Service"]
        .iter()
        .map(|f| f.name())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Owner.java", "Pet.java"]);
}

#[tokio::test]
async fn test_extension_match_ignores_case() {
    let generator = Arc::new(MockGenerator::new());
    let docs = documents(&[("app/Legacy.JAVA", "class Legacy {}")]);

    let report = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap();

    assert_eq!(report.migrated_files["Service"][0].name(), "Legacy.JAVA");
}

#[tokio::test]
async fn test_nothing_eligible_still_plans() {
    let generator = Arc::new(MockGenerator::new());
    let docs = documents(&[("app/beans.xml", "<beans/>")]);

    let report = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap();

    assert!(report.migrated_files.is_empty());
    assert_eq!(generator.calls(TemplateId::MigrateFile), 0);
    assert_eq!(generator.calls(TemplateId::CreateImplementationPlan), 1);
}

#[tokio::test]
async fn test_no_tables_skips_schema_stage() {
    let generator = Arc::new(MockGenerator::new().with_tables(&[]));
    let docs = documents(&[("app/Util.java", "class Util {}")]);

    let report = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap();

    assert_eq!(generator.calls(TemplateId::CreateSchema), 0);
    assert!(report.mongo_db_schemas.is_empty());
    assert_eq!(report.to_json()["mongo_db_schemas"], json!([]));
    assert_eq!(generator.calls(TemplateId::CreateImplementationPlan), 1);
}

#[tokio::test]
async fn test_missing_or_blank_label_is_uncategorized() {
    let generator = Arc::new(MockGenerator::new().with_migration(|prompt| {
        if prompt.contains("class Blank") {
            json!({ "new_file": "// blank", "file_category": "  " })
        } else if prompt.contains("class Missing") {
            json!({ "new_file": "// missing" })
        } else {
            json!({ "new_file": "// service", "file_category": "Service" })
        }
    }));
    let docs = documents(&[
        ("app/Blank.java", "class Blank {}"),
        ("app/Missing.java", "class Missing {}"),
        ("app/UserService.java", "class UserService {}"),
    ]);

    let report = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap();

    let uncategorized: Vec<&str> = report.migrated_files[UNCATEGORIZED]
        .iter()
        .map(|f| f.name())
        .collect();
    assert_eq!(uncategorized, vec!["Blank.java", "Missing.java"]);
    assert_eq!(report.migrated_files["Service"].len(), 1);
    assert_eq!(report.migrated_files.len(), 2);
}

#[tokio::test]
async fn test_bucket_keeps_submission_order() {
    let generator = Arc::new(MockGenerator::new());
    let docs = documents(&[
        ("app/A.java", "class A {}"),
        ("app/B.java", "class B {}"),
        ("app/C.java", "class C {}"),
    ]);

    let report = planner(&generator, &["java"])
        .create_migration_plan(&docs)
        .await
        .unwrap();

    let names: Vec<&str> = report.migrated_files["Service"]
        .iter()
        .map(|f| f.name())
        .collect();
    assert_eq!(names, vec!["A.java", "B.java", "C.java"]);
}
