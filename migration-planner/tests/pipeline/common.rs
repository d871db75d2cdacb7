//! Common test utilities for pipeline tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use migration_planner::llm::{GenerationError, GenerationRequest, Generator};
use migration_planner::loader::Document;
use migration_planner::planner::{MigrationPlanner, PipelineSettings};
use migration_planner::templates::{TemplateId, TemplateStore};

pub const ANALYSIS: &str = "Mocked analysis content";
pub const SUMMARY: &str = "Mocked app summary";

type MigrationFn = Box<dyn Fn(&str) -> Value + Send + Sync>;

/// Scripted generator: answers by template and records every request
pub struct MockGenerator {
    tables: Vec<(String, String)>,
    overview: Option<String>,
    migration: MigrationFn,
    failure: Option<(TemplateId, String)>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    /// One `users` table, every file migrated as a "Service".
    pub fn new() -> Self {
        Self {
            tables: vec![(
                "users".to_string(),
                "CREATE TABLE users (id BIGINT PRIMARY KEY, email VARCHAR(255))".to_string(),
            )],
            overview: None,
            migration: Box::new(|_| {
                json!({ "new_file": "public class Migrated {}", "file_category": "Service" })
            }),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tables(mut self, tables: &[(&str, &str)]) -> Self {
        self.tables = tables
            .iter()
            .map(|(name, schema)| (name.to_string(), schema.to_string()))
            .collect();
        self
    }

    /// Raw text returned for the overview instead of a valid overview.
    pub fn with_overview_response(mut self, response: &str) -> Self {
        self.overview = Some(response.to_string());
        self
    }

    /// Migration result computed from the rendered prompt.
    pub fn with_migration(mut self, migration: impl Fn(&str) -> Value + Send + Sync + 'static) -> Self {
        self.migration = Box::new(migration);
        self
    }

    /// Fail calls to `template` whose prompt contains `needle`.
    pub fn failing_on(mut self, template: TemplateId, needle: &str) -> Self {
        self.failure = Some((template, needle.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, template: TemplateId) -> Vec<GenerationRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.template == template)
            .collect()
    }

    pub fn calls(&self, template: TemplateId) -> usize {
        self.requests_for(template).len()
    }

    fn respond(&self, request: &GenerationRequest) -> Value {
        match request.template {
            TemplateId::AnalyzeFile => Value::String(ANALYSIS.to_string()),
            TemplateId::CreateOverview => json!({
                "application_summary": SUMMARY,
                "db_entities": [{ "entity_name": "User", "summary": "An application user" }],
                "database_tables": self
                    .tables
                    .iter()
                    .map(|(name, schema)| json!({ "name": name, "db_schema": schema }))
                    .collect::<Vec<_>>(),
                "repositories": ["UserRepository extends JpaRepository"],
                "database_configurations": ["spring.datasource.url=jdbc:mysql://localhost/app"],
                "api_definitions": [{ "api_name": "Get user", "api_path": "/users/{id}", "api_summary": "Fetch one user" }]
            }),
            TemplateId::CreateSchema => {
                let table = self
                    .tables
                    .iter()
                    .find(|(_, schema)| request.prompt.contains(schema.as_str()))
                    .map(|(name, _)| name.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                json!({
                    "collection_name": table,
                    "mongo_db_schema": format!("{{ \"collection\": \"{}\" }}", table),
                    "schema_decisions": [{ "name": "Embed related data", "considerations": ["Read together"] }]
                })
            }
            TemplateId::MigrateFile => (self.migration)(&request.prompt),
            TemplateId::CreateImplementationPlan => json!({
                "implementation_steps": [{ "name": "Step 1", "sub_tasks": ["Task A", "Task B"] }],
                "data_initialization_script": "db.users.insertOne({ email: 'a@b.c' })",
                "additional_considerations": [{
                    "consideration_name": "Performance Optimization",
                    "consideration_points": ["Index email"]
                }],
                "testing_strategy": {
                    "unit_test_considerations": ["Mock the repository"],
                    "integration_test_considerations": ["Use an embedded MongoDB"],
                    "test_class_template": "@DataMongoTest class UserRepositoryTest {}"
                }
            }),
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        // Let sibling tasks interleave like real network calls would
        tokio::task::yield_now().await;

        if let Some((template, needle)) = &self.failure {
            if request.template == *template && request.prompt.contains(needle.as_str()) {
                return Err(GenerationError::Api {
                    status: 500,
                    body: format!("mock failure for {}", needle),
                });
            }
        }

        if request.template == TemplateId::CreateOverview {
            if let Some(raw) = &self.overview {
                return Ok(raw.clone());
            }
        }

        Ok(match self.respond(request) {
            Value::String(text) => text,
            value => value.to_string(),
        })
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}

pub fn extensions(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|e| e.to_string()).collect()
}

pub fn documents(files: &[(&str, &str)]) -> Vec<Document> {
    files
        .iter()
        .map(|(path, content)| Document::new(*content, *path))
        .collect()
}

/// Planner over `generator` migrating files with the given extensions
pub fn planner(generator: &Arc<MockGenerator>, migrate: &[&str]) -> MigrationPlanner {
    MigrationPlanner::new(
        generator.clone(),
        TemplateStore::builtin(),
        PipelineSettings {
            extensions_to_migrate: extensions(migrate),
            ..Default::default()
        },
    )
}

/// Write `files` below `root`, creating directories as needed.
pub fn write_project(root: &std::path::Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}
