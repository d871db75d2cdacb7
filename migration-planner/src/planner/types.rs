//! Data types for the migration planning pipeline.
//!
//! The structured types double as the JSON schemas sent to the LLM: their
//! doc comments become field descriptions in the generated schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::loader::Document;

// ============================================================================
// File Analysis
// ============================================================================

/// A document together with its LLM analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub document: Document,
    pub analysis: String,
    pub name: String,
    pub relative_path: String,
    pub file_extension: String,
}

impl AnalyzedFile {
    pub fn new(document: Document, analysis: String) -> Self {
        Self {
            name: document.file_name(),
            relative_path: document.source.display().to_string(),
            file_extension: document.extension(),
            document,
            analysis,
        }
    }
}

/// Analyses gathered by the first stage of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisContext {
    files: Vec<AnalyzedFile>,
}

impl AnalysisContext {
    pub fn new(files: Vec<AnalyzedFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[AnalyzedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Analysis texts in document order.
    pub fn analyses(&self) -> Vec<String> {
        self.files.iter().map(|f| f.analysis.clone()).collect()
    }
}

// ============================================================================
// Application Overview
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DbEntity {
    pub entity_name: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DbTable {
    pub name: String,
    /// The table's schema including constraints in a code format.
    pub db_schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiDefinition {
    pub api_name: String,
    pub api_path: String,
    pub api_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationOverview {
    /// A paragraph containing a comprehensible summary of the analyzed application. It should
    /// include at the very least a programming language, web framework, databases used, and the
    /// main tech stack.
    pub application_summary: String,
    /// All the analyzed DB entities with a one liner describing their purpose.
    pub db_entities: Vec<DbEntity>,
    /// A list of all the analyzed database tables and their respective schemas.
    pub database_tables: Vec<DbTable>,
    /// A list of deductions on all the DAL repository classes.
    pub repositories: Vec<String>,
    /// A list of the analyzed database configuration.
    pub database_configurations: Vec<String>,
    /// A list of APIs. The API name is mapped to the path a short summary on the purpose of the API.
    pub api_definitions: Vec<ApiDefinition>,
}

// ============================================================================
// Schema Proposals
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DesignDecision {
    /// A name that represents the design decision for recommending the proposed MongoDB schema.
    pub name: String,
    /// A list of considerations that led to make the design decision.
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaProposal {
    /// The name of the collection that will be created in MongoDB. Use the same name of the
    /// original table if applicable.
    pub collection_name: String,
    /// The proposed MongoDB schema to replace the schema of the existing application.
    pub mongo_db_schema: String,
    pub schema_decisions: Vec<DesignDecision>,
}

// ============================================================================
// File Migration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileMigration {
    /// The proposed file to replace the file given in the prompt.
    pub new_file: String,
    /// The stereotype of that file, for example Entity, Repository, Service or Controller.
    #[serde(default)]
    pub file_category: String,
}

/// A migration result merged with the file it replaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigratedFile {
    #[serde(flatten)]
    pub migration: FileMigration,
    #[serde(flatten)]
    pub source: AnalyzedFile,
}

impl MigratedFile {
    pub fn new(migration: FileMigration, source: AnalyzedFile) -> Self {
        Self { migration, source }
    }

    pub fn new_file(&self) -> &str {
        &self.migration.new_file
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn category(&self) -> &str {
        &self.migration.file_category
    }
}

// ============================================================================
// Implementation Plan
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImplementationStep {
    /// A name that describes the goal of the implementation step. For example: 'Set up MongoDB
    /// environment' or 'Update service layer'.
    pub name: String,
    /// An ordered list of sub tasks that need to be completed to complete the implementation step.
    pub sub_tasks: Vec<String>,
}

// Field names differ from ImplementationStep so the model does not repeat steps as considerations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImplementationConsideration {
    /// The name of the implementation consideration. For example: 'Performance Optimization'.
    pub consideration_name: String,
    /// A list of points that describe what aspects need to be considered.
    pub consideration_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestingStrategy {
    /// A list of points to consider when writing unit tests for the new migrated code.
    pub unit_test_considerations: Vec<String>,
    /// A list of points to consider when writing integration tests for the new migrated code.
    /// Notably with the new MongoDB dependency.
    pub integration_test_considerations: Vec<String>,
    /// A test class template for writing integration tests with MongoDB, with every annotation
    /// needed for it to be used as is.
    pub test_class_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImplementationPlan {
    /// An ordered list of all the implementation steps for migrating the codebase from the
    /// analyzed files to the new files and technologies.
    pub implementation_steps: Vec<ImplementationStep>,
    /// A data initialization script to add initial data to the new MongoDB collection/s.
    pub data_initialization_script: String,
    /// Additional considerations the implementer might be interested in, mainly non-functional
    /// aspects like performance and serviceability.
    pub additional_considerations: Vec<ImplementationConsideration>,
    /// A testing strategy for testing the newly migrated code.
    pub testing_strategy: TestingStrategy,
}

// ============================================================================
// Report
// ============================================================================

/// Migrated files grouped by category label
pub type CategorizedFiles = BTreeMap<String, Vec<MigratedFile>>;

/// Final output of a run, serialized as one flat object.
///
/// Overview fields, `mongo_db_schemas`, `migrated_files` and plan fields share
/// a single namespace; their names are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub overview: ApplicationOverview,
    pub mongo_db_schemas: Vec<SchemaProposal>,
    pub migrated_files: CategorizedFiles,
    #[serde(flatten)]
    pub plan: ImplementationPlan,
}

impl Report {
    /// The report as a flat JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
