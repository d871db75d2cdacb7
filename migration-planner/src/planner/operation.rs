//! Prompted operations: render a template, call the generator, type the answer.
//!
//! Each template is tied to exactly one result type through
//! [`OperationOutput::TEMPLATE`], so a call site names the type it expects and
//! the template, the response schema and the parsing follow from it.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{OperationCause, PlannerError, Result};
use crate::llm::{GenerationRequest, Generator, ResponseFormat};
use crate::planner::structured::parse_json;
use crate::planner::types::{
    ApplicationOverview, FileMigration, ImplementationPlan, SchemaProposal,
};
use crate::templates::{PromptInput, TemplateId, TemplateStore};
use migration_planner_sdk::log_task_failed;

/// One unit of work for a prompted operation
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    /// Identifies the item in logs (file name, table name, ...)
    pub context: String,
    pub inputs: BTreeMap<&'static str, PromptInput>,
}

impl WorkItem {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            inputs: BTreeMap::new(),
        }
    }

    /// Bind a value to a template placeholder.
    pub fn bind(mut self, name: &'static str, input: impl Into<PromptInput>) -> Self {
        self.inputs.insert(name, input.into());
        self
    }
}

/// Result type of one template.
pub trait OperationOutput: Sized {
    const TEMPLATE: TemplateId;

    /// Schema the response must follow, `None` for raw text.
    fn response_format() -> Option<ResponseFormat>;

    fn from_response(response: String) -> std::result::Result<Self, OperationCause>;
}

/// Result types parsed from a JSON response conforming to their own schema.
pub trait StructuredOutput: DeserializeOwned + JsonSchema {
    const TEMPLATE: TemplateId;
    const SCHEMA_NAME: &'static str;
}

impl<T: StructuredOutput> OperationOutput for T {
    const TEMPLATE: TemplateId = <T as StructuredOutput>::TEMPLATE;

    fn response_format() -> Option<ResponseFormat> {
        Some(ResponseFormat {
            name: T::SCHEMA_NAME,
            schema: schema_for!(T).to_value(),
        })
    }

    fn from_response(response: String) -> std::result::Result<Self, OperationCause> {
        parse_json(&response).map_err(|source| OperationCause::Validation {
            schema: T::SCHEMA_NAME,
            source,
        })
    }
}

/// Raw analysis text for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis(pub String);

impl OperationOutput for FileAnalysis {
    const TEMPLATE: TemplateId = TemplateId::AnalyzeFile;

    fn response_format() -> Option<ResponseFormat> {
        None
    }

    fn from_response(response: String) -> std::result::Result<Self, OperationCause> {
        Ok(FileAnalysis(response))
    }
}

impl StructuredOutput for ApplicationOverview {
    const TEMPLATE: TemplateId = TemplateId::CreateOverview;
    const SCHEMA_NAME: &'static str = "application_overview";
}

impl StructuredOutput for SchemaProposal {
    const TEMPLATE: TemplateId = TemplateId::CreateSchema;
    const SCHEMA_NAME: &'static str = "mongodb_schema_proposal";
}

impl StructuredOutput for FileMigration {
    const TEMPLATE: TemplateId = TemplateId::MigrateFile;
    const SCHEMA_NAME: &'static str = "migrated_file";
}

impl StructuredOutput for ImplementationPlan {
    const TEMPLATE: TemplateId = TemplateId::CreateImplementationPlan;
    const SCHEMA_NAME: &'static str = "implementation_plan";
}

/// Runs prompted operations against one generator and template store.
#[derive(Clone)]
pub struct OperationRunner {
    generator: Arc<dyn Generator>,
    templates: TemplateStore,
}

impl OperationRunner {
    pub fn new(generator: Arc<dyn Generator>, templates: TemplateStore) -> Self {
        Self {
            generator,
            templates,
        }
    }

    /// Run the operation whose result type is `T`.
    ///
    /// Failures are logged with the item's context before being returned.
    pub async fn run<T: OperationOutput>(&self, item: WorkItem) -> Result<T> {
        match self.execute::<T>(&item).await {
            Ok(output) => Ok(output),
            Err(cause) => {
                tracing::error!(
                    template = %T::TEMPLATE,
                    context = %item.context,
                    error = %cause,
                    "Prompted operation failed"
                );
                log_task_failed!(&item.context, &cause);
                Err(PlannerError::Operation {
                    template: T::TEMPLATE,
                    context: item.context,
                    source: cause,
                })
            }
        }
    }

    async fn execute<T: OperationOutput>(
        &self,
        item: &WorkItem,
    ) -> std::result::Result<T, OperationCause> {
        let template = self.templates.load(T::TEMPLATE).await?;
        let prompt = T::TEMPLATE.render(&template, &item.inputs)?;

        let request = GenerationRequest {
            template: T::TEMPLATE,
            prompt,
            response_format: T::response_format(),
        };
        let response = self.generator.generate(&request).await?;

        T::from_response(response)
    }
}
