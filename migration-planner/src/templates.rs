//! Prompt templates and the store they are loaded from.
//!
//! Templates use `{name}` placeholders. `{{` and `}}` produce literal braces,
//! so JSON examples can be written inside a prompt.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The five prompts the pipeline needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateId {
    AnalyzeFile,
    CreateOverview,
    CreateSchema,
    MigrateFile,
    CreateImplementationPlan,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::AnalyzeFile,
        TemplateId::CreateOverview,
        TemplateId::CreateSchema,
        TemplateId::MigrateFile,
        TemplateId::CreateImplementationPlan,
    ];

    /// File stem used inside a templates directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            TemplateId::AnalyzeFile => "analyze_file",
            TemplateId::CreateOverview => "create_application_overview",
            TemplateId::CreateSchema => "create_mongodb_schema",
            TemplateId::MigrateFile => "migrate_file",
            TemplateId::CreateImplementationPlan => "create_implementation_plan",
        }
    }

    /// Placeholders a rendering of this template is expected to bind.
    pub fn input_variables(self) -> &'static [&'static str] {
        match self {
            TemplateId::AnalyzeFile => &["file_content"],
            TemplateId::CreateOverview => &["analyses"],
            TemplateId::CreateSchema => &["analyses", "schema"],
            TemplateId::MigrateFile => &["analysis", "file_content"],
            TemplateId::CreateImplementationPlan => {
                &["existing_files", "new_files", "mongo_db_schemas"]
            }
        }
    }

    /// Render `template` for this prompt.
    ///
    /// Bindings and placeholders must both be among
    /// [`input_variables`](Self::input_variables), so a custom template
    /// cannot ask for a value the pipeline never provides.
    pub fn render(
        self,
        template: &str,
        inputs: &BTreeMap<&str, PromptInput>,
    ) -> Result<String, TemplateError> {
        let declared = self.input_variables();
        if let Some(name) = inputs.keys().find(|name| !declared.iter().any(|d| d == *name)) {
            return Err(TemplateError::UndeclaredInput {
                template: self,
                name: name.to_string(),
            });
        }
        substitute(template, inputs, Some((self, declared)))
    }

    fn builtin(self) -> &'static str {
        match self {
            TemplateId::AnalyzeFile => include_str!("../resources/prompts/analyze_file.prompt"),
            TemplateId::CreateOverview => {
                include_str!("../resources/prompts/create_application_overview.prompt")
            }
            TemplateId::CreateSchema => {
                include_str!("../resources/prompts/create_mongodb_schema.prompt")
            }
            TemplateId::MigrateFile => include_str!("../resources/prompts/migrate_file.prompt"),
            TemplateId::CreateImplementationPlan => {
                include_str!("../resources/prompts/create_implementation_plan.prompt")
            }
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateId::AnalyzeFile => "analyze-file",
            TemplateId::CreateOverview => "create-overview",
            TemplateId::CreateSchema => "create-schema",
            TemplateId::MigrateFile => "migrate-file",
            TemplateId::CreateImplementationPlan => "create-implementation-plan",
        })
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no value bound for placeholder '{{{0}}}'")]
    MissingInput(String),

    #[error("template {template} uses undeclared placeholder '{{{name}}}'")]
    UndeclaredPlaceholder { template: TemplateId, name: String },

    #[error("template {template} was given undeclared input '{name}'")]
    UndeclaredInput { template: TemplateId, name: String },

    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),

    #[error("unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),
}

/// A value bound to a template placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum PromptInput {
    Text(String),
    List(Vec<String>),
}

impl PromptInput {
    fn render(&self) -> String {
        match self {
            PromptInput::Text(text) => text.clone(),
            PromptInput::List(items) => items.join("\n\n---\n\n"),
        }
    }
}

impl From<String> for PromptInput {
    fn from(value: String) -> Self {
        PromptInput::Text(value)
    }
}

impl From<&str> for PromptInput {
    fn from(value: &str) -> Self {
        PromptInput::Text(value.to_string())
    }
}

impl From<Vec<String>> for PromptInput {
    fn from(value: Vec<String>) -> Self {
        PromptInput::List(value)
    }
}

impl<'a> From<Vec<&'a str>> for PromptInput {
    fn from(value: Vec<&'a str>) -> Self {
        PromptInput::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Substitute every `{name}` in `template` with its binding.
///
/// With `declared`, a placeholder outside that list is rejected even when a
/// binding for it exists.
fn substitute(
    template: &str,
    inputs: &BTreeMap<&str, PromptInput>,
    declared: Option<(TemplateId, &[&str])>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::Unterminated(idx));
                }
                let name = name.trim();
                if let Some((id, declared)) = declared {
                    if !declared.iter().any(|d| *d == name) {
                        return Err(TemplateError::UndeclaredPlaceholder {
                            template: id,
                            name: name.to_string(),
                        });
                    }
                }
                let value = inputs
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingInput(name.to_string()))?;
                out.push_str(&value.render());
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(TemplateError::UnmatchedBrace(idx)),
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Source of prompt templates.
///
/// Without a directory the embedded defaults are used. With one, every
/// template is read from `<dir>/<stem>.prompt` on each load, and a missing
/// file is an error.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    pub fn builtin() -> Self {
        Self { dir: None }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub async fn load(&self, id: TemplateId) -> Result<String, TemplateError> {
        match &self.dir {
            None => Ok(id.builtin().to_string()),
            Some(dir) => {
                let path = dir.join(format!("{}.prompt", id.file_stem()));
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| TemplateError::Read { path, source })
            }
        }
    }
}
