//! Run configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. YAML config file (`planner.yaml` unless `--config` names another)
//! 3. `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL` (after `.env` is loaded)
//! 4. Command-line flags

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "planner.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Directory name of the project to migrate, inside `input_root`
    pub input_project: String,

    pub input_root: PathBuf,

    #[serde(deserialize_with = "deserialize_extensions")]
    pub file_extensions_to_analyze: Vec<String>,

    /// Must be a subset of `file_extensions_to_analyze`
    #[serde(deserialize_with = "deserialize_extensions")]
    pub file_extensions_to_migrate: Vec<String>,

    /// Overrides the built-in prompt templates
    pub templates_dir: Option<PathBuf>,

    /// Markdown migration plan
    pub output_path: PathBuf,

    /// Raw report as JSON, if set
    pub report_json_path: Option<PathBuf>,

    /// Write every LLM response to `llm_responses_dir` for auditing
    pub log_llm_responses: bool,

    pub llm_responses_dir: PathBuf,

    /// Upper bound on concurrent LLM calls within a stage; unbounded if unset
    pub max_concurrency: Option<usize>,

    pub openai: OpenAiConfig,

    pub cache: CacheConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            input_project: String::new(),
            input_root: PathBuf::from("./input"),
            file_extensions_to_analyze: Vec::new(),
            file_extensions_to_migrate: Vec::new(),
            templates_dir: None,
            output_path: PathBuf::from("./output/migration_plan.md"),
            report_json_path: None,
            log_llm_responses: false,
            llm_responses_dir: PathBuf::from("./output/llm_responses"),
            max_concurrency: None,
            openai: OpenAiConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    /// Prefer `OPENAI_API_KEY` over storing the key in the file
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            request_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("./cache/llm_responses.db"),
        }
    }
}

impl PlannerConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load `path`. A missing file is an error only when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Apply `OPENAI_*` values from `lookup`; blank values are ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.openai.model = model;
        }
    }

    /// Directory holding the repository to analyze.
    pub fn project_dir(&self) -> PathBuf {
        self.input_root.join(&self.input_project)
    }

    pub fn extensions_to_analyze(&self) -> BTreeSet<String> {
        self.file_extensions_to_analyze.iter().cloned().collect()
    }

    pub fn extensions_to_migrate(&self) -> BTreeSet<String> {
        self.file_extensions_to_migrate.iter().cloned().collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_project.trim().is_empty() {
            return Err(invalid("input_project", "must name a directory inside input_root"));
        }
        if self.file_extensions_to_analyze.is_empty() {
            return Err(invalid("file_extensions_to_analyze", "at least one extension is required"));
        }
        if self.file_extensions_to_migrate.is_empty() {
            return Err(invalid("file_extensions_to_migrate", "at least one extension is required"));
        }

        let analyzed = self.extensions_to_analyze();
        let not_analyzed: Vec<&String> = self
            .file_extensions_to_migrate
            .iter()
            .filter(|ext| !analyzed.contains(*ext))
            .collect();
        if !not_analyzed.is_empty() {
            return Err(invalid(
                "file_extensions_to_migrate",
                format!(
                    "{:?} not listed in file_extensions_to_analyze",
                    not_analyzed
                ),
            ));
        }

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(invalid("openai.temperature", "must be between 0.0 and 2.0"));
        }
        if self.max_concurrency == Some(0) {
            return Err(invalid("max_concurrency", "must be greater than zero"));
        }
        if self.openai.request_timeout_secs == 0 {
            return Err(invalid("openai.request_timeout_secs", "must be greater than zero"));
        }
        if self.openai.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(invalid(
                "openai.api_key",
                "set OPENAI_API_KEY or openai.api_key in the config file",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// Normalize an extension: trimmed, lower-case, no leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Split a comma-separated extension list.
pub fn parse_extension_list(list: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    list.split(',')
        .map(normalize_extension)
        .filter(|ext| !ext.is_empty() && seen.insert(ext.clone()))
        .collect()
}

fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Extensions {
        Csv(String),
        List(Vec<String>),
    }

    Ok(match Extensions::deserialize(deserializer)? {
        Extensions::Csv(list) => parse_extension_list(&list),
        Extensions::List(items) => parse_extension_list(&items.join(",")),
    })
}
