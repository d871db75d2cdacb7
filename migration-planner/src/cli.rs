//! CLI argument definitions for the migration planner.
//!
//! Every flag is optional and overrides the matching field of the YAML
//! configuration file and of the `OPENAI_*` environment variables.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_extension_list, ConfigError, PlannerConfig, DEFAULT_CONFIG_PATH};

/// LLM-driven planner for migrating a relational-database application to MongoDB
///
/// Runs a 5-step workflow over the files of one repository:
///
/// - Step 1: Analyze every file
/// - Step 2: Summarize the application
/// - Step 3: Propose a MongoDB collection per table
/// - Step 4: Generate replacement files
/// - Step 5: Write an implementation plan
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "migration-planner")]
#[command(about = "LLM-driven database migration planner")]
#[command(version)]
pub struct Args {
    /// Path to the YAML configuration file
    ///
    /// Defaults to ./planner.yaml, which may be absent. An explicitly given
    /// file must exist.
    #[arg(long, short, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory name inside the input root
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,

    /// Directory holding the input projects
    #[arg(long, value_name = "DIR")]
    pub input_root: Option<PathBuf>,

    /// Comma-separated extensions of the files to analyze (e.g. "java,xml")
    #[arg(long, value_name = "EXTS")]
    pub analyze: Option<String>,

    /// Comma-separated extensions of the files to migrate (subset of --analyze)
    #[arg(long, value_name = "EXTS")]
    pub migrate: Option<String>,

    /// Model name sent to the chat completions API
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long, value_name = "TEMP")]
    pub temperature: Option<f32>,

    /// Directory with prompt templates overriding the built-in ones
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Path of the Markdown migration plan
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write the raw report as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Persist every LLM response for auditing
    #[arg(long)]
    pub debug_responses: bool,

    /// Cache LLM responses in a local SQLite database
    #[arg(long)]
    pub cache: bool,

    /// Maximum concurrent LLM calls within a step
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Emit machine-readable progress events on stderr
    #[arg(long)]
    pub events: bool,
}

impl Args {
    /// Load the configuration file and apply these flags on top of it.
    pub fn load_config(&self) -> Result<PlannerConfig, ConfigError> {
        self.load_config_with(|name| std::env::var(name).ok())
    }

    /// Layer the config file, the `OPENAI_*` values from `env` and the flags.
    pub fn load_config_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<PlannerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PlannerConfig::load(path, true)?,
            None => PlannerConfig::load(&PathBuf::from(DEFAULT_CONFIG_PATH), false)?,
        };
        config.apply_vars(env);
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Override `config` with every flag that was given.
    pub fn apply_to(&self, config: &mut PlannerConfig) {
        if let Some(project) = &self.project {
            config.input_project = project.clone();
        }
        if let Some(root) = &self.input_root {
            config.input_root = root.clone();
        }
        if let Some(list) = &self.analyze {
            config.file_extensions_to_analyze = parse_extension_list(list);
        }
        if let Some(list) = &self.migrate {
            config.file_extensions_to_migrate = parse_extension_list(list);
        }
        if let Some(model) = &self.model {
            config.openai.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.openai.temperature = temperature;
        }
        if let Some(dir) = &self.templates {
            config.templates_dir = Some(dir.clone());
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(json) = &self.report_json {
            config.report_json_path = Some(json.clone());
        }
        if self.debug_responses {
            config.log_llm_responses = true;
        }
        if self.cache {
            config.cache.enabled = true;
        }
        if let Some(limit) = self.concurrency {
            config.max_concurrency = Some(limit);
        }
    }
}
