//! Progress reporting for migration-planner pipelines.
//!
//! Two channels live here:
//!
//! - [`PipelineLog`] events, serialized as one `__MP_EVENT__:<json>` line on
//!   stderr so wrapping tools can follow a run. Emission is off until
//!   [`set_event_output`] turns it on.
//! - Console macros that print coloured, human-readable progress lines.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Prefix marking a machine-readable event line on stderr.
pub const EVENT_PREFIX: &str = "__MP_EVENT__:";

static EVENT_OUTPUT: AtomicBool = AtomicBool::new(false);

/// Enable or disable structured event lines on stderr.
pub fn set_event_output(enabled: bool) {
    EVENT_OUTPUT.store(enabled, Ordering::Relaxed);
}

/// Whether structured event lines are currently written.
pub fn event_output_enabled() -> bool {
    EVENT_OUTPUT.load(Ordering::Relaxed)
}

/// Structured progress events emitted by the pipeline stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineLog {
    /// Stage started
    StageStarted {
        stage: usize,
        name: String,
        total_stages: usize,
    },
    /// Stage completed
    StageCompleted {
        stage: usize,
        name: String,
        elapsed_ms: u64,
    },
    /// Stage failed
    StageFailed {
        stage: usize,
        name: String,
        error: String,
    },
    /// One work item of a stage started
    TaskStarted {
        stage: usize,
        task_id: String,
        description: String,
        total_tasks: Option<usize>,
    },
    /// Work item completed
    TaskCompleted {
        task_id: String,
        result: Option<String>,
    },
    /// Work item failed
    TaskFailed { task_id: String, error: String },
    /// An audit or report file was written
    StateFileCreated {
        stage: usize,
        file_path: String,
        description: String,
    },
}

impl PipelineLog {
    /// Render the event as a prefixed JSON line.
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self)
            .ok()
            .map(|json| format!("{}{}", EVENT_PREFIX, json))
    }

    /// Emit this event to stderr if event output is enabled
    pub fn emit(&self) {
        if !event_output_enabled() {
            return;
        }
        if let Some(line) = self.to_line() {
            use std::io::Write;
            eprintln!("{}", line);
            let _ = std::io::stderr().flush();
        }
    }

    /// Parse an event back out of a stderr line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }
}

#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr, $name:expr, $total:expr) => {
        $crate::PipelineLog::StageStarted {
            stage: $stage,
            name: $name.to_string(),
            total_stages: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $name:expr, $elapsed_ms:expr) => {
        $crate::PipelineLog::StageCompleted {
            stage: $stage,
            name: $name.to_string(),
            elapsed_ms: $elapsed_ms,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_failed {
    ($stage:expr, $name:expr, $error:expr) => {
        $crate::PipelineLog::StageFailed {
            stage: $stage,
            name: $name.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_start {
    ($stage:expr, $task_id:expr, $desc:expr) => {
        $crate::PipelineLog::TaskStarted {
            stage: $stage,
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            total_tasks: None,
        }
        .emit();
    };
    ($stage:expr, $task_id:expr, $desc:expr, $total:expr) => {
        $crate::PipelineLog::TaskStarted {
            stage: $stage,
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            total_tasks: Some($total),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_complete {
    ($task_id:expr) => {
        $crate::PipelineLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: None,
        }
        .emit();
    };
    ($task_id:expr, $result:expr) => {
        $crate::PipelineLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_failed {
    ($task_id:expr, $error:expr) => {
        $crate::PipelineLog::TaskFailed {
            task_id: $task_id.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_state_file {
    ($stage:expr, $path:expr, $desc:expr) => {
        $crate::PipelineLog::StateFileCreated {
            stage: $stage,
            file_path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================

/// Logs the start of a pipeline stage with a header and description.
///
/// ```
/// use migration_planner_sdk::log_phase_start_console;
/// log_phase_start_console!(1, "File Analysis", "Analyzing 12 repository files");
/// ```
///
/// Outputs:
/// ```text
/// ═══ STAGE 1: File Analysis ═══
/// Analyzing 12 repository files
/// ```
#[macro_export]
macro_rules! log_phase_start_console {
    ($stage:expr, $title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ STAGE {}: {} ═══\x1b[0m", $stage, $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a stage with its duration in seconds.
///
/// ```text
/// ✓ Stage 1 complete (3.21s)
/// ```
#[macro_export]
macro_rules! log_phase_complete_console {
    ($stage:expr, $elapsed_secs:expr) => {
        println!(
            "\x1b[32m✓ Stage {} complete ({:.2}s)\x1b[0m",
            $stage, $elapsed_secs
        );
    };
}

/// Logs the start of a concurrent fan-out.
///
/// ```text
/// → Running 3 file migrations in parallel
/// ```
#[macro_export]
macro_rules! log_parallel_start {
    ($num_items:expr, $item_type:expr) => {
        println!(
            "\x1b[36m→ Running {} {} in parallel\x1b[0m",
            $num_items, $item_type
        );
    };
}

#[macro_export]
macro_rules! log_parallel_complete {
    ($num_items:expr, $item_type:expr) => {
        println!("\x1b[32m✓ {} {} completed\x1b[0m", $num_items, $item_type);
    };
}

/// Logs the number of items found.
///
/// ```text
/// Found 14 files to analyze
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
///
/// ```
/// use migration_planner_sdk::log_info;
/// log_info!("Using cached LLM responses");
/// let project = "petclinic";
/// log_info!("Planning migration of {}", project);
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// ```text
/// ✓ Saved: ./output/migration_plan.md
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}
