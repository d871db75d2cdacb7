//! Repository file loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::normalize_extension;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Input project directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One loaded source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: PathBuf,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Lower-cased extension without the dot, empty if there is none.
    pub fn extension(&self) -> String {
        self.source
            .extension()
            .map(|ext| normalize_extension(&ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// Load every file under `root` whose extension is in `extensions`, sorted by path.
///
/// Files must be UTF-8. An empty result is not an error here.
pub fn load_documents(root: &Path, extensions: &BTreeSet<String>) -> Result<Vec<Document>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| LoadError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .map(|ext| extensions.contains(&normalize_extension(&ext.to_string_lossy())))
            .unwrap_or(false);
        if matches {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;
        documents.push(Document::new(content, path));
    }

    tracing::info!(root = %root.display(), count = documents.len(), "Loaded files to analyze");
    Ok(documents)
}
