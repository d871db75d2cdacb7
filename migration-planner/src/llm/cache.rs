//! SQLite-backed response cache.
//!
//! Wraps any [`Generator`]. Responses are keyed by model, template, response
//! schema and the full prompt, so a rerun over an unchanged repository
//! replays every answer without calling the backend.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::{GenerationError, GenerationRequest, Generator};

pub struct CachedGenerator<G> {
    inner: G,
    conn: Mutex<Connection>,
}

impl<G: Generator> CachedGenerator<G> {
    /// Open (or create) the cache database at `path`.
    pub fn open(inner: G, path: &Path) -> Result<Self, GenerationError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GenerationError::Other(format!("cache directory: {}", e)))?;
            }
        }
        Self::with_connection(inner, Connection::open(path)?)
    }

    /// In-memory cache, lost when dropped.
    pub fn in_memory(inner: G) -> Result<Self, GenerationError> {
        Self::with_connection(inner, Connection::open_in_memory()?)
    }

    fn with_connection(inner: G, conn: Connection) -> Result<Self, GenerationError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS llm_responses (
                model TEXT NOT NULL,
                template TEXT NOT NULL,
                schema_name TEXT NOT NULL,
                prompt TEXT NOT NULL,
                response TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (model, template, schema_name, prompt)
            )",
            [],
        )?;

        Ok(Self {
            inner,
            conn: Mutex::new(conn),
        })
    }

    fn lookup(&self, request: &GenerationRequest) -> Result<Option<String>, GenerationError> {
        let conn = self.lock()?;
        let cached = conn
            .query_row(
                "SELECT response FROM llm_responses
                 WHERE model = ?1 AND template = ?2 AND schema_name = ?3 AND prompt = ?4",
                params![
                    self.inner.model_id(),
                    request.template.to_string(),
                    schema_name(request),
                    request.prompt
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(cached)
    }

    fn store(&self, request: &GenerationRequest, response: &str) -> Result<(), GenerationError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO llm_responses
                (model, template, schema_name, prompt, response, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.inner.model_id(),
                request.template.to_string(),
                schema_name(request),
                request.prompt,
                response,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Number of cached responses.
    pub fn len(&self) -> Result<usize, GenerationError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM llm_responses", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, GenerationError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, GenerationError> {
        self.conn
            .lock()
            .map_err(|_| GenerationError::Other("response cache lock poisoned".to_string()))
    }
}

fn schema_name(request: &GenerationRequest) -> &'static str {
    request
        .response_format
        .as_ref()
        .map(|format| format.name)
        .unwrap_or("text")
}

#[async_trait]
impl<G: Generator> Generator for CachedGenerator<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        if let Some(cached) = self.lookup(request)? {
            tracing::debug!(template = %request.template, "Using cached LLM response");
            return Ok(cached);
        }

        let response = self.inner.generate(request).await?;
        self.store(request, &response)?;
        Ok(response)
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
