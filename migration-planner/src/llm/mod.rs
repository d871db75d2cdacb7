//! Generation capability used by every prompted operation.
//!
//! The pipeline only sees the [`Generator`] trait: a rendered prompt goes in,
//! raw response text comes out. Structured requests carry a JSON schema the
//! backend should constrain its answer to; parsing that answer into a typed
//! value is the caller's job.

pub mod cache;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::templates::TemplateId;

pub use cache::CachedGenerator;
pub use openai::OpenAiClient;

/// JSON schema a structured response must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    /// Schema name reported to the backend (`[a-zA-Z0-9_-]+`).
    pub name: &'static str,
    pub schema: serde_json::Value,
}

/// One call to the generation capability
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Template the prompt was rendered from
    pub template: TemplateId,
    /// Fully rendered prompt
    pub prompt: String,
    /// `None` requests raw text
    pub response_format: Option<ResponseFormat>,
}

impl GenerationRequest {
    pub fn is_structured(&self) -> bool {
        self.response_format.is_some()
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model refused the request: {0}")]
    Refusal(String),

    #[error("response contained no content")]
    EmptyResponse,

    #[error("response cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

/// Produces a response for a rendered prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Identifier of the backing model, used to key cached responses.
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}
