//! Embedding Client
//!
//! Wraps the Hugging Face feature-extraction endpoint. One POST per call, no retry and
//! no timeout beyond the `reqwest` defaults; failures go back to the caller as-is.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::EmbeddingConfig;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding API key not configured")]
    MissingApiKey,

    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid embedding format: {0}")]
    InvalidFormat(String),
}

/// Text in, fixed-length vector out.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

pub struct HuggingFaceEmbedder {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl HuggingFaceEmbedder {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: api_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(&config.api_key, &config.api_url, &config.model)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/pipeline/feature-extraction",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.api_key.is_empty() {
            return Err(EmbeddingError::MissingApiKey);
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&FeatureExtractionRequest { inputs: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let vector = parse_embedding(&payload)?;
        debug!(model = %self.model, dimensions = vector.len(), "Embedding generated");
        Ok(vector)
    }
}

/// Accepts `[f, f, ...]` or `[[f, f, ...], ...]`; the latter yields the first row.
pub fn parse_embedding(payload: &Value) -> Result<Vec<f32>, EmbeddingError> {
    let outer = payload
        .as_array()
        .ok_or_else(|| EmbeddingError::InvalidFormat("expected a JSON array".to_string()))?;

    let row = match outer.first() {
        None => return Err(EmbeddingError::InvalidFormat("empty array".to_string())),
        Some(Value::Number(_)) => outer,
        Some(Value::Array(inner)) => inner,
        Some(other) => {
            return Err(EmbeddingError::InvalidFormat(format!(
                "unexpected element {other}"
            )))
        }
    };

    if row.is_empty() {
        return Err(EmbeddingError::InvalidFormat("empty vector".to_string()));
    }

    row.iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbeddingError::InvalidFormat(format!("non-numeric value {v}")))
        })
        .collect()
}
