use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EMBEDDING_API_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Unset only when the server runs on the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub backfill_delay_ms: u64,
}

// Keeps the API key out of the startup log line.
impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("backfill_delay_ms", &self.backfill_delay_ms)
            .finish()
    }
}

impl EmbeddingConfig {
    pub fn backfill_delay(&self) -> Duration {
        Duration::from_millis(self.backfill_delay_ms)
    }
}

impl DatabaseConfig {
    pub fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .context("DATABASE_URL must be set (or run `serve --memory`)")
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: parse_list(
                    &env::var("ALLOWED_ORIGINS")
                        .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5174".to_string()),
                ),
                static_dir: env::var("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("frontend/dist")),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be an integer")?,
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .context("DB_MIN_CONNECTIONS must be an integer")?,
            },
            embedding: EmbeddingConfig {
                api_key: env::var("HUGGINGFACE_API_KEY").unwrap_or_default(),
                api_url: env::var("EMBEDDING_API_URL")
                    .unwrap_or_else(|_| DEFAULT_EMBEDDING_API_URL.to_string()),
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
                backfill_delay_ms: env::var("BACKFILL_DELAY_MS")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .context("BACKFILL_DELAY_MS must be an integer")?,
            },
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
