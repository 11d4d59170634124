use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; the service starts with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// How many top suggestions an enrichment returns when the request does
    /// not ask for a specific count.
    pub default_top_n: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_top_n: std::env::var("DEFAULT_TOP_SUGGESTIONS")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<usize>()
                .context("DEFAULT_TOP_SUGGESTIONS must be a non-negative integer")?,
        })
    }
}
