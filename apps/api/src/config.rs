use anyhow::{Context, Result};

use crate::layout::page_config::DEFAULT_ROWS_AVAILABLE;
use crate::layout::PageConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Body rows per printed page.
    pub rows_available: u32,
    /// Largest invoice, in line items, a single request may paginate.
    pub max_line_items: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rows_available: parse_env("INVOICE_ROWS_AVAILABLE", DEFAULT_ROWS_AVAILABLE)?,
            max_line_items: parse_env("MAX_LINE_ITEMS", 500)?,
        };
        config.page_config()?;
        Ok(config)
    }

    /// The validated page budget; rejects values below the layout floor.
    pub fn page_config(&self) -> Result<PageConfig> {
        PageConfig::new(self.rows_available).context("INVOICE_ROWS_AVAILABLE is too small")
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
