//! Configuration module for the function pack
//! Env-driven settings with defaults for everything but the API key

use std::time::Duration;

use crate::utils::constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_HTTP_TIMEOUT_SECS, TABLE_MAX_PAGES,
    TABLE_PAGE_SIZE,
};

/// Configuration for the Quandl function pack
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Quandl API key (QUANDL_API_KEY)
    pub api_key: Option<String>,

    /// Quandl API base URL (QUANDL_BASE_URL)
    pub base_url: String,

    /// Timeout for upstream HTTP calls
    pub http_timeout: Duration,

    /// Rows requested per datatable page
    pub table_page_size: u32,

    /// Cursor follow-ups allowed per table invocation
    pub table_max_pages: u32,

    /// Result cache TTL in seconds
    pub cache_ttl_secs: u64,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("QUANDL_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("QUANDL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            table_page_size: TABLE_PAGE_SIZE,
            table_max_pages: TABLE_MAX_PAGES,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl PackConfig {
    /// Config with an explicit API key (embedding, tests)
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }
}
