//! Constants Module - Single Source of Truth
//!
//! Shared constants and defaults used across the function pack.
//! Retry constants live next to the client in src/providers/quandl.rs.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "QuandlFunctions";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "QuandlFunctions/0.1";

// ============================================
// UPSTREAM API CONSTANTS
// ============================================

/// Default base URL for the Quandl v3 API (canonical host)
pub const DEFAULT_BASE_URL: &str = "https://data.nasdaq.com/api/v3";

/// Default timeout for upstream requests (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default result cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// ============================================
// SERIES DATE RANGE DEFAULTS
// ============================================

/// Lower bound applied when a series invocation has no mindate
pub const DEFAULT_MIN_DATE: &str = "1900-01-01";

/// Upper bound applied when a series invocation has no maxdate
pub const DEFAULT_MAX_DATE: &str = "2099-12-31";

// ============================================
// TABLE PAGINATION
// ============================================

/// Rows requested per datatable page (qopts.per_page)
pub const TABLE_PAGE_SIZE: u32 = 10_000;

/// Cursor follow-ups allowed per table invocation.
/// Together with TABLE_PAGE_SIZE this caps a table at roughly 100k rows.
pub const TABLE_MAX_PAGES: u32 = 10;

/// Property selector that expands to every column
pub const WILDCARD: &str = "*";
