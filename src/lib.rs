//! Quandl Function Pack
//!
//! Self-hosted rendition of the Quandl spreadsheet functions:
//! - `quandl-series`: time-series contents with column and date filtering
//! - `quandl-table`: datatable contents with filters and cursor pagination
//! - `quandl-list`: full table or series contents
//!
//! Functions are invoked by name with positional arguments, over HTTP
//! (`quandl_api`) or from the command line (`quandl_runner`).

pub mod api;
pub mod config;
pub mod functions;
pub mod models;
pub mod providers;
pub mod telemetry;
pub mod utils;

pub use config::PackConfig;
pub use functions::manifest::{FunctionSpec, ParamKind, ParamSpec};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::Grid;
pub use providers::quandl::QuandlClient;
pub use telemetry::{TelemetryCollector, TelemetryStats};
pub use utils::cache::{CacheStats, GridCache};
