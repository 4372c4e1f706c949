//! The function pack: manifest, argument binding, and the operations
//!
//! Functions are invoked by name with positional arguments, exactly as a
//! spreadsheet formula supplies them.

pub mod args;
pub mod list;
pub mod manifest;
pub mod series;
pub mod table;

use serde_json::Value;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::Grid;
use crate::providers::quandl::QuandlClient;
use args::BoundArgs;

/// Invoke a pack function by name with positional arguments
pub async fn invoke(client: &QuandlClient, name: &str, params: &[Value]) -> AppResult<Grid> {
    let spec = manifest::find(name).ok_or_else(|| AppError::unknown_function(name))?;
    let bound = BoundArgs::bind(spec, params)?;

    match spec.name {
        "quandl-series" => series::run(client, &bound).await,
        "quandl-table" => table::run(client, &bound).await,
        "quandl-list" => list::run(client, &bound).await,
        other => Err(AppError::unknown_function(other)),
    }
}
