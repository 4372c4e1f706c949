//! `quandl-list` - full series contents, no date range

use tracing::info;

use super::args::BoundArgs;
use super::series;
use crate::models::errors::AppResult;
use crate::models::types::Grid;
use crate::providers::quandl::QuandlClient;

/// Run `quandl-list` against bound arguments
pub async fn run(client: &QuandlClient, args: &BoundArgs) -> AppResult<Grid> {
    let name = args.text("name")?;
    let properties = args.text_list("properties")?;

    let dataset = client.dataset(&name, None, None).await?;

    let grid = series::grid_from_dataset(&dataset, &properties);
    info!("📋 quandl-list {}: {} rows", name, grid.row_count());
    Ok(grid)
}
