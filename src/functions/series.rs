//! `quandl-series` - time-series contents with column and date filtering

use tracing::info;

use super::args::{self, BoundArgs};
use crate::models::errors::AppResult;
use crate::models::types::Grid;
use crate::providers::quandl::{Dataset, QuandlClient};

/// Run `quandl-series` against bound arguments
pub async fn run(client: &QuandlClient, args: &BoundArgs) -> AppResult<Grid> {
    let name = args.text("name")?;
    let properties = args.text_list("properties")?;
    let mindate = args.date("mindate")?.format("%Y-%m-%d").to_string();
    let maxdate = args.date("maxdate")?.format("%Y-%m-%d").to_string();

    let dataset = client
        .dataset(&name, Some(&mindate), Some(&maxdate))
        .await?;

    let grid = grid_from_dataset(&dataset, &properties);
    info!(
        "📈 quandl-series {}: {} rows x {} columns",
        name,
        grid.row_count(),
        grid.column_count()
    );
    Ok(grid)
}

/// Project a dataset into a grid: a header row of the selected
/// properties, then the projected data rows.
pub fn grid_from_dataset(dataset: &Dataset, requested: &[String]) -> Grid {
    let columns = args::normalize_columns(&dataset.column_names);
    let properties = args::select_properties(requested, &columns);
    let indices = args::projection_indices(&properties, &columns);

    let mut grid = Grid::with_header(&properties);
    for row in &dataset.data {
        grid.push_row(args::project_row(row, &indices));
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_dataset() -> Dataset {
        Dataset {
            column_names: vec![
                "Trade Date".to_string(),
                "High".to_string(),
                "Low".to_string(),
            ],
            data: vec![
                vec![json!("2019-09-03"), json!(7_601.74), json!(7_517.37)],
                vec![json!("2019-09-04"), json!(7_683.96), serde_json::Value::Null],
            ],
        }
    }

    #[test]
    fn test_wildcard_returns_all_columns() {
        let grid = grid_from_dataset(&sample_dataset(), &["*".to_string()]);
        assert_eq!(
            grid.rows()[0],
            vec![json!("trade date"), json!("high"), json!("low")]
        );
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn test_subset_projection_reorders() {
        let grid = grid_from_dataset(
            &sample_dataset(),
            &["low".to_string(), "trade date".to_string()],
        );
        assert_eq!(grid.rows()[0], vec![json!("low"), json!("trade date")]);
        assert_eq!(grid.rows()[1], vec![json!(7_517.37), json!("2019-09-03")]);
    }

    #[test]
    fn test_unknown_property_yields_empty_column() {
        let grid = grid_from_dataset(&sample_dataset(), &["volume".to_string()]);
        assert_eq!(grid.rows()[1], vec![json!("")]);
        assert_eq!(grid.rows()[2], vec![json!("")]);
    }

    #[test]
    fn test_null_cell_becomes_empty() {
        let grid = grid_from_dataset(&sample_dataset(), &["low".to_string()]);
        assert_eq!(grid.rows()[2], vec![json!("")]);
    }
}
