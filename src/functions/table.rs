//! `quandl-table` - datatable contents with filters and cursor pagination

use tracing::{info, warn};
use url::form_urlencoded;

use super::args::{self, BoundArgs};
use crate::models::errors::AppResult;
use crate::models::types::Grid;
use crate::providers::quandl::QuandlClient;

/// Query keys a user filter may not set
const RESERVED_KEYS: &[&str] = &["api_key"];

/// Run `quandl-table` against bound arguments
pub async fn run(client: &QuandlClient, args: &BoundArgs) -> AppResult<Grid> {
    let name = args.text("name")?;
    let properties = args.text_list("properties")?;
    let filter = args.text("filter")?;
    let filters = parse_filter(&filter);

    let first = client.datatable_page(&name, &filters, None).await?;

    let column_names: Vec<String> = first
        .table
        .columns
        .iter()
        .map(|c| c.name.clone())
        .collect();
    let columns = args::normalize_columns(&column_names);
    let selected = args::select_properties(&properties, &columns);
    let indices = args::projection_indices(&selected, &columns);

    let mut grid = Grid::with_header(&selected);
    for row in &first.table.data {
        grid.push_row(args::project_row(row, &indices));
    }

    // Follow the cursor; the page budget caps a runaway table
    let mut cursor = first.next_cursor;
    let mut pages_followed: u32 = 0;
    while let Some(cursor_id) = cursor {
        if pages_followed >= client.max_pages() {
            warn!("⚠️ quandl-table {}: page budget reached, truncating", name);
            grid.mark_truncated();
            break;
        }

        let page = client
            .datatable_page(&name, &filters, Some(&cursor_id))
            .await?;
        for row in &page.table.data {
            grid.push_row(args::project_row(row, &indices));
        }
        cursor = page.next_cursor;
        pages_followed += 1;
    }

    info!(
        "📊 quandl-table {}: {} rows across {} pages{}",
        name,
        grid.row_count(),
        pages_followed + 1,
        if grid.truncated() { " (truncated)" } else { "" }
    );
    Ok(grid)
}

/// Parse the filter query string into upstream query pairs.
///
/// Repeated keys merge into one comma-delimited value, matching how the
/// upstream expects multi-value filters:
/// - `ticker=AAPL&ticker=GOOG` -> `ticker=AAPL,GOOG`
/// - `ticker=AAPL,GOOG`        -> `ticker=AAPL,GOOG`
///
/// Reserved keys and `qopts.*` options are dropped; those belong to the
/// client, not the caller.
pub fn parse_filter(filter: &str) -> Vec<(String, String)> {
    let trimmed = filter.trim().trim_start_matches('?');
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
        let key = key.into_owned();
        if key.is_empty() || RESERVED_KEYS.contains(&key.as_str()) || key.starts_with("qopts.") {
            continue;
        }
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            None => pairs.push((key, value.into_owned())),
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_single_pair() {
        assert_eq!(
            parse_filter("ticker=AAPL"),
            vec![("ticker".to_string(), "AAPL".to_string())]
        );
    }

    #[test]
    fn test_parse_filter_merges_repeated_keys() {
        assert_eq!(
            parse_filter("ticker=AAPL&ticker=GOOG"),
            vec![("ticker".to_string(), "AAPL,GOOG".to_string())]
        );
    }

    #[test]
    fn test_parse_filter_passes_comma_lists_through() {
        assert_eq!(
            parse_filter("ticker=AAPL,MSFT&investorname=VANGUARD GROUP INC"),
            vec![
                ("ticker".to_string(), "AAPL,MSFT".to_string()),
                (
                    "investorname".to_string(),
                    "VANGUARD GROUP INC".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_parse_filter_decodes_escapes() {
        assert_eq!(
            parse_filter("investorname=VANGUARD%20GROUP%20INC"),
            vec![(
                "investorname".to_string(),
                "VANGUARD GROUP INC".to_string()
            )]
        );
    }

    #[test]
    fn test_parse_filter_strips_reserved_keys() {
        assert_eq!(
            parse_filter("api_key=steal&qopts.per_page=5&ticker=AAPL"),
            vec![("ticker".to_string(), "AAPL".to_string())]
        );
    }

    #[test]
    fn test_parse_filter_empty() {
        assert!(parse_filter("").is_empty());
        assert!(parse_filter("   ").is_empty());
    }
}
