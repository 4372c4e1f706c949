//! Integration tests for the function pack

use quandl_functions::functions::args::BoundArgs;
use quandl_functions::functions::series::grid_from_dataset;
use quandl_functions::functions::table::parse_filter;
use quandl_functions::functions::{self, manifest};
use quandl_functions::providers::quandl::{Dataset, QuandlClient};
use quandl_functions::{ErrorCode, PackConfig};
use serde_json::json;

#[test]
fn test_manifest_covers_published_functions() {
    let names: Vec<&str> = manifest::manifest().iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["quandl-series", "quandl-table", "quandl-list"]);
}

#[test]
fn test_series_binding_to_projection() {
    // End to end: positional args -> bound params -> projected grid
    let spec = manifest::find("quandl-series").unwrap();
    let bound = BoundArgs::bind(
        spec,
        &[
            json!("NASDAQOMX/XNDXT25"),
            json!("trade date, high"),
            json!("2019-09-01"),
            json!("2019-09-30"),
        ],
    )
    .unwrap();

    assert_eq!(
        bound.date("mindate").unwrap().format("%Y-%m-%d").to_string(),
        "2019-09-01"
    );

    let dataset = Dataset {
        column_names: vec![
            "Trade Date".to_string(),
            "Index Value".to_string(),
            "High".to_string(),
            "Low".to_string(),
        ],
        data: vec![
            vec![
                json!("2019-09-03"),
                json!(7_573.26),
                json!(7_601.74),
                json!(7_517.37),
            ],
            vec![
                json!("2019-09-04"),
                json!(7_672.58),
                json!(7_683.96),
                json!(7_622.15),
            ],
        ],
    };

    let properties = bound.text_list("properties").unwrap();
    let grid = grid_from_dataset(&dataset, &properties);

    assert_eq!(grid.rows()[0], vec![json!("trade date"), json!("high")]);
    assert_eq!(grid.rows()[1], vec![json!("2019-09-03"), json!(7_601.74)]);
    assert_eq!(grid.row_count(), 2);
}

#[test]
fn test_spreadsheet_serial_dates_bind() {
    let spec = manifest::find("quandl-series").unwrap();
    let bound = BoundArgs::bind(spec, &[json!("HKEX/83079"), json!("*"), json!(2)]).unwrap();
    assert_eq!(
        bound.date("mindate").unwrap().format("%Y-%m-%d").to_string(),
        "1900-01-02"
    );
}

#[test]
fn test_table_filter_parsing_matches_upstream_expectations() {
    // Repeated keys collapse into one comma-delimited value
    assert_eq!(
        parse_filter("ticker=AAPL&ticker=GOOG&investorname=VANGUARD GROUP INC"),
        vec![
            ("ticker".to_string(), "AAPL,GOOG".to_string()),
            (
                "investorname".to_string(),
                "VANGUARD GROUP INC".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_invoke_rejects_unknown_function() {
    let client = QuandlClient::new(&PackConfig::with_api_key("test-key")).unwrap();
    let err = functions::invoke(&client, "quandl-news", &[json!("X")])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FnUnknownFunction);
}

#[tokio::test]
async fn test_invoke_rejects_missing_required_param() {
    let client = QuandlClient::new(&PackConfig::with_api_key("test-key")).unwrap();
    let err = functions::invoke(&client, "quandl-table", &[])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FnMissingParam);
}
