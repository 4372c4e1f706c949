//! Function manifest
//!
//! Static descriptions of the callable functions: names, titles, ordered
//! parameters and example invocations, as published to callers via
//! `GET /v1/functions`. Parameter order IS the positional binding order.

use serde::Serialize;

use crate::utils::constants::{DEFAULT_MAX_DATE, DEFAULT_MIN_DATE, WILDCARD};

/// Kind of a positional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free-text value
    Text,
    /// Comma-separated text or an array of strings
    TextList,
    /// ISO date or spreadsheet serial number
    Date,
}

/// A single positional parameter
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    /// Textual default applied when the argument is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

/// A callable function in the pack
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub examples: &'static [&'static str],
}

const SERIES_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "name",
        kind: ParamKind::Text,
        required: true,
        description: "The code of the time series to return",
        default: None,
    },
    ParamSpec {
        name: "properties",
        kind: ParamKind::TextList,
        required: false,
        description: "The columns to return; use \"*\" to return everything",
        default: Some(WILDCARD),
    },
    ParamSpec {
        name: "mindate",
        kind: ParamKind::Date,
        required: false,
        description: "The minimum date for the time series to return",
        default: Some(DEFAULT_MIN_DATE),
    },
    ParamSpec {
        name: "maxdate",
        kind: ParamKind::Date,
        required: false,
        description: "The maximum date for the time series to return",
        default: Some(DEFAULT_MAX_DATE),
    },
];

const TABLE_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "name",
        kind: ParamKind::Text,
        required: true,
        description: "The code of the table to return",
        default: None,
    },
    ParamSpec {
        name: "properties",
        kind: ParamKind::TextList,
        required: false,
        description: "The columns to return; use \"*\" to return everything",
        default: Some(WILDCARD),
    },
    ParamSpec {
        name: "filter",
        kind: ParamKind::Text,
        required: false,
        description: "Filter as a URL query string; allowed keys are table-dependent",
        default: Some(""),
    },
];

const LIST_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "name",
        kind: ParamKind::Text,
        required: true,
        description: "The code of the table or series to return",
        default: None,
    },
    ParamSpec {
        name: "properties",
        kind: ParamKind::TextList,
        required: false,
        description: "The columns to return; use \"*\" to return everything",
        default: Some(WILDCARD),
    },
];

const MANIFEST: &[FunctionSpec] = &[
    FunctionSpec {
        name: "quandl-series",
        title: "Quandl Series",
        description: "Returns the contents of a time series on Quandl",
        params: SERIES_PARAMS,
        examples: &[
            "\"NASDAQOMX/XNDXT25\"",
            "\"NASDAQOMX/XNDXT25\", \"*\"",
            "\"NASDAQOMX/XNDXT25\", \"trade date, low, high\"",
            "\"NASDAQOMX/XNDXT25\", \"*\", \"2019-09-01\", \"2019-09-30\"",
        ],
    },
    FunctionSpec {
        name: "quandl-table",
        title: "Quandl Table",
        description: "Returns the contents of a table on Quandl",
        params: TABLE_PARAMS,
        examples: &[
            "\"SHARADAR/SF3\"",
            "\"SHARADAR/SF3\", \"*\", \"ticker=AAPL\"",
            "\"SHARADAR/SF3\", \"*\", \"ticker=AAPL,MSFT&investorname=VANGUARD GROUP INC\"",
        ],
    },
    FunctionSpec {
        name: "quandl-list",
        title: "Quandl List Table",
        description: "Returns the full contents of a table or series on Quandl",
        params: LIST_PARAMS,
        examples: &[
            "\"HKEX/83079\"",
            "\"HKEX/83079\", \"date, nominal price, high, low\"",
        ],
    },
];

/// All functions in the pack
pub fn manifest() -> &'static [FunctionSpec] {
    MANIFEST
}

/// Look up a function by its invocable name
pub fn find(name: &str) -> Option<&'static FunctionSpec> {
    MANIFEST.iter().find(|f| f.name == name)
}
