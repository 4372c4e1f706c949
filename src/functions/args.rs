//! Positional argument binding and coercion
//!
//! Spreadsheet formulas pass arguments by position. Binding zips the
//! incoming values against a function's parameter specs (trailing extras
//! are dropped), then coerces each value to its declared kind on access.
//!
//! Also home to the column-selection helpers shared by every operation:
//! column normalization, wildcard expansion and row projection.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde_json::Value;

use super::manifest::FunctionSpec;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::WILDCARD;

/// Arguments bound to a function's parameter specs
#[derive(Debug, Clone)]
pub struct BoundArgs {
    values: HashMap<&'static str, Value>,
}

impl BoundArgs {
    /// Zip positional arguments against the spec. Missing optional
    /// parameters take their default; extras past the spec are ignored.
    pub fn bind(spec: &FunctionSpec, args: &[Value]) -> AppResult<Self> {
        let mut values = HashMap::new();

        for (i, param) in spec.params.iter().enumerate() {
            match args.get(i) {
                Some(v) if !v.is_null() => {
                    values.insert(param.name, v.clone());
                }
                _ => {
                    if param.required {
                        return Err(AppError::missing_param(spec.name, param.name));
                    }
                    if let Some(default) = param.default {
                        values.insert(param.name, Value::String(default.to_string()));
                    }
                }
            }
        }

        Ok(Self { values })
    }

    /// Text parameter; numbers are accepted and stringified
    pub fn text(&self, name: &'static str) -> AppResult<String> {
        coerce_text(name, self.get(name)?)
    }

    /// List parameter; see [`coerce_text_list`] for accepted shapes
    pub fn text_list(&self, name: &'static str) -> AppResult<Vec<String>> {
        coerce_text_list(name, self.get(name)?)
    }

    /// Date parameter; ISO string or spreadsheet serial number
    pub fn date(&self, name: &'static str) -> AppResult<NaiveDate> {
        coerce_date(name, self.get(name)?)
    }

    fn get(&self, name: &'static str) -> AppResult<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| AppError::invalid_param(name, "parameter not bound"))
    }
}

fn coerce_text(name: &str, value: &Value) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(AppError::invalid_param(name, "must be text")),
    }
}

/// A string splits on commas; an array must hold only strings. One level
/// of nested arrays is flattened, because a spreadsheet range arrives as
/// rows of cells.
fn coerce_text_list(name: &str, value: &Value) -> AppResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(s.split(',').map(str::to_string).collect()),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    Value::Array(inner) => {
                        for cell in inner {
                            match cell {
                                Value::String(s) => out.push(s.clone()),
                                _ => {
                                    return Err(AppError::invalid_param(
                                        name,
                                        "must be a list with only string values",
                                    ))
                                }
                            }
                        }
                    }
                    _ => {
                        return Err(AppError::invalid_param(
                            name,
                            "must be a list with only string values",
                        ))
                    }
                }
            }
            Ok(out)
        }
        _ => Err(AppError::invalid_param(
            name,
            "must be a string or a list of strings",
        )),
    }
}

/// Dates arrive as ISO strings or as spreadsheet serial numbers
/// (days since 1900; serial 1 is 1900-01-01).
fn coerce_date(name: &str, value: &Value) -> AppResult<NaiveDate> {
    match value {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::invalid_date(format!("{}: not a YYYY-MM-DD date: {}", name, s))),
        Value::Number(n) => {
            let serial = n
                .as_f64()
                .ok_or_else(|| AppError::invalid_date(format!("{}: not a finite number", name)))?;
            serial_to_date(name, serial)
        }
        _ => Err(AppError::invalid_date(format!(
            "{}: must be a date string or serial number",
            name
        ))),
    }
}

fn serial_to_date(name: &str, serial: f64) -> AppResult<NaiveDate> {
    let days = serial.trunc() as i64;
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1).expect("1900-01-01 is a valid date");
    epoch
        .checked_add_signed(Duration::days(days - 1))
        .ok_or_else(|| AppError::invalid_date(format!("{}: serial date out of range: {}", name, serial)))
}

// ============================================
// Column selection
// ============================================

/// Lowercase and trim response column names
pub fn normalize_columns(columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| c.trim().to_lowercase()).collect()
}

/// Normalize requested properties and expand the wildcard
pub fn select_properties(requested: &[String], columns: &[String]) -> Vec<String> {
    let requested: Vec<String> = requested.iter().map(|p| p.trim().to_lowercase()).collect();
    if requested.len() == 1 && requested[0] == WILDCARD {
        columns.to_vec()
    } else {
        requested
    }
}

/// Map each selected property to its column index, if any
pub fn projection_indices(properties: &[String], columns: &[String]) -> Vec<Option<usize>> {
    properties
        .iter()
        .map(|p| columns.iter().position(|c| c == p))
        .collect()
}

/// Project a data row through the selection. Missing columns and JSON
/// nulls become empty cells so the grid stays rectangular.
pub fn project_row(row: &[Value], indices: &[Option<usize>]) -> Vec<Value> {
    indices
        .iter()
        .map(|idx| match idx.and_then(|i| row.get(i)) {
            Some(Value::Null) | None => Value::String(String::new()),
            Some(v) => v.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::manifest;
    use serde_json::json;

    fn series_spec() -> &'static FunctionSpec {
        manifest::find("quandl-series").expect("series spec")
    }

    #[test]
    fn test_bind_applies_defaults() {
        let bound = BoundArgs::bind(series_spec(), &[json!("NASDAQOMX/XNDXT25")]).unwrap();
        assert_eq!(bound.text("name").unwrap(), "NASDAQOMX/XNDXT25");
        assert_eq!(bound.text_list("properties").unwrap(), vec!["*"]);
        assert_eq!(
            bound.date("mindate").unwrap(),
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
        );
        assert_eq!(
            bound.date("maxdate").unwrap(),
            NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_bind_missing_required() {
        let err = BoundArgs::bind(series_spec(), &[]).unwrap_err();
        assert_eq!(err.code_str(), "FN_MISSING_PARAM");
    }

    #[test]
    fn test_bind_ignores_extra_args() {
        let bound = BoundArgs::bind(
            series_spec(),
            &[
                json!("NASDAQOMX/XNDXT25"),
                json!("*"),
                json!("2019-09-01"),
                json!("2019-09-30"),
                json!("unexpected"),
            ],
        )
        .unwrap();
        assert_eq!(bound.text("name").unwrap(), "NASDAQOMX/XNDXT25");
    }

    #[test]
    fn test_bind_null_takes_default() {
        let bound =
            BoundArgs::bind(series_spec(), &[json!("HKEX/83079"), Value::Null]).unwrap();
        assert_eq!(bound.text_list("properties").unwrap(), vec!["*"]);
    }

    #[test]
    fn test_text_from_number() {
        let bound = BoundArgs::bind(series_spec(), &[json!(83079)]).unwrap();
        assert_eq!(bound.text("name").unwrap(), "83079");
    }

    #[test]
    fn test_list_from_comma_string() {
        let bound = BoundArgs::bind(
            series_spec(),
            &[json!("X"), json!("trade date, low, high")],
        )
        .unwrap();
        assert_eq!(
            bound.text_list("properties").unwrap(),
            vec!["trade date", " low", " high"]
        );
    }

    #[test]
    fn test_list_flattens_nested_range() {
        let bound = BoundArgs::bind(
            series_spec(),
            &[json!("X"), json!([["trade date", "low"], ["high"]])],
        )
        .unwrap();
        assert_eq!(
            bound.text_list("properties").unwrap(),
            vec!["trade date", "low", "high"]
        );
    }

    #[test]
    fn test_list_rejects_non_strings() {
        let bound = BoundArgs::bind(series_spec(), &[json!("X"), json!(["low", 7])]).unwrap();
        let err = bound.text_list("properties").unwrap_err();
        assert_eq!(err.code_str(), "FN_INVALID_PARAM");
    }

    #[test]
    fn test_date_from_serial() {
        let bound = BoundArgs::bind(series_spec(), &[json!("X"), json!("*"), json!(1)]).unwrap();
        assert_eq!(
            bound.date("mindate").unwrap(),
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
        );

        // 1900 is not a leap year, so serial 367 lands on Jan 2nd
        let bound = BoundArgs::bind(series_spec(), &[json!("X"), json!("*"), json!(367)]).unwrap();
        assert_eq!(
            bound.date("mindate").unwrap(),
            NaiveDate::from_ymd_opt(1901, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_date_rejects_garbage() {
        let bound =
            BoundArgs::bind(series_spec(), &[json!("X"), json!("*"), json!("yesterday")]).unwrap();
        let err = bound.date("mindate").unwrap_err();
        assert_eq!(err.code_str(), "FN_INVALID_DATE");
    }

    #[test]
    fn test_select_properties_wildcard() {
        let columns = vec!["trade date".to_string(), "high".to_string()];
        let selected = select_properties(&["*".to_string()], &columns);
        assert_eq!(selected, columns);
    }

    #[test]
    fn test_select_properties_normalizes() {
        let columns = vec!["trade date".to_string()];
        let selected = select_properties(&[" Trade Date ".to_string()], &columns);
        assert_eq!(selected, vec!["trade date"]);
    }

    #[test]
    fn test_project_row_fills_gaps() {
        let columns = vec!["date".to_string(), "high".to_string(), "low".to_string()];
        let props = vec!["low".to_string(), "volume".to_string(), "date".to_string()];
        let indices = projection_indices(&props, &columns);

        let row = vec![json!("2019-09-03"), json!(7906.48), Value::Null];
        let projected = project_row(&row, &indices);
        assert_eq!(projected, vec![json!(""), json!(""), json!("2019-09-03")]);
    }
}
