//! Shared result types
//!
//! Function output is a rectangular grid: one header row of property
//! names followed by data rows, ready to spill into a spreadsheet range.

use serde_json::Value;

/// A single spreadsheet cell. Upstream values pass through as-is;
/// missing columns and JSON nulls become empty strings.
pub type Cell = Value;

/// Rectangular function output
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    truncated: bool,
}

impl Grid {
    /// Start a grid with its header row
    pub fn with_header(header: &[String]) -> Self {
        let header_row = header.iter().map(|h| Value::String(h.clone())).collect();
        Self {
            rows: vec![header_row],
            truncated: false,
        }
    }

    /// Append a data row
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Number of data rows (the header row is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Number of columns, per the header row
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// All rows, header first
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Consume the grid into its rows
    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    /// Whether rows were dropped by a pagination budget
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Flag the grid as incomplete
    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grid_counts() {
        let mut grid = Grid::with_header(&["date".to_string(), "high".to_string()]);
        assert_eq!(grid.row_count(), 0);
        assert_eq!(grid.column_count(), 2);

        grid.push_row(vec![json!("2019-09-03"), json!(7823.26)]);
        grid.push_row(vec![json!("2019-09-04"), json!(7906.48)]);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.rows().len(), 3);
    }

    #[test]
    fn test_grid_header_row_is_first() {
        let grid = Grid::with_header(&["ticker".to_string()]);
        assert_eq!(grid.rows()[0], vec![json!("ticker")]);
    }

    #[test]
    fn test_truncation_flag() {
        let mut grid = Grid::with_header(&["a".to_string()]);
        assert!(!grid.truncated());
        grid.mark_truncated();
        assert!(grid.truncated());
    }
}
