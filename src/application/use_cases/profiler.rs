//! Numeric profiling of decoded rows.
//!
//! Columns come from the first row only. Every cell of such a column is run
//! through [`parse_number`]; cells that do not parse are skipped without
//! affecting the row count.

use indexmap::IndexMap;
use tracing::debug;

use crate::domain::dataset::{ColumnStat, DatasetProfile, Row};

pub fn profile(rows: &[Row]) -> DatasetProfile {
    let Some(first_row) = rows.first() else {
        return DatasetProfile::empty();
    };

    let mut numeric_cols = IndexMap::new();
    for column in first_row.keys() {
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter_map(|value| parse_number(value))
            .collect();

        match ColumnStat::from_values(&values) {
            Some(stat) => {
                numeric_cols.insert(column.clone(), stat);
            }
            None => debug!(column = %column, "Column has no numeric values"),
        }
    }

    DatasetProfile {
        row_count: rows.len(),
        numeric_cols,
    }
}

/// Decimal float parsing after trimming surrounding whitespace.
/// Empty text, non-numeric text and non-finite results yield `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(column: &str, values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert(column.to_string(), v.to_string());
                row
            })
            .collect()
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(profile(&[]), DatasetProfile::empty());
        assert_eq!(profile(&[]).row_count, 0);
        assert!(profile(&[]).numeric_cols.is_empty());
    }

    #[test]
    fn test_basic_statistics() {
        let result = profile(&rows("n", &["2", "4", "6"]));
        let stat = result.numeric_cols["n"];

        assert_eq!(result.row_count, 3);
        assert_eq!(stat.count, 3);
        assert_eq!(stat.sum, 12.0);
        assert_eq!(stat.avg, 4.0);
        assert_eq!(stat.min, 2.0);
        assert_eq!(stat.max, 6.0);
    }

    #[test]
    fn test_unparseable_values_are_skipped() {
        let result = profile(&rows("amt", &["10", "20", "x"]));
        let stat = result.numeric_cols["amt"];

        assert_eq!(result.row_count, 3);
        assert_eq!(stat.count, 2);
        assert_eq!(stat.sum, 30.0);
        assert_eq!(stat.avg, 15.0);
        assert_eq!(stat.min, 10.0);
        assert_eq!(stat.max, 20.0);
    }

    #[test]
    fn test_text_column_is_absent() {
        let data = vec![
            row(&[("name", "alice"), ("score", "1")]),
            row(&[("name", "bob"), ("score", "3")]),
        ];
        let result = profile(&data);

        assert!(!result.numeric_cols.contains_key("name"));
        assert_eq!(result.numeric_cols["score"].avg, 2.0);
    }

    #[test]
    fn test_columns_follow_first_row() {
        let data = vec![
            row(&[("b", "1"), ("a", "2")]),
            row(&[("b", "3"), ("a", "4"), ("late", "99")]),
            row(&[("a", "6")]),
        ];
        let result = profile(&data);

        let columns: Vec<&str> = result.numeric_cols.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["b", "a"]);
        assert_eq!(result.numeric_cols["b"].count, 2);
        assert_eq!(result.numeric_cols["a"].count, 3);
        assert_eq!(result.row_count, 3);
    }

    #[test]
    fn test_all_rows_unparseable_gives_no_columns() {
        let result = profile(&rows("v", &["", " ", "n/a"]));
        assert_eq!(result.row_count, 3);
        assert!(result.numeric_cols.is_empty());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.5e3"), Some(-1500.0));
        assert_eq!(parse_number("+.5"), Some(0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e400"), None);
    }

    #[test]
    fn test_row_count_matches_input_length() {
        for n in [1usize, 5, 17] {
            let values: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = values.iter().map(String::as_str).collect();
            assert_eq!(profile(&rows("i", &refs)).row_count, n);
        }
    }
}
