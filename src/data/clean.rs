use super::model::{CellValue, Table};
use crate::error::PredictError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How `preprocess` decides whether to drop the first data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FirstRowPolicy {
    /// Always drop the first row.
    Unconditional,
    /// Drop the first row only when every non-missing cell in it is an
    /// integral number, i.e. it looks like a repeated header / id row.
    NumericHeuristic,
}

#[derive(Debug, Clone, Copy)]
pub struct CleanOptions {
    /// Columns whose missing-value share exceeds this percentage are
    /// dropped. Must lie in [0, 100]; the bound itself keeps the column.
    pub threshold_percent: f64,
    pub drop_first_row: bool,
    pub first_row_policy: FirstRowPolicy,
}

impl Default for CleanOptions {
    fn default() -> Self {
        CleanOptions {
            threshold_percent: 99.0,
            drop_first_row: true,
            first_row_policy: FirstRowPolicy::Unconditional,
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Clean a loaded table, in order:
///
/// 1. optionally drop the first data row (per [`FirstRowPolicy`]),
/// 2. drop columns whose missing ratio exceeds the threshold,
/// 3. fill every remaining missing cell with an empty string.
///
/// Surviving columns keep their relative order; surviving rows keep
/// theirs. The input table is not modified.
pub fn preprocess(table: &Table, opts: &CleanOptions) -> Result<Table, PredictError> {
    if !(0.0..=100.0).contains(&opts.threshold_percent) {
        return Err(PredictError::InvalidThreshold(opts.threshold_percent));
    }

    let mut rows: Vec<Vec<CellValue>> = table.rows().to_vec();
    if opts.drop_first_row && should_drop_first_row(&rows, opts.first_row_policy) {
        rows.remove(0);
    }

    let threshold = opts.threshold_percent / 100.0;
    let keep: Vec<usize> = (0..table.n_cols())
        .filter(|&col| missing_ratio(&rows, col) <= threshold)
        .collect();

    let columns: Vec<String> = keep
        .iter()
        .map(|&col| table.columns()[col].clone())
        .collect();

    let rows: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|row| {
            keep.iter()
                .map(|&col| match &row[col] {
                    CellValue::Null => CellValue::String(String::new()),
                    cell => cell.clone(),
                })
                .collect()
        })
        .collect();

    Ok(Table::from_parts(columns, rows))
}

fn should_drop_first_row(rows: &[Vec<CellValue>], policy: FirstRowPolicy) -> bool {
    let Some(first) = rows.first() else {
        return false;
    };
    match policy {
        FirstRowPolicy::Unconditional => true,
        FirstRowPolicy::NumericHeuristic => first
            .iter()
            .filter(|cell| !cell.is_null())
            .all(CellValue::is_integral),
    }
}

/// Fraction of rows whose cell in `col` is missing. A table with no rows
/// counts as having no missing data (0/0 is 0).
fn missing_ratio(rows: &[Vec<CellValue>], col: usize) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let missing = rows.iter().filter(|row| row[col].is_null()).count();
    missing as f64 / rows.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn int(i: i64) -> CellValue {
        CellValue::Integer(i)
    }

    /// `[{"a":1,"b":None},{"a":2,"b":3}]`
    fn sample_table() -> Table {
        Table::from_parts(
            vec!["a".into(), "b".into()],
            vec![vec![int(1), CellValue::Null], vec![int(2), int(3)]],
        )
    }

    fn no_first_row_drop(threshold_percent: f64) -> CleanOptions {
        CleanOptions {
            threshold_percent,
            drop_first_row: false,
            ..CleanOptions::default()
        }
    }

    #[test]
    fn threshold_out_of_range_fails() {
        let table = sample_table();
        for t in [-1.0, -0.01, 100.5, 101.0, f64::NAN] {
            let err = preprocess(&table, &no_first_row_drop(t)).unwrap_err();
            assert!(matches!(err, PredictError::InvalidThreshold(_)), "t={t}");
        }
    }

    #[test]
    fn column_on_the_boundary_is_kept_and_filled() {
        // b is 50% missing; threshold 50 keeps it (inclusive bound)
        let out = preprocess(&sample_table(), &no_first_row_drop(50.0)).unwrap();
        assert_eq!(out.columns(), ["a", "b"]);
        assert_eq!(out.cell(0, 1), &cell(""));
        assert_eq!(out.cell(1, 1), &int(3));
    }

    #[test]
    fn column_above_the_boundary_is_dropped() {
        let out = preprocess(&sample_table(), &no_first_row_drop(10.0)).unwrap();
        assert_eq!(out.columns(), ["a"]);
        assert_eq!(out.rows(), [vec![int(1)], vec![int(2)]]);
    }

    #[test]
    fn no_missing_cells_survive() {
        let table = Table::from_parts(
            vec!["x".into(), "y".into()],
            vec![
                vec![CellValue::Null, cell("p")],
                vec![int(5), CellValue::Null],
                vec![CellValue::Null, cell("q")],
            ],
        );
        let out = preprocess(&table, &no_first_row_drop(99.0)).unwrap();
        for row in out.rows() {
            for c in row {
                assert!(!c.is_null());
            }
        }
        assert_eq!(out.cell(0, 0), &cell(""));
    }

    #[test]
    fn unconditional_drop_removes_exactly_one_row_in_order() {
        let table = Table::from_parts(
            vec!["a".into()],
            vec![vec![cell("first")], vec![cell("second")], vec![cell("third")]],
        );
        let out = preprocess(&table, &CleanOptions::default()).unwrap();
        assert_eq!(out.n_rows(), table.n_rows() - 1);
        assert_eq!(out.cell(0, 0), &cell("second"));
        assert_eq!(out.cell(1, 0), &cell("third"));
    }

    #[test]
    fn numeric_heuristic_drops_integral_first_row() {
        let table = Table::from_parts(
            vec!["a".into(), "b".into()],
            vec![
                vec![int(0), CellValue::Float(1.0)],
                vec![cell("real"), cell("data")],
            ],
        );
        let opts = CleanOptions {
            first_row_policy: FirstRowPolicy::NumericHeuristic,
            ..CleanOptions::default()
        };
        let out = preprocess(&table, &opts).unwrap();
        assert_eq!(out.n_rows(), 1);
        assert_eq!(out.cell(0, 0), &cell("real"));
    }

    #[test]
    fn numeric_heuristic_keeps_textual_first_row() {
        let table = Table::from_parts(
            vec!["a".into(), "b".into()],
            vec![
                vec![cell("alice"), int(1)],
                vec![cell("bob"), int(2)],
            ],
        );
        let opts = CleanOptions {
            first_row_policy: FirstRowPolicy::NumericHeuristic,
            ..CleanOptions::default()
        };
        let out = preprocess(&table, &opts).unwrap();
        assert_eq!(out.n_rows(), 2);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = preprocess(&sample_table(), &no_first_row_drop(50.0)).unwrap();
        let twice = preprocess(&once, &no_first_row_drop(50.0)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_table_keeps_its_columns() {
        let table = Table::new(vec!["a".into(), "b".into()]);
        let out = preprocess(&table, &CleanOptions::default()).unwrap();
        assert_eq!(out.columns(), ["a", "b"]);
        assert!(out.is_empty());
    }
}
