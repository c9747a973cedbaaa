//! Merging normalized tables into one time-ordered dataset.
//!
//! Tables are concatenated in the order given and then stably sorted by
//! timestamp, so rows sharing a timestamp keep their concatenation order.
//! Undated rows sort after every dated row.

use crate::constants::{DATETIME_COLUMN, SOURCE_COLUMN};
use crate::error::Result;
use crate::models::{CanonicalRow, MergedDataset, NormalizedTable};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

/// Ascending by timestamp, missing timestamps last
fn compare_rows(a: &CanonicalRow, b: &CanonicalRow) -> Ordering {
    match (a.datetime(), b.datetime()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Concatenate tables and sort the result by timestamp.
///
/// No deduplication: every input row appears exactly once in the output.
pub fn merge<I>(tables: I) -> MergedDataset
where
    I: IntoIterator<Item = NormalizedTable>,
{
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<CanonicalRow> = Vec::new();
    let mut table_count = 0usize;

    for table in tables {
        table_count += 1;
        for column in table.columns {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        rows.extend(table.rows);
    }

    // slice::sort_by is stable
    rows.sort_by(compare_rows);

    debug!(
        "Merged {} tables into {} rows across {} columns",
        table_count,
        rows.len(),
        columns.len()
    );

    MergedDataset { columns, rows }
}

impl MergedDataset {
    /// Readings of one column in dataset order; absent and missing are both `None`
    pub fn column_values(&self, column: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row.value(column)).collect()
    }

    /// Earliest and latest timestamps, ignoring undated rows
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut dated = self.rows.iter().filter_map(CanonicalRow::datetime);
        let first = dated.next()?;
        let last = dated.last().unwrap_or(first);
        Some((first, last))
    }

    /// Render as a polars DataFrame.
    ///
    /// Columns: `datetime` (millisecond Datetime), `source` (file identifier),
    /// then one Float64 column per measurement with missing readings as null.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let timestamps: Vec<Option<i64>> = self
            .rows
            .iter()
            .map(|row| row.datetime().map(|dt| dt.and_utc().timestamp_millis()))
            .collect();
        let datetime = Series::new(DATETIME_COLUMN.into(), timestamps)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let sources: Vec<&str> = self.rows.iter().map(CanonicalRow::source).collect();

        let mut frame_columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 2);
        frame_columns.push(datetime.into());
        frame_columns.push(Series::new(SOURCE_COLUMN.into(), sources).into());

        for column in &self.columns {
            let values = self.column_values(column);
            frame_columns.push(Series::new(column.as_str().into(), values).into());
        }

        Ok(DataFrame::new(frame_columns)?)
    }
}
