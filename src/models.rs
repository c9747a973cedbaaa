//! Core data structures for NDBC synchronisation.
//!
//! Defines the raw per-file table, the schema variant enumeration, the
//! canonical row and table types, the merged dataset and the per-file
//! outcome records returned alongside it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Whitespace-delimited table exactly as read from one file.
///
/// Column names are whatever the file's header said; nothing has been
/// validated yet. Every row holds one raw cell per header column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, resizing each row to the header width.
    ///
    /// Short rows are padded with empty cells, which read as missing.
    pub fn new(header: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { header, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Raw cell at `row` for the named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// View one row as a column name -> raw cell mapping
    pub fn record(&self, row: usize) -> Option<BTreeMap<&str, &str>> {
        let cells = self.rows.get(row)?;
        Some(
            self.header
                .iter()
                .map(String::as_str)
                .zip(cells.iter().map(String::as_str))
                .collect(),
        )
    }
}

/// Historical column layouts of NDBC standard meteorological files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVariant {
    /// Mid 1980s to late 1990s: two digit `YY` year column
    LegacyYY,
    /// Late 1990s to ~2004: four digit `YYYY` year column
    LegacyYYYY,
    /// 2004 onwards: `#YY` header with a units legend row and minutes
    Modern,
    /// None of the marker columns were present
    Unrecognized,
}

impl SchemaVariant {
    /// Variants that have a normalization routine
    pub const KNOWN: [SchemaVariant; 3] = [
        SchemaVariant::LegacyYY,
        SchemaVariant::LegacyYYYY,
        SchemaVariant::Modern,
    ];

    pub fn is_known(&self) -> bool {
        !matches!(self, SchemaVariant::Unrecognized)
    }

    /// Recording era the layout was used in
    pub fn era(&self) -> &'static str {
        match self {
            SchemaVariant::LegacyYY => "mid 1980s to late 1990s",
            SchemaVariant::LegacyYYYY => "late 1990s to 2004",
            SchemaVariant::Modern => "2004 onwards",
            SchemaVariant::Unrecognized => "unknown",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaVariant::LegacyYY => "LegacyYY",
            SchemaVariant::LegacyYYYY => "LegacyYYYY",
            SchemaVariant::Modern => "Modern",
            SchemaVariant::Unrecognized => "Unrecognized",
        };
        f.write_str(name)
    }
}

/// One normalized observation.
///
/// Measurement values are keyed by canonical column name; `None` marks a
/// missing reading (sentinel, unparseable or empty cell).
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    datetime: Option<NaiveDateTime>,
    source: Arc<str>,
    values: BTreeMap<String, Option<f64>>,
}

impl CanonicalRow {
    pub fn new(
        datetime: Option<NaiveDateTime>,
        source: Arc<str>,
        values: BTreeMap<String, Option<f64>>,
    ) -> Self {
        Self {
            datetime,
            source,
            values,
        }
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.datetime
    }

    /// Identifier of the file this row came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Reading for `column`; `None` if missing or if the column is absent
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    /// Distinguishes an absent column (`None`) from a missing reading (`Some(None)`)
    pub fn get(&self, column: &str) -> Option<Option<f64>> {
        self.values.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn values(&self) -> &BTreeMap<String, Option<f64>> {
        &self.values
    }
}

/// Per-file counters collected during normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Leading units/legend rows discarded
    pub legend_rows: usize,
    /// Rows dropped because no timestamp could be built
    pub dropped_rows: usize,
    /// Rows kept without a timestamp
    pub undated_rows: usize,
    /// Cells that failed numeric parsing and became missing
    pub coerced_cells: usize,
    /// Cells replaced because they held a sentinel value
    pub sentinel_cells: usize,
}

/// The canonical form of a single file
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub file_id: String,
    pub variant: SchemaVariant,
    /// Canonical measurement columns in source order
    pub columns: Vec<String>,
    pub rows: Vec<CanonicalRow>,
    pub stats: NormalizationStats,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All normalized rows of a batch, sorted ascending by timestamp.
///
/// Undated rows (only produced under the keep policy) come last.
#[derive(Debug, Clone, Default)]
pub struct MergedDataset {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<CanonicalRow>,
}

impl MergedDataset {
    /// Union of measurement columns, in first-seen order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<CanonicalRow> {
        self.rows
    }
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Normalized {
        variant: SchemaVariant,
        rows: usize,
        stats: NormalizationStats,
    },
    Unrecognized {
        columns: Vec<String>,
    },
    LoadFailed {
        reason: String,
    },
    NormalizationFailed {
        variant: SchemaVariant,
        reason: String,
    },
}

impl FileStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, FileStatus::Normalized { .. })
    }

    pub fn variant(&self) -> SchemaVariant {
        match self {
            FileStatus::Normalized { variant, .. }
            | FileStatus::NormalizationFailed { variant, .. } => *variant,
            FileStatus::Unrecognized { .. } | FileStatus::LoadFailed { .. } => {
                SchemaVariant::Unrecognized
            }
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Normalized {
                variant,
                rows,
                stats,
            } => {
                write!(f, "{variant}: {rows} rows")?;
                if stats.dropped_rows > 0 {
                    write!(f, ", {} dropped", stats.dropped_rows)?;
                }
                if stats.coerced_cells > 0 {
                    write!(f, ", {} unparseable cells", stats.coerced_cells)?;
                }
                Ok(())
            }
            FileStatus::Unrecognized { columns } => {
                write!(f, "skipped, unrecognized columns [{}]", columns.join(", "))
            }
            FileStatus::LoadFailed { reason } => write!(f, "load failed: {reason}"),
            FileStatus::NormalizationFailed { variant, reason } => {
                write!(f, "{variant} normalization failed: {reason}")
            }
        }
    }
}

/// Outcome record for one input path
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub file_id: String,
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Result of a synchronisation run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub dataset: MergedDataset,
    /// One entry per input path, in input order
    pub outcomes: Vec<FileOutcome>,
    pub processing_time_ms: u128,
}

impl SyncReport {
    pub fn files_succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_success())
            .count()
    }

    pub fn files_skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, FileStatus::Unrecognized { .. }))
            .count()
    }

    pub fn files_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome.status,
                    FileStatus::LoadFailed { .. } | FileStatus::NormalizationFailed { .. }
                )
            })
            .count()
    }

    pub fn total_rows(&self) -> usize {
        self.dataset.len()
    }

    /// Successfully normalized files of the given variant
    pub fn outcomes_for(&self, variant: SchemaVariant) -> Vec<&FileOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_success() && outcome.status.variant() == variant)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_raw_table_pads_short_rows() {
        let table = RawTable::new(
            strings(&["YY", "MM", "WD"]),
            vec![strings(&["85", "1"]), strings(&["85", "2", "270"])],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "WD"), Some(""));
        assert_eq!(table.cell(1, "WD"), Some("270"));
        assert_eq!(table.cell(1, "PRES"), None);
        assert_eq!(table.cell(5, "YY"), None);
    }

    #[test]
    fn test_raw_table_record_view() {
        let table = RawTable::new(strings(&["YY", "MM"]), vec![strings(&["85", "1"])]);
        let record = table.record(0).unwrap();

        assert_eq!(record.get("YY"), Some(&"85"));
        assert_eq!(record.get("MM"), Some(&"1"));
        assert!(table.record(1).is_none());
    }

    #[test]
    fn test_canonical_row_distinguishes_absent_and_missing() {
        let mut values = BTreeMap::new();
        values.insert("WDIR".to_string(), Some(270.0));
        values.insert("BAR".to_string(), None);
        let row = CanonicalRow::new(None, Arc::from("buoy"), values);

        assert_eq!(row.value("WDIR"), Some(270.0));
        assert_eq!(row.value("BAR"), None);
        assert_eq!(row.get("BAR"), Some(None));
        assert_eq!(row.get("WTMP"), None);
        assert_eq!(row.source(), "buoy");
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(SchemaVariant::LegacyYY.to_string(), "LegacyYY");
        assert_eq!(SchemaVariant::Modern.to_string(), "Modern");
        assert!(!SchemaVariant::Unrecognized.is_known());
        assert!(SchemaVariant::KNOWN.iter().all(|v| v.is_known()));
    }
}
