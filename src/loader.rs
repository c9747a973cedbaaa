//! Whitespace-delimited table loading.
//!
//! Reads an NDBC standard meteorological text file into a [`RawTable`]:
//! the first non-blank line names the columns and every following
//! non-blank line is a row of raw cells. No interpretation of the cells
//! happens here; legend rows stay in place for the normalizer to discard.

use crate::error::{Result, SyncError};
use crate::models::RawTable;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Load one file as a raw table
pub fn load_raw_table(file_path: &Path) -> Result<RawTable> {
    let file = File::open(file_path).map_err(|e| SyncError::Load {
        path: file_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let table = parse_raw_table(BufReader::new(file)).map_err(|e| match e {
        SyncError::Load { reason, .. } => SyncError::Load {
            path: file_path.to_path_buf(),
            reason,
        },
        SyncError::Io(source) => SyncError::Load {
            path: file_path.to_path_buf(),
            reason: source.to_string(),
        },
        other => other,
    })?;

    debug!(
        "Loaded {}: {} columns, {} rows",
        file_path.display(),
        table.columns().len(),
        table.len()
    );

    Ok(table)
}

/// Parse whitespace-delimited text with a header line.
///
/// Rows shorter than the header are padded with missing cells; rows longer
/// than the header mean the delimiter structure is broken and fail the load.
pub fn parse_raw_table<R: BufRead>(reader: R) -> Result<RawTable> {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let cells: Vec<String> = line.split_whitespace().map(str::to_string).collect();

        if cells.is_empty() {
            continue;
        }

        match &header {
            None => header = Some(cells),
            Some(columns) => {
                if cells.len() > columns.len() {
                    return Err(SyncError::Load {
                        path: Default::default(),
                        reason: format!(
                            "line {} has {} fields but the header names {}",
                            line_num + 1,
                            cells.len(),
                            columns.len()
                        ),
                    });
                }
                rows.push(cells);
            }
        }
    }

    let header = header.ok_or_else(|| SyncError::Load {
        path: Default::default(),
        reason: "no header line found".to_string(),
    })?;

    Ok(RawTable::new(header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_legacy_layout() {
        let text = "YY MM DD hh WD   WSPD GST  WVHT  DPD   APD  MWD  BAR    ATMP  WTMP  DEWP  VIS\n\
                    85 01 01 00 270  5.2  99.0 1.20  8.00  5.60 999  1013.0 12.3  14.1  999.0 99.0\n";
        let table = parse_raw_table(Cursor::new(text)).unwrap();

        assert_eq!(table.columns().len(), 16);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "YY"), Some("85"));
        assert_eq!(table.cell(0, "WD"), Some("270"));
        assert_eq!(table.cell(0, "VIS"), Some("99.0"));
    }

    #[test]
    fn test_parse_modern_layout_keeps_legend_row() {
        let text = "#YY  MM DD hh mm WDIR WSPD\n\
                    #yr  mo dy hr mn degT m/s\n\
                    2010 01 01 00 50 270  5.0\n";
        let table = parse_raw_table(Cursor::new(text)).unwrap();

        assert_eq!(table.columns()[0], "#YY");
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "#YY"), Some("#yr"));
        assert_eq!(table.cell(1, "mm"), Some("50"));
    }

    #[test]
    fn test_blank_lines_ignored_and_short_rows_padded() {
        let text = "\n\nYYYY MM DD hh WSPD\n\n1999 06 15 12\n";
        let table = parse_raw_table(Cursor::new(text)).unwrap();

        assert_eq!(table.columns(), ["YYYY", "MM", "DD", "hh", "WSPD"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "WSPD"), Some(""));
    }

    #[test]
    fn test_overlong_row_rejected() {
        let text = "YY MM DD hh\n85 01 01 00 270\n";
        let result = parse_raw_table(Cursor::new(text));

        match result {
            Err(SyncError::Load { reason, .. }) => assert!(reason.contains("line 2")),
            other => panic!("Expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = parse_raw_table(Cursor::new("\n   \n"));
        assert!(matches!(result, Err(SyncError::Load { .. })));
    }

    #[test]
    fn test_load_reports_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "YY MM DD hh").unwrap();
        writeln!(temp_file, "85 01 01 00 1 2").unwrap();

        match load_raw_table(temp_file.path()) {
            Err(SyncError::Load { path, .. }) => assert_eq!(path, temp_file.path()),
            other => panic!("Expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_raw_table(Path::new("/nonexistent/buoy/46026h1985.txt"));
        assert!(matches!(result, Err(SyncError::Load { .. })));
    }
}
