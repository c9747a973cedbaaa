//! Application constants for NDBC synchronisation
//!
//! Fixed lookup tables shared by every schema variant: marker columns,
//! timestamp component names, the sentinel table and the rename table.
//! None of these are mutated at runtime.

// =============================================================================
// Marker Columns
// =============================================================================

/// Marker column of the mid 1980s to late 1990s layout (two digit year)
pub const MARKER_LEGACY_YY: &str = "YY";

/// Marker column of the late 1990s to ~2004 layout (four digit year)
pub const MARKER_LEGACY_YYYY: &str = "YYYY";

/// Marker column of the 2004 onwards layout (commented header line)
pub const MARKER_MODERN: &str = "#YY";

// =============================================================================
// Timestamp Components
// =============================================================================

pub const MONTH_COLUMN: &str = "MM";
pub const DAY_COLUMN: &str = "DD";
pub const HOUR_COLUMN: &str = "hh";
pub const MINUTE_COLUMN: &str = "mm";

/// Two digit years in the oldest layout are offsets from this year
pub const LEGACY_YY_BASE_YEAR: i32 = 1900;

/// Name of the constructed timestamp field in canonical output
pub const DATETIME_COLUMN: &str = "datetime";

/// Name of the source file identifier column in tabular output
pub const SOURCE_COLUMN: &str = "source";

/// Generated column names a measurement column may not take
pub const RESERVED_COLUMNS: &[&str] = &[DATETIME_COLUMN, SOURCE_COLUMN];

// =============================================================================
// Value Normalisation Tables
// =============================================================================

/// Fixed-width placeholders historically used for "no reading".
///
/// Matching is exact; a genuine reading equal to one of these values is
/// indistinguishable from missing data.
pub const SENTINEL_VALUES: &[f64] = &[0.0, 99.0, 999.0, 9999.0, 99999.0];

/// Legacy column name -> canonical column name
pub const COLUMN_RENAMES: &[(&str, &str)] = &[("WD", "WDIR"), ("PRES", "BAR")];

/// Tokens that mean "missing" before any numeric parsing happens
pub const MISSING_TOKENS: &[&str] = &["", "MM", "NaN", "nan", "N/A"];

// =============================================================================
// File Handling
// =============================================================================

/// Suffix stripped from file names to form the per-file identifier
pub const DATA_FILE_SUFFIX: &str = ".txt";

/// Pattern appended when a directory is given instead of a glob
pub const DEFAULT_FILE_PATTERN: &str = "*.txt";

/// Default number of rows shown by the CLI preview
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Returns true if `value` exactly equals one of the sentinel placeholders
pub fn is_sentinel(value: f64) -> bool {
    SENTINEL_VALUES.contains(&value)
}

/// Looks up the canonical name for a legacy column, if it has one
pub fn canonical_rename(column: &str) -> Option<&'static str> {
    COLUMN_RENAMES
        .iter()
        .find(|(legacy, _)| *legacy == column)
        .map(|(_, canonical)| *canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_exact() {
        for value in [0.0, 99.0, 999.0, 9999.0, 99999.0] {
            assert!(is_sentinel(value));
        }
        assert!(!is_sentinel(99.5));
        assert!(!is_sentinel(98.0));
        assert!(!is_sentinel(-99.0));
    }

    #[test]
    fn test_canonical_rename() {
        assert_eq!(canonical_rename("WD"), Some("WDIR"));
        assert_eq!(canonical_rename("PRES"), Some("BAR"));
        assert_eq!(canonical_rename("WSPD"), None);
        assert_eq!(canonical_rename("WDIR"), None);
    }
}
