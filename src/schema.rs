//! Schema variant detection and per-variant descriptors.
//!
//! Classifies a raw table by its marker column and describes, for each
//! known layout, which columns build the timestamp, which are discarded,
//! how many legend rows precede the data and how cells are coerced.

use crate::constants::{
    DAY_COLUMN, HOUR_COLUMN, LEGACY_YY_BASE_YEAR, MARKER_LEGACY_YY, MARKER_LEGACY_YYYY,
    MARKER_MODERN, MINUTE_COLUMN, MONTH_COLUMN,
};
use crate::error::{Result, SyncError};
use crate::models::SchemaVariant;
use tracing::debug;

/// Marker columns in detection priority order
const MARKERS: [(&str, SchemaVariant); 3] = [
    (MARKER_LEGACY_YY, SchemaVariant::LegacyYY),
    (MARKER_LEGACY_YYYY, SchemaVariant::LegacyYYYY),
    (MARKER_MODERN, SchemaVariant::Modern),
];

/// Classify a header by its marker column.
///
/// Markers are tried in the order `YY`, `YYYY`, `#YY`; the first present
/// wins. Never fails: a header with no marker is `Unrecognized`.
pub fn detect<S: AsRef<str>>(columns: &[S]) -> SchemaVariant {
    let variant = MARKERS
        .iter()
        .find(|(marker, _)| columns.iter().any(|column| column.as_ref() == *marker))
        .map(|(_, variant)| *variant)
        .unwrap_or(SchemaVariant::Unrecognized);

    debug!("Detected schema variant {}", variant);
    variant
}

/// How measurement cells become numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionPolicy {
    /// Unparseable cells become missing
    Lenient,
    /// Cells are expected to be numeric already; anything else fails the file
    AssumeNumeric,
}

/// Columns a timestamp is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampColumns {
    pub year: &'static str,
    pub month: &'static str,
    pub day: &'static str,
    pub hour: &'static str,
    /// Used whenever present; older layouts sometimes carry it
    pub minute: &'static str,
    pub minute_required: bool,
}

impl TimestampColumns {
    /// Every column consumed by the timestamp, present or not
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        [self.year, self.month, self.day, self.hour, self.minute].into_iter()
    }

    /// Columns a header must carry for the timestamp to be built
    pub fn required(&self) -> impl Iterator<Item = &'static str> {
        [self.year, self.month, self.day, self.hour]
            .into_iter()
            .chain(self.minute_required.then_some(self.minute))
    }
}

/// Dropped from every layout when present
const DROPPED_COLUMNS: &[&str] = &["TIDE"];

/// Layout description for one known schema variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSchema {
    pub variant: SchemaVariant,
    pub timestamp: TimestampColumns,
    /// Added to the year cell before building the timestamp
    pub year_offset: i32,
    /// Dropped when present, in addition to the timestamp columns
    pub extra_dropped: &'static [&'static str],
    /// Units/legend rows directly after the header
    pub legend_rows: usize,
    pub coercion: CoercionPolicy,
}

static LEGACY_YY_SCHEMA: VariantSchema = VariantSchema {
    variant: SchemaVariant::LegacyYY,
    timestamp: TimestampColumns {
        year: MARKER_LEGACY_YY,
        month: MONTH_COLUMN,
        day: DAY_COLUMN,
        hour: HOUR_COLUMN,
        minute: MINUTE_COLUMN,
        minute_required: false,
    },
    year_offset: LEGACY_YY_BASE_YEAR,
    extra_dropped: DROPPED_COLUMNS,
    legend_rows: 0,
    coercion: CoercionPolicy::Lenient,
};

static LEGACY_YYYY_SCHEMA: VariantSchema = VariantSchema {
    variant: SchemaVariant::LegacyYYYY,
    timestamp: TimestampColumns {
        year: MARKER_LEGACY_YYYY,
        month: MONTH_COLUMN,
        day: DAY_COLUMN,
        hour: HOUR_COLUMN,
        minute: MINUTE_COLUMN,
        minute_required: false,
    },
    year_offset: 0,
    extra_dropped: DROPPED_COLUMNS,
    legend_rows: 0,
    coercion: CoercionPolicy::AssumeNumeric,
};

static MODERN_SCHEMA: VariantSchema = VariantSchema {
    variant: SchemaVariant::Modern,
    timestamp: TimestampColumns {
        year: MARKER_MODERN,
        month: MONTH_COLUMN,
        day: DAY_COLUMN,
        hour: HOUR_COLUMN,
        minute: MINUTE_COLUMN,
        minute_required: true,
    },
    year_offset: 0,
    extra_dropped: DROPPED_COLUMNS,
    legend_rows: 1,
    coercion: CoercionPolicy::Lenient,
};

impl VariantSchema {
    /// Descriptor for a known variant; `None` for `Unrecognized`
    pub fn for_variant(variant: SchemaVariant) -> Option<&'static VariantSchema> {
        match variant {
            SchemaVariant::LegacyYY => Some(&LEGACY_YY_SCHEMA),
            SchemaVariant::LegacyYYYY => Some(&LEGACY_YYYY_SCHEMA),
            SchemaVariant::Modern => Some(&MODERN_SCHEMA),
            SchemaVariant::Unrecognized => None,
        }
    }

    /// Columns that must be present for this layout
    pub fn required_columns(&self) -> Vec<&'static str> {
        self.timestamp.required().collect()
    }

    /// True for columns that never reach canonical output
    pub fn is_dropped(&self, column: &str) -> bool {
        self.timestamp.names().any(|name| name == column)
            || self.extra_dropped.iter().any(|dropped| *dropped == column)
    }

    /// Check a header against this layout once, before any row is touched
    pub fn validate<S: AsRef<str>>(&self, columns: &[S]) -> Result<()> {
        let missing: Vec<String> = self
            .timestamp
            .required()
            .filter(|name| !columns.iter().any(|column| column.as_ref() == *name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::MissingColumns {
                variant: self.variant,
                missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_marker() {
        assert_eq!(detect(&["YY", "MM", "DD", "hh"]), SchemaVariant::LegacyYY);
        assert_eq!(detect(&["YYYY", "MM", "DD", "hh"]), SchemaVariant::LegacyYYYY);
        assert_eq!(detect(&["#YY", "MM", "DD", "hh", "mm"]), SchemaVariant::Modern);
    }

    #[test]
    fn test_detect_unrecognized() {
        assert_eq!(detect(&["DATE", "TIME", "WSPD"]), SchemaVariant::Unrecognized);
        assert_eq!(detect::<&str>(&[]), SchemaVariant::Unrecognized);
        // Markers are case sensitive
        assert_eq!(detect(&["yy", "yyyy"]), SchemaVariant::Unrecognized);
    }

    #[test]
    fn test_detect_priority_order() {
        assert_eq!(detect(&["#YY", "YYYY", "YY"]), SchemaVariant::LegacyYY);
        assert_eq!(detect(&["#YY", "YYYY"]), SchemaVariant::LegacyYYYY);
        assert_eq!(detect(&["MM", "#YY"]), SchemaVariant::Modern);
    }

    #[test]
    fn test_descriptors_match_variants() {
        for variant in SchemaVariant::KNOWN {
            let schema = VariantSchema::for_variant(variant).unwrap();
            assert_eq!(schema.variant, variant);
        }
        assert!(VariantSchema::for_variant(SchemaVariant::Unrecognized).is_none());
    }

    #[test]
    fn test_modern_descriptor() {
        let schema = VariantSchema::for_variant(SchemaVariant::Modern).unwrap();
        assert_eq!(schema.required_columns(), vec!["#YY", "MM", "DD", "hh", "mm"]);
        assert_eq!(schema.legend_rows, 1);
        assert!(schema.is_dropped("TIDE"));
        assert!(schema.is_dropped("mm"));
        assert!(!schema.is_dropped("WDIR"));
    }

    #[test]
    fn test_legacy_descriptors_treat_minute_and_tide_as_optional() {
        for variant in [SchemaVariant::LegacyYY, SchemaVariant::LegacyYYYY] {
            let schema = VariantSchema::for_variant(variant).unwrap();
            assert_eq!(schema.required_columns().len(), 4);
            assert!(schema.is_dropped("mm"));
            assert!(schema.is_dropped("TIDE"));
            assert!(schema.validate(&["YY", "YYYY", "MM", "DD", "hh"]).is_ok());
        }
    }

    #[test]
    fn test_validate_reports_all_missing_columns() {
        let schema = VariantSchema::for_variant(SchemaVariant::LegacyYY).unwrap();
        assert!(schema.validate(&["YY", "MM", "DD", "hh", "WD"]).is_ok());

        match schema.validate(&["YY", "MM", "WD"]) {
            Err(SyncError::MissingColumns { variant, missing }) => {
                assert_eq!(variant, SchemaVariant::LegacyYY);
                assert_eq!(missing, vec!["DD".to_string(), "hh".to_string()]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }
}
