//! Variant normalization into the canonical schema.
//!
//! Each known layout is normalized through its [`VariantSchema`]: legend
//! rows are discarded, the timestamp is assembled from the date/time
//! columns (which are then dropped along with any extra dropped columns),
//! measurement cells are coerced to numbers, sentinel placeholders become
//! missing and legacy column names are mapped to the shared vocabulary.

use crate::config::{InvalidTimestampPolicy, SyncConfig};
use crate::constants::{MISSING_TOKENS, RESERVED_COLUMNS, canonical_rename, is_sentinel};
use crate::error::{Result, SyncError};
use crate::models::{CanonicalRow, NormalizationStats, NormalizedTable, RawTable, SchemaVariant};
use crate::schema::{CoercionPolicy, VariantSchema};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// A raw cell after numeric parsing
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

fn parse_cell(raw: &str) -> Cell<'_> {
    let trimmed = raw.trim();
    if MISSING_TOKENS.iter().any(|token| *token == trimmed) {
        return Cell::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Number(value),
        Ok(_) => Cell::Missing,
        Err(_) => Cell::Text(raw),
    }
}

/// Replace a sentinel reading with missing; other values pass through.
///
/// Applying this twice is the same as applying it once.
pub fn mask_sentinel(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !is_sentinel(*v))
}

/// Measurement column carried into canonical output
#[derive(Debug, Clone)]
struct MeasurementColumn {
    index: usize,
    source: String,
    canonical: String,
}

/// Work out which columns survive and what they are called afterwards
fn plan_columns(table: &RawTable, schema: &VariantSchema) -> Vec<MeasurementColumn> {
    let header = table.columns();
    let mut plan: Vec<MeasurementColumn> = Vec::new();

    for (index, source) in header.iter().enumerate() {
        if schema.is_dropped(source) {
            continue;
        }

        let canonical = match canonical_rename(source) {
            Some(renamed) if header.iter().any(|column| column == renamed) => {
                warn!(
                    "Both {} and {} present; keeping {} and dropping {}",
                    source, renamed, renamed, source
                );
                continue;
            }
            Some(renamed) => renamed.to_string(),
            None => source.clone(),
        };

        if RESERVED_COLUMNS.iter().any(|reserved| *reserved == canonical) {
            warn!("Column {} clashes with a generated column; dropping it", source);
            continue;
        }

        if plan.iter().any(|column| column.canonical == canonical) {
            warn!("Duplicate column {} ignored", source);
            continue;
        }

        plan.push(MeasurementColumn {
            index,
            source: source.clone(),
            canonical,
        });
    }

    plan
}

/// Parse a date/time component that must be a whole number
fn parse_component(raw: &str) -> Option<i64> {
    match parse_cell(raw) {
        Cell::Number(value) if value.fract() == 0.0 => Some(value as i64),
        _ => None,
    }
}

/// Assemble the timestamp for one row; `None` if any component is unusable
fn build_timestamp(
    row: &[String],
    indices: &TimestampIndices,
    year_offset: i32,
) -> Option<NaiveDateTime> {
    let year = parse_component(&row[indices.year])? + i64::from(year_offset);
    let month = parse_component(&row[indices.month])?;
    let day = parse_component(&row[indices.day])?;
    let hour = parse_component(&row[indices.hour])?;
    let minute = match indices.minute {
        Some(index) => parse_component(&row[index])?,
        None => 0,
    };

    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?
    .and_hms_opt(u32::try_from(hour).ok()?, u32::try_from(minute).ok()?, 0)
}

/// Header positions of the timestamp source columns
struct TimestampIndices {
    year: usize,
    month: usize,
    day: usize,
    hour: usize,
    minute: Option<usize>,
}

impl TimestampIndices {
    fn resolve(table: &RawTable, schema: &VariantSchema) -> Result<Self> {
        let lookup = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| SyncError::MissingColumns {
                    variant: schema.variant,
                    missing: vec![name.to_string()],
                })
        };

        Ok(Self {
            year: lookup(schema.timestamp.year)?,
            month: lookup(schema.timestamp.month)?,
            day: lookup(schema.timestamp.day)?,
            hour: lookup(schema.timestamp.hour)?,
            minute: if schema.timestamp.minute_required {
                Some(lookup(schema.timestamp.minute)?)
            } else {
                table.column_index(schema.timestamp.minute)
            },
        })
    }
}

/// Normalize one raw table of the given variant into canonical rows.
///
/// `file_id` is stamped onto every row for traceability. An `Unrecognized`
/// variant or a header missing the variant's timestamp columns fails
/// without touching any row.
pub fn normalize(
    table: &RawTable,
    variant: SchemaVariant,
    file_id: &str,
    config: &SyncConfig,
) -> Result<NormalizedTable> {
    let schema = VariantSchema::for_variant(variant).ok_or_else(|| {
        SyncError::UnrecognizedFormat {
            path: PathBuf::from(file_id),
            columns: table.columns().to_vec(),
        }
    })?;
    schema.validate(table.columns())?;

    let indices = TimestampIndices::resolve(table, schema)?;
    let plan = plan_columns(table, schema);
    let coercion = if config.uniform_coercion {
        CoercionPolicy::Lenient
    } else {
        schema.coercion
    };

    let source: Arc<str> = Arc::from(file_id);
    let legend_rows = schema.legend_rows.min(table.len());
    let mut stats = NormalizationStats {
        legend_rows,
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(table.len() - legend_rows);

    for (row_num, row) in table.rows().iter().enumerate().skip(legend_rows) {
        let datetime = build_timestamp(row, &indices, schema.year_offset);

        if datetime.is_none() {
            match config.invalid_timestamps {
                InvalidTimestampPolicy::Drop => {
                    stats.dropped_rows += 1;
                    continue;
                }
                InvalidTimestampPolicy::Keep => stats.undated_rows += 1,
            }
        }

        let mut values = BTreeMap::new();
        for column in &plan {
            let value = match parse_cell(&row[column.index]) {
                Cell::Missing => None,
                Cell::Number(number) => Some(number),
                Cell::Text(text) => match coercion {
                    CoercionPolicy::Lenient => {
                        stats.coerced_cells += 1;
                        None
                    }
                    CoercionPolicy::AssumeNumeric => {
                        return Err(SyncError::NonNumericCell {
                            column: column.source.clone(),
                            row: row_num + 1,
                            value: text.to_string(),
                        });
                    }
                },
            };

            let masked = mask_sentinel(value);
            if masked.is_none() && value.is_some() {
                stats.sentinel_cells += 1;
            }
            values.insert(column.canonical.clone(), masked);
        }

        rows.push(CanonicalRow::new(datetime, Arc::clone(&source), values));
    }

    debug!(
        "Normalized {} as {}: {} rows kept, {} dropped, {} cells coerced, {} sentinels masked",
        file_id,
        variant,
        rows.len(),
        stats.dropped_rows,
        stats.coerced_cells,
        stats.sentinel_cells
    );

    Ok(NormalizedTable {
        file_id: file_id.to_string(),
        variant,
        columns: plan.into_iter().map(|column| column.canonical).collect(),
        rows,
        stats,
    })
}
