//! Error handling for NDBC synchronisation.
//!
//! Per-file conditions (load failures, unrecognized layouts, schema and
//! coercion violations) are caught by the orchestrator and reported as
//! outcomes; only pattern and configuration errors abort an invocation.

use crate::models::SchemaVariant;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Failed to load table from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Unrecognized buoy data format in {path}: columns [{}]", .columns.join(", "))]
    UnrecognizedFormat { path: PathBuf, columns: Vec<String> },

    #[error("{variant} file is missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        variant: SchemaVariant,
        missing: Vec<String>,
    },

    #[error("Non-numeric value '{value}' in column {column} at data row {row}")]
    NonNumericCell {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;
