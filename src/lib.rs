//! NDBC Sync Library
//!
//! Reconciles historical NDBC standard meteorological buoy files into a
//! single time-ordered table.
//!
//! Files recorded in different eras use incompatible column layouts. This
//! library provides tools for:
//! - Loading whitespace-delimited buoy files as raw tables
//! - Detecting which historical layout a table uses
//! - Normalizing each layout's timestamps, sentinels and column names
//! - Merging normalized tables into one dataset sorted by timestamp
//! - Reporting, per file, what was merged, skipped or failed

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod processor;
pub mod schema;

pub use aggregator::merge;
pub use config::{InvalidTimestampPolicy, SyncConfig};
pub use error::{Result, SyncError};
pub use models::{
    CanonicalRow, FileOutcome, FileStatus, MergedDataset, NormalizedTable, RawTable,
    SchemaVariant, SyncReport,
};
pub use normalizer::normalize;
pub use processor::SyncProcessor;
pub use schema::detect;
