//! Synchronisation engine.
//!
//! Drives each input file through load, detect and normalize, records an
//! outcome for every path and merges all successfully normalized tables
//! once at the end. A failing file never aborts the batch.
//!
//! Two entry points share the per-file pipeline: [`SyncProcessor::sync`]
//! runs files one after another, [`SyncProcessor::sync_concurrent`] spreads
//! them over tokio's blocking pool. Both hand tables to the merge in input
//! order, so tie-breaking between equal timestamps is reproducible.

use crate::aggregator::merge;
use crate::config::SyncConfig;
use crate::constants::DATA_FILE_SUFFIX;
use crate::loader::load_raw_table;
use crate::models::{FileOutcome, FileStatus, NormalizedTable, SyncReport};
use crate::normalizer::normalize;
use crate::schema::detect;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Per-file identifier: the file name without its `.txt` suffix
pub fn file_identifier(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if let Some(stem) = name.strip_suffix(DATA_FILE_SUFFIX) {
        return stem.to_string();
    }
    name
}

/// Load, detect and normalize one file.
///
/// Every failure is folded into the returned outcome; the table is only
/// present when normalization succeeded.
pub fn process_file(path: &Path, config: &SyncConfig) -> (FileOutcome, Option<NormalizedTable>) {
    let file_id = file_identifier(path);
    let outcome = |status| FileOutcome {
        file_id: file_id.clone(),
        path: path.to_path_buf(),
        status,
    };

    let raw = match load_raw_table(path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Failed to load {}: {}", path.display(), e);
            return (
                outcome(FileStatus::LoadFailed {
                    reason: e.to_string(),
                }),
                None,
            );
        }
    };

    let variant = detect(raw.columns());
    if !variant.is_known() {
        warn!("Unknown data buoy format, skipping {}", path.display());
        return (
            outcome(FileStatus::Unrecognized {
                columns: raw.columns().to_vec(),
            }),
            None,
        );
    }

    match normalize(&raw, variant, &file_id, config) {
        Ok(table) => {
            debug!(
                "Normalized {} ({}, era {}): {} rows",
                path.display(),
                variant,
                variant.era(),
                table.len()
            );
            let status = FileStatus::Normalized {
                variant,
                rows: table.len(),
                stats: table.stats,
            };
            (outcome(status), Some(table))
        }
        Err(e) => {
            error!("Failed to normalize {}: {}", path.display(), e);
            (
                outcome(FileStatus::NormalizationFailed {
                    variant,
                    reason: e.to_string(),
                }),
                None,
            )
        }
    }
}

/// Main processor for NDBC file synchronisation
#[derive(Debug, Clone, Default)]
pub struct SyncProcessor {
    config: SyncConfig,
}

impl SyncProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the processor
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Process files one after another and merge the results
    pub fn sync(&self, paths: &[PathBuf]) -> SyncReport {
        let start_time = Instant::now();
        self.announce(paths);

        let pb = self.progress_bar(paths.len());
        let results: Vec<_> = paths
            .iter()
            .map(|path| {
                let result = process_file(path, &self.config);
                pb.inc(1);
                result
            })
            .collect();
        pb.finish_and_clear();

        self.assemble(results, start_time)
    }

    /// Process files on the blocking pool with bounded concurrency.
    ///
    /// Results are collected in input order regardless of completion order.
    pub async fn sync_concurrent(&self, paths: &[PathBuf]) -> SyncReport {
        let start_time = Instant::now();
        self.announce(paths);

        let concurrent_limit = self.config.max_concurrent_files.max(1);
        debug!("Processing with up to {} concurrent files", concurrent_limit);

        let pb = self.progress_bar(paths.len());
        let results: Vec<_> = stream::iter(paths.iter().cloned())
            .map(|path| {
                let config = self.config.clone();
                let pb = pb.clone();
                async move {
                    let result = task::spawn_blocking({
                        let path = path.clone();
                        move || process_file(&path, &config)
                    })
                    .await;
                    pb.inc(1);

                    match result {
                        Ok(result) => result,
                        Err(e) => {
                            error!("Worker for {} failed: {}", path.display(), e);
                            let outcome = FileOutcome {
                                file_id: file_identifier(&path),
                                path,
                                status: FileStatus::LoadFailed {
                                    reason: format!("worker task failed: {}", e),
                                },
                            };
                            (outcome, None)
                        }
                    }
                }
            })
            .buffered(concurrent_limit)
            .collect()
            .await;
        pb.finish_and_clear();

        self.assemble(results, start_time)
    }

    fn announce(&self, paths: &[PathBuf]) {
        info!("Reading {} files", paths.len());
        for path in paths {
            debug!("Queued {}", path.display());
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Invalid progress bar template: {}", e),
        }
        pb.set_message("Normalizing files");
        pb
    }

    /// Split per-file results into outcomes and tables, then merge once
    fn assemble(
        &self,
        results: Vec<(FileOutcome, Option<NormalizedTable>)>,
        start_time: Instant,
    ) -> SyncReport {
        let mut outcomes = Vec::with_capacity(results.len());
        let mut tables = Vec::new();

        for (outcome, table) in results {
            outcomes.push(outcome);
            if let Some(table) = table {
                tables.push(table);
            }
        }

        let dataset = merge(tables);
        let report = SyncReport {
            dataset,
            outcomes,
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Synchronised {} rows: {} files normalized, {} skipped, {} failed",
            report.total_rows(),
            report.files_succeeded(),
            report.files_skipped(),
            report.files_failed()
        );

        report
    }
}
