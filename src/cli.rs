//! Command-line interface components.

use crate::config::{InvalidTimestampPolicy, SyncConfig};
use crate::constants::DEFAULT_PREVIEW_ROWS;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ndbc-sync")]
#[command(about = "Merge historical NDBC standard meteorological buoy files into one time-ordered table")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Glob pattern or directory of NDBC historical files (e.g. "data/46026h*.txt")
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of files processed concurrently
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Keep rows whose timestamp cannot be built (sorted last) instead of dropping them
    #[arg(long)]
    pub keep_invalid_timestamps: bool,

    /// Coerce unparseable cells to missing for every format, including YYYY files
    #[arg(long)]
    pub uniform_coercion: bool,

    /// Hide the progress bar, even if the configuration file enables it
    #[arg(long)]
    pub no_progress: bool,

    /// Number of merged rows to print
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Configuration used when no file is given: library defaults plus a progress bar
    pub fn default_config() -> SyncConfig {
        SyncConfig::default().with_progress()
    }

    /// Apply command-line overrides on top of a base configuration.
    ///
    /// Only flags that were passed change the base; everything else keeps
    /// the value from the configuration file.
    pub fn apply_overrides(&self, mut config: SyncConfig) -> SyncConfig {
        if let Some(max_files) = self.max_concurrent {
            config = config.with_max_concurrent_files(max_files);
        }
        if self.keep_invalid_timestamps {
            config = config.with_invalid_timestamps(InvalidTimestampPolicy::Keep);
        }
        if self.uniform_coercion {
            config = config.with_uniform_coercion();
        }
        if self.no_progress {
            config = config.without_progress();
        }
        config
    }
}

/// Per-file and total summary printing
pub mod report {
    use crate::models::{FileStatus, SyncReport};
    use colored::*;

    /// Print one line per file followed by the batch totals
    pub fn print_summary(report: &SyncReport) {
        println!("\n{}", "Files".bright_green().bold());
        for outcome in &report.outcomes {
            let line = format!("{}: {}", outcome.file_id, outcome.status);
            match outcome.status {
                FileStatus::Normalized { .. } => println!("  {} {}", "ok".bright_green(), line),
                FileStatus::Unrecognized { .. } => {
                    println!("  {} {}", "skip".bright_yellow(), line)
                }
                FileStatus::LoadFailed { .. } | FileStatus::NormalizationFailed { .. } => {
                    println!("  {} {}", "fail".bright_red(), line)
                }
            }
        }

        println!("\n{}", "Synchronisation Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            report.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files normalized:".bright_cyan(),
            report.files_succeeded().to_string().bright_white()
        );
        if report.files_skipped() > 0 {
            println!(
                "  {} {}",
                "Files skipped:".bright_yellow(),
                report.files_skipped().to_string().bright_yellow().bold()
            );
        }
        if report.files_failed() > 0 {
            println!(
                "  {} {}",
                "Files failed:".bright_red(),
                report.files_failed().to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Total rows:".bright_cyan(),
            report.total_rows().to_string().bright_white().bold()
        );
        if let Some((first, last)) = report.dataset.time_range() {
            println!(
                "  {} {} to {}",
                "Time range:".bright_cyan(),
                first.to_string().bright_white(),
                last.to_string().bright_white()
            );
        }
    }
}
