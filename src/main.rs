use anyhow::Context;
use clap::Parser;
use ndbc_sync::SyncConfig;
use ndbc_sync::cli::{Args, report};
use ndbc_sync::discovery::list_files;
use ndbc_sync::processor::SyncProcessor;
use std::process;
use tracing::{Level, info};

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let base_config = match &args.config {
        Some(path) => SyncConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Args::default_config(),
    };
    let config = args.apply_overrides(base_config);
    config.validate().context("Invalid configuration")?;

    let files = list_files(&args.pattern)
        .with_context(|| format!("Failed to list files for pattern '{}'", args.pattern))?;
    info!("Reading files: {:?}", files);

    if files.is_empty() {
        println!("No files matched '{}'", args.pattern);
        return Ok(());
    }

    let processor = SyncProcessor::new().with_config(config);
    let sync_report = processor.sync_concurrent(&files).await;

    report::print_summary(&sync_report);

    if args.preview > 0 && !sync_report.dataset.is_empty() {
        let df = sync_report
            .dataset
            .to_dataframe()
            .context("Failed to build merged table")?;
        println!("\n{}", df.head(Some(args.preview)));
    }

    Ok(())
}
