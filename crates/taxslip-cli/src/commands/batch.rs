//! Batch processing command for multiple slip documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use taxslip_core::models::PageRecord;
use taxslip_core::{SlipEngine, SlipExtractor};

use super::build_engine;
use super::process::{format_records, OutputFormat};
use crate::input::{load_document, InputKind};
use crate::settings::AppConfig;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Custom field pattern as NAME=EXPRESSION (repeatable)
    #[arg(short, long = "pattern", value_name = "NAME=EXPRESSION")]
    patterns: Vec<String>,

    /// Do not register the default custom patterns
    #[arg(long)]
    no_default_patterns: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    records: Option<Vec<PageRecord>>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = AppConfig::load(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| InputKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One engine shared by all workers; the registry is read-only from here on.
    let engine = Arc::new(build_engine(
        &config.extraction,
        args.no_default_patterns,
        &args.patterns,
    ));
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let engine = Arc::clone(&engine);
        let permits = Arc::clone(&permits);
        let pb = overall_pb.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let task_path = path.clone();
            let file_start = Instant::now();
            let outcome =
                tokio::task::spawn_blocking(move || process_single_file(&task_path, &engine))
                    .await?;
            pb.inc(1);
            Ok::<_, anyhow::Error>((path, outcome, file_start.elapsed().as_millis() as u64))
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (path, outcome, processing_time_ms) = handle.await??;

        match outcome {
            Ok(records) => results.push(ProcessResult {
                path,
                records: Some(records),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        records: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.records.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        let paths: Vec<&Path> = successful.iter().map(|r| r.path.as_path()).collect();
        let names = output_names(&paths);

        for (result, output_name) in successful.iter().zip(&names) {
            if let Some(records) = &result.records {
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));
                let content = format_records(records, args.format, &config.output)?;

                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file stems for `paths`. Inputs sharing a stem (`a.pdf`, `a.txt`)
/// keep their full file name so their outputs do not collide.
fn output_names(paths: &[&Path]) -> Vec<String> {
    let stem = |path: &Path| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string()
    };

    let stems: Vec<String> = paths.iter().map(|&p| stem(p)).collect();

    paths
        .iter()
        .zip(&stems)
        .map(|(path, name)| {
            if stems.iter().filter(|other| *other == name).count() > 1 {
                path.file_name()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| name.clone())
            } else {
                name.clone()
            }
        })
        .collect()
}

fn process_single_file(path: &Path, engine: &SlipEngine) -> anyhow::Result<Vec<PageRecord>> {
    let document = load_document(path)?;

    if document.pages.iter().all(|p| p.trim().is_empty()) {
        anyhow::bail!("No text extracted from {}", path.display());
    }

    Ok(engine.process_pages(&document.pages))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "pages",
        "recognized",
        "unrecognized",
        "slip_types",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(records) = &result.records {
            let recognized: Vec<_> = records
                .iter()
                .filter(|r| r.result.is_recognized())
                .collect();
            let mut slip_types: Vec<&str> = Vec::new();
            for record in &recognized {
                let label = record.result.classification.label();
                if !slip_types.contains(&label) {
                    slip_types.push(label);
                }
            }

            wtr.write_record([
                filename,
                "success",
                &records.len().to_string(),
                &recognized.len().to_string(),
                &(records.len() - recognized.len()).to_string(),
                &slip_types.join(";"),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
