//! Process command - classify and extract fields from a single document.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use taxslip_core::models::PageRecord;
use taxslip_core::{OutputConfig, PageBookmark, PdfProcessor, SlipExtractor};

use super::build_engine;
use crate::input::{load_document, InputKind};
use crate::settings::AppConfig;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or text with form-feed page breaks)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Custom field pattern as NAME=EXPRESSION (repeatable)
    #[arg(short, long = "pattern", value_name = "NAME=EXPRESSION")]
    patterns: Vec<String>,

    /// Do not register the default custom patterns
    #[arg(long)]
    no_default_patterns: bool,

    /// Write a copy of the PDF with one bookmark per slip page
    #[arg(short, long, value_name = "PDF")]
    bookmarked: Option<PathBuf>,

    /// Only output recognized pages
    #[arg(long)]
    recognized_only: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per page)
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = AppConfig::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading document...");
    let document = load_document(&args.input)?;

    pb.set_message("Extracting slip data...");
    let engine = build_engine(&config.extraction, args.no_default_patterns, &args.patterns);
    let mut records = engine.process_pages(&document.pages);

    if let Some(bookmarked_path) = &args.bookmarked {
        let pdf = match (&document.kind, &document.pdf) {
            (InputKind::Pdf, Some(pdf)) => pdf,
            _ => anyhow::bail!("--bookmarked requires a PDF input"),
        };

        pb.set_message("Writing bookmarks...");
        let bookmarks = build_bookmarks(&records, &config.output);
        let data = pdf.write_with_bookmarks(&bookmarks)?;
        fs::write(bookmarked_path, data)?;
        debug!(
            "Wrote {} bookmarks to {}",
            bookmarks.len(),
            bookmarked_path.display()
        );
    }

    pb.finish_and_clear();

    if args.recognized_only {
        records.retain(|r| r.result.is_recognized());
    }

    let output = format_records(&records, args.format, &config.output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if let Some(bookmarked_path) = &args.bookmarked {
        println!(
            "{} Bookmarked PDF written to {}",
            style("✓").green(),
            bookmarked_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// One bookmark per page, titled `"{label} - {issuer}"`.
pub fn build_bookmarks(records: &[PageRecord], output: &OutputConfig) -> Vec<PageBookmark> {
    records
        .iter()
        .filter(|r| output.bookmark_unrecognized || r.result.is_recognized())
        .map(|r| PageBookmark::new(r.page, r.result.navigation_label(&output.unknown_issuer)))
        .collect()
}

pub fn format_records(
    records: &[PageRecord],
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records, output)),
    }
}

fn format_csv(records: &[PageRecord]) -> anyhow::Result<String> {
    let custom_names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.result.custom_fields.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "page",
        "classification",
        "sin",
        "issuer_name",
        "taxpayer_name",
    ];
    header.extend(custom_names.iter().copied());
    wtr.write_record(&header)?;

    for record in records {
        let fields = &record.result.fields;
        let mut row = vec![
            record.page.to_string(),
            record.result.classification.to_string(),
            fields.sin.clone().unwrap_or_default(),
            fields.issuer_name.clone().unwrap_or_default(),
            fields.taxpayer_name.clone().unwrap_or_default(),
        ];
        for name in &custom_names {
            row.push(
                record
                    .result
                    .custom_fields
                    .get(*name)
                    .cloned()
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[PageRecord], output: &OutputConfig) -> String {
    const NOT_DETECTED: &str = "Not detected";
    let mut out = String::new();

    for record in records {
        let result = &record.result;
        let fields = &result.fields;

        out.push_str(&format!("Page {}: {}\n", record.page, result.navigation_label(&output.unknown_issuer)));
        out.push_str(&format!("  Slip Type:     {}\n", result.classification));
        out.push_str(&format!("  SIN:           {}\n", fields.sin.as_deref().unwrap_or(NOT_DETECTED)));
        out.push_str(&format!("  Issuer Name:   {}\n", fields.issuer_name.as_deref().unwrap_or(NOT_DETECTED)));
        out.push_str(&format!("  Taxpayer Name: {}\n", fields.taxpayer_name.as_deref().unwrap_or(NOT_DETECTED)));

        for (name, value) in &result.custom_fields {
            out.push_str(&format!("  {}: {}\n", name, value));
        }
        out.push('\n');
    }

    let recognized = records.iter().filter(|r| r.result.is_recognized()).count();
    out.push_str(&format!(
        "{} page(s): {} recognized, {} unrecognized\n",
        records.len(),
        recognized,
        records.len() - recognized
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use taxslip_core::SlipEngine;

    fn sample_records() -> Vec<PageRecord> {
        let engine = SlipEngine::new();
        engine.process_pages([
            "T4 Statement of Remuneration Paid\nEmployer: Acme Corp Ltd\nBox 14: $100.00",
            "blank page",
        ])
    }

    #[test]
    fn test_bookmarks_include_unrecognized_by_default() {
        let bookmarks = build_bookmarks(&sample_records(), &OutputConfig::default());
        assert_eq!(
            bookmarks,
            vec![
                PageBookmark::new(1, "T4 - Acme Corp Ltd"),
                PageBookmark::new(2, "Unrecognized - Unknown Issuer"),
            ]
        );
    }

    #[test]
    fn test_bookmarks_skip_unrecognized() {
        let output = OutputConfig {
            bookmark_unrecognized: false,
            ..Default::default()
        };
        let bookmarks = build_bookmarks(&sample_records(), &output);
        assert_eq!(bookmarks, vec![PageBookmark::new(1, "T4 - Acme Corp Ltd")]);
    }

    #[test]
    fn test_csv_has_custom_columns() {
        let csv = format_csv(&sample_records()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("page,classification,sin,issuer_name,taxpayer_name,amount,box_amount,box_number")
        );
        assert_eq!(lines.next(), Some("1,T4,,Acme Corp Ltd,,$100.00,$100.00,14"));
        assert_eq!(lines.next(), Some("2,Unrecognized,,,,,,"));
    }

    #[test]
    fn test_text_summary_counts() {
        let text = format_text(&sample_records(), &OutputConfig::default());
        assert!(text.contains("Page 1: T4 - Acme Corp Ltd"));
        assert!(text.contains("SIN:           Not detected"));
        assert!(text.ends_with("2 page(s): 1 recognized, 1 unrecognized\n"));
    }
}
