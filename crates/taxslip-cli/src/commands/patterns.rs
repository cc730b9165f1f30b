//! Patterns command - inspect default patterns and try out new ones.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use taxslip_core::slip::DEFAULT_PATTERNS;
use taxslip_core::{PatternRegistry, PatternSpec};

use crate::input::load_document;
use crate::settings::AppConfig;

const TEST_FIELD: &str = "test";

/// Arguments for the patterns command.
#[derive(Args)]
pub struct PatternsArgs {
    #[command(subcommand)]
    command: PatternsCommand,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// List the default custom patterns
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Test an expression against each page of a document
    Test(TestArgs),
}

#[derive(Args)]
struct TestArgs {
    /// Pattern expression
    expression: String,

    /// Input file (PDF, or text with form-feed page breaks)
    input: PathBuf,

    /// Capture group to return (default: first group, or whole match)
    #[arg(short, long)]
    group: Option<usize>,
}

pub async fn run(args: PatternsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        PatternsCommand::List { json } => list_patterns(json),
        PatternsCommand::Test(test_args) => test_pattern(test_args, config_path),
    }
}

fn list_patterns(json: bool) -> anyhow::Result<()> {
    if json {
        let specs: Vec<PatternSpec> = DEFAULT_PATTERNS
            .iter()
            .map(|(name, expression)| PatternSpec {
                name: name.to_string(),
                expression: expression.to_string(),
                group: None,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    for (name, expression) in DEFAULT_PATTERNS {
        println!("{:<16} {}", style(name).cyan(), expression);
    }

    Ok(())
}

fn test_pattern(args: TestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;

    // Same limits as `process`, without the seeded defaults.
    let registry = PatternRegistry::new()
        .with_size_limit(config.extraction.pattern_size_limit)
        .with_max_input_bytes(config.extraction.max_input_bytes);
    registry.add_with_group(TEST_FIELD, args.expression, args.group)?;

    let document = load_document(&args.input)?;

    let mut matched = 0;
    for (i, page) in document.pages.iter().enumerate() {
        match registry.extract_field(page, TEST_FIELD) {
            Some(value) => {
                matched += 1;
                println!("{} Page {}: {}", style("✓").green(), i + 1, value);
            }
            None if page.len() > config.extraction.max_input_bytes => println!(
                "{} Page {}: skipped, over {} bytes",
                style("-").dim(),
                i + 1,
                config.extraction.max_input_bytes
            ),
            None => println!("{} Page {}: no match", style("-").dim(), i + 1),
        }
    }

    let group = registry
        .get(TEST_FIELD)
        .map(|rule| rule.effective_group())
        .unwrap_or(0);

    println!();
    println!(
        "{} Matched {} of {} page(s) using group {}",
        style("ℹ").blue(),
        matched,
        document.pages.len(),
        group
    );

    Ok(())
}
