//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod patterns;
pub mod process;

use console::style;
use tracing::info;

use taxslip_core::{ExtractionConfig, PatternRegistry, SlipEngine};

/// Split a `name=expression` argument.
pub fn parse_pattern_arg(arg: &str) -> anyhow::Result<(&str, &str)> {
    arg.split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("expected NAME=EXPRESSION, got '{}'", arg))
}

/// Build the session engine and register `--pattern` arguments.
///
/// Invalid patterns are reported and skipped; they never abort the run.
pub fn build_engine(
    config: &ExtractionConfig,
    no_default_patterns: bool,
    patterns: &[String],
) -> SlipEngine {
    let mut config = config.clone();
    if no_default_patterns {
        config.seed_default_patterns = false;
    }

    let engine = SlipEngine::from_config(&config);
    register_patterns(engine.registry(), patterns);
    engine
}

fn register_patterns(registry: &PatternRegistry, patterns: &[String]) {
    for arg in patterns {
        let result = parse_pattern_arg(arg)
            .and_then(|(name, expression)| Ok(registry.add(name, expression)?));

        match result {
            Ok(()) => info!("Registered custom pattern {}", arg),
            Err(e) => eprintln!(
                "{} Skipping pattern: {}",
                style("⚠").yellow(),
                e
            ),
        }
    }
}
