//! Command-line entry point for the bloom pipeline.
//!
//! # Responsibility
//! - Read text from an argument, a file or stdin and print bloom JSON.
//! - Keep output deterministic so runs can be diffed.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use neural_bloom_core::{
    build_skeleton, default_log_level, init_logging, map_to_bloom, AnalyzerConfig, LexicalAdapter,
    LogLevel, TextAnalyzer,
};
use std::io::Read;
use std::path::PathBuf;

/// Neural Bloom - turn text into deterministic bloom parameters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Text to analyze (reads stdin when neither TEXT nor --file is given)
    text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Analyzer config as JSON (missing fields use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files (logging is off without it)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Print the analysis result instead of bloom data
    #[arg(long)]
    analysis: bool,

    /// Include the procedural branch skeleton in the output
    #[arg(long, conflicts_with = "analysis")]
    skeleton: bool,

    /// Substitute the adapter-free analysis when the adapter fails
    #[arg(long)]
    fallback: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = &args.log_dir {
        let level = args.log_level.unwrap_or_else(default_log_level);
        init_logging(level, log_dir)?;
    }

    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config `{}`", path.display()))?;
            AnalyzerConfig::from_json(&raw)?
        }
        None => AnalyzerConfig::default(),
    };

    let text = read_input(&args)?;

    let mut analyzer = TextAnalyzer::with_config(LexicalAdapter::default(), config)?;
    analyzer.initialize()?;

    let analysis = if args.fallback {
        analyzer.analyze_or_fallback(&text)?
    } else {
        analyzer.analyze(&text)?
    };

    let output = match analysis {
        None => serde_json::Value::Null,
        Some(analysis) if args.analysis => serde_json::to_value(&analysis)?,
        Some(analysis) => {
            let bloom = map_to_bloom(&analysis);
            if args.skeleton {
                let skeleton = build_skeleton(&bloom.structure, bloom.metadata.topic_hash);
                serde_json::json!({ "bloom": bloom, "skeleton": skeleton })
            } else {
                serde_json::to_value(&bloom)?
            }
        }
    };

    info!("event=cli_run module=cli status=ok empty={}", output.is_null());

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_input(args: &Args) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input `{}`", path.display()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{Args, LogLevel};
    use clap::Parser;

    #[test]
    fn parses_text_and_flags() {
        let args = Args::try_parse_from(["neural_bloom", "--pretty", "--skeleton", "hello"])
            .expect("valid args");
        assert_eq!(args.text.as_deref(), Some("hello"));
        assert!(args.pretty);
        assert!(args.skeleton);
        assert!(args.log_level.is_none());
    }

    #[test]
    fn log_level_is_parsed_at_the_command_line() {
        let args = Args::try_parse_from(["neural_bloom", "--log-level", "WARN", "x"])
            .expect("valid level");
        assert_eq!(args.log_level, Some(LogLevel::Warn));
        assert!(Args::try_parse_from(["neural_bloom", "--log-level", "loud", "x"]).is_err());
    }

    #[test]
    fn analysis_and_skeleton_conflict() {
        assert!(Args::try_parse_from(["neural_bloom", "--analysis", "--skeleton", "x"]).is_err());
    }
}
