use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::timestamp::TimestampUnit;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Infer column types and summarize spreadsheet data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every column and print its type descriptor
    Probe(ProbeArgs),
    /// Produce numeric/date statistics or categorical frequency counts
    Stats(StatsArgs),
    /// Rank numeric column pairs by Pearson correlation
    Correlate(CorrelateArgs),
    /// Render a markdown-style summary report of the data
    Summary(SummaryArgs),
    /// Recommend a chart type and spreadsheet formulas
    Advise(AdviseArgs),
    /// Emit descriptors, summary and recommendations as one JSON document
    Analyze(AnalyzeArgs),
    /// Convert between epoch timestamps and calendar dates
    Timestamp(TimestampArgs),
    /// Write the default analysis configuration as YAML
    InitConfig(InitConfigArgs),
}

/// Where the grid comes from. Shared by every data command.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input file: CSV, TSV, or a JSON array of rows ('-' reads CSV from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum data rows to load (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum TextFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// YAML analysis configuration overriding classifier thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Columns to include (defaults to all columns)
    #[arg(short = 'C', long = "columns", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// Report frequency counts instead of numeric/date statistics
    #[arg(long)]
    pub frequency: bool,
    /// Maximum distinct values to display per column with --frequency (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CorrelateArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Columns to correlate (defaults to every numeric column)
    #[arg(short = 'C', long = "columns", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// Maximum pairs to display (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: TextFormat,
    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// YAML analysis configuration overriding classifier thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AdviseArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Only print the chart recommendation
    #[arg(long)]
    pub charts: bool,
    /// Only print formula suggestions
    #[arg(long)]
    pub formulas: bool,
    /// YAML analysis configuration overriding thresholds and formula templates
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Write the JSON document to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// YAML analysis configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TimestampArgs {
    /// Epoch value (seconds or milliseconds) or a date/time string
    pub value: String,
    /// Force the epoch unit instead of detecting it from magnitude
    #[arg(long, value_enum)]
    pub unit: Option<TimestampUnit>,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination YAML file ('-' prints to stdout)
    #[arg(short = 'o', long = "output", default_value = "analysis.yml")]
    pub output: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_names_resolve() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(b';'));
        assert_eq!(parse_delimiter("#"), Ok(b'#'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn advise_flags_parse() {
        let cli = Cli::parse_from(["sheet-insights", "advise", "-i", "data.csv", "--charts"]);
        match cli.command {
            Commands::Advise(args) => {
                assert!(args.charts);
                assert!(!args.formulas);
                assert_eq!(args.source.limit, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
