use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::sample::{DEFAULT_HEADER_ROW, DEFAULT_SAMPLE_ROWS};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile delimited files for warehouse onboarding", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Profile a file and emit delimiter, columns, keys and layer schemas
    Profile(ProfileArgs),
    /// Detect the field delimiter from the first lines of a file
    Sniff(SniffArgs),
    /// List normalized column names with their inferred types
    Columns(SampleArgs),
    /// Find the shortest column prefix that uniquely identifies sampled rows
    Keys(SampleArgs),
    /// Replace the date embedded in a file name with a placeholder
    Pattern(PatternArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Delimited file to profile (may be given by the config file instead)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// YAML file with profiling options
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Write the profile here instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format (defaults to the output file extension, then json)
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,
    /// Maximum number of data rows to sample [default: 5000]
    #[arg(long = "sample-rows")]
    pub sample_rows: Option<usize>,
    /// 1-based row holding the column names [default: 1]
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,
    /// Field delimiter (supports ',', 'tab', ';', '|'); sniffed when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Date format written verbatim as the datetime pattern, e.g. YYYY-MM-DD
    #[arg(long = "date-format")]
    pub date_format: Option<String>,
    /// Fail instead of falling back to all columns when no unique key exists
    #[arg(long = "require-unique-key")]
    pub require_unique_key: bool,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Delimited file to sample
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Maximum number of data rows to sample
    #[arg(long = "sample-rows", default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,
    /// 1-based row holding the column names
    #[arg(long = "header-row", default_value_t = DEFAULT_HEADER_ROW)]
    pub header_row: usize,
    /// Field delimiter (supports ',', 'tab', ';', '|'); sniffed when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SniffArgs {
    /// File whose first lines are inspected
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct PatternArgs {
    /// File name (directories are stripped)
    pub name: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
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
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("::").is_err());
        assert!(parse_delimiter("\u{e9}").is_err());
    }

    #[test]
    fn profile_delimiter_is_parsed_with_arguments() {
        let cli = Cli::try_parse_from(["csv-onboard", "profile", "--delimiter", "tab"])
            .expect("parse profile args");
        match cli.command {
            Commands::Profile(args) => assert_eq!(args.delimiter, Some(b'\t')),
            other => panic!("unexpected command {other:?}"),
        }

        let err = Cli::try_parse_from(["csv-onboard", "profile", "--delimiter", "::"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
