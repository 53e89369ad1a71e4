pub mod cli;
pub mod config;
pub mod error;
pub mod io_utils;
pub mod keys;
pub mod output;
pub mod pattern;
pub mod profile;
pub mod sample;
pub mod schema;
pub mod sniff;
pub mod table;
pub mod types;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands},
    config::ProfileConfig,
    sample::SampleOptions,
    types::WAREHOUSE_STORAGE_TYPES,
};

pub use error::ProfileError;
pub use profile::{DatasetProfile, Diagnostic, ProfileOptions, profile_dataset};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_onboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Sniff(args) => handle_sniff(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Keys(args) => handle_keys(&args),
        Commands::Pattern(args) => handle_pattern(&args),
    }
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => ProfileConfig::load(path)
            .with_context(|| format!("Loading config from {path:?}"))?,
        None => ProfileConfig::default(),
    };
    let options = base
        .overlay(ProfileConfig {
            file_path: args.input.clone(),
            sample_row_bound: args.sample_rows,
            header_row_index: args.header_row,
            date_format_override: args.date_format.clone(),
            input_encoding: args.input_encoding.clone(),
            delimiter: args.delimiter.map(|byte| char::from(byte).to_string()),
            strict_unique_keys: args.require_unique_key.then_some(true),
        })
        .into_options()?;
    debug!("Profile options: {options:?}");

    info!("Profiling '{}'", options.file_path.display());
    let profile = profile_dataset(&options)
        .with_context(|| format!("Profiling {:?}", options.file_path))?;

    let format = output::resolve_format(args.output.as_deref(), args.format);
    output::write_profile(&profile, args.output.as_deref(), format)?;
    if let Some(path) = &args.output {
        info!(
            "Profile for {} column(s) written to {:?}",
            profile.columns.len(),
            path
        );
    }
    Ok(())
}

fn handle_sniff(args: &cli::SniffArgs) -> Result<()> {
    let delimiter = sniff::sniff_delimiter(&args.input)
        .with_context(|| format!("Sniffing delimiter of {:?}", args.input))?;
    println!("{}", io_utils::printable_delimiter(delimiter));
    Ok(())
}

fn sample_options(args: &cli::SampleArgs) -> Result<SampleOptions> {
    let delimiter = match args.delimiter {
        Some(delimiter) => delimiter,
        None => sniff::sniff_delimiter(&args.input)
            .with_context(|| format!("Sniffing delimiter of {:?}", args.input))?,
    };
    info!(
        "Sampling '{}' with delimiter '{}'",
        args.input.display(),
        io_utils::printable_delimiter(delimiter)
    );
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    Ok(SampleOptions::new(delimiter)
        .header_row(args.header_row)
        .row_limit(args.sample_rows)
        .encoding(encoding))
}

fn handle_columns(args: &cli::SampleArgs) -> Result<()> {
    let options = sample_options(args)?;
    let profile = types::profile_types(&args.input, &options, &WAREHOUSE_STORAGE_TYPES)
        .with_context(|| format!("Inferring column types from {:?}", args.input))?;
    if profile.profiles.is_empty() {
        info!("No columns found in {:?}", args.input);
        return Ok(());
    }

    let rows = profile
        .profiles
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                column.source_name.clone(),
                column.primitive_type.to_string(),
                column.storage_type.clone(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&["#", "name", "source", "type", "storage"], &rows);
    info!("Listed {} column(s) from {:?}", rows.len(), args.input);
    Ok(())
}

fn handle_keys(args: &cli::SampleArgs) -> Result<()> {
    let options = sample_options(args)?;
    let selection = keys::discover_unique_keys(&args.input, &options)
        .with_context(|| format!("Discovering unique keys in {:?}", args.input))?;
    if !selection.unique {
        warn!(
            "No column prefix is unique within the {} sampled row(s); listing every column",
            selection.sampled_rows
        );
    }
    println!("{}", selection.columns.join(","));
    Ok(())
}

fn handle_pattern(args: &cli::PatternArgs) -> Result<()> {
    let file_name = pattern::base_name(&args.name)
        .with_context(|| format!("{:?} does not end in a file name", args.name))?;
    let found = pattern::extract_file_name_pattern(&file_name);
    if found.date_format.is_none() {
        warn!("No date shape recognized in '{file_name}'");
    }
    println!("file_name_pattern: {}", found.pattern);
    println!("datetime_pattern: {}", found.datetime_pattern());
    Ok(())
}
