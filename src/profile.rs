//! End-to-end dataset profiling.
//!
//! [`profile_dataset`] runs the sniffer, samples the file once, infers types
//! and unique keys, extracts the file-name pattern and composes both layer
//! schemas into a [`DatasetProfile`]. Shortfalls of the sample are reported as
//! [`Diagnostic`]s rather than errors so callers can decide how to proceed.

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use itertools::Itertools;
use log::{info, warn};
use serde::{Serialize, Serializer};

use crate::{
    error::{ProfileError, Result},
    io_utils,
    keys::select_unique_keys,
    pattern::{base_name, extract_file_name_pattern},
    sample::{DEFAULT_HEADER_ROW, DEFAULT_SAMPLE_ROWS, Sample, SampleOptions},
    schema::{DerivedSchema, Layer, SchemaMap, compose_schema},
    sniff::sniff_delimiter,
    types::{ColumnProfile, WAREHOUSE_STORAGE_TYPES, profile_sample},
};

#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub file_path: PathBuf,
    pub sample_row_bound: usize,
    /// 1-based.
    pub header_row_index: usize,
    /// Used verbatim as `datetime_pattern` when set.
    pub date_format_override: Option<String>,
    /// Skips sniffing when set.
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    /// Turn a missing unique key into [`ProfileError::NoUniqueKey`].
    pub strict_unique_keys: bool,
}

impl ProfileOptions {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            sample_row_bound: DEFAULT_SAMPLE_ROWS,
            header_row_index: DEFAULT_HEADER_ROW,
            date_format_override: None,
            delimiter: None,
            encoding: UTF_8,
            strict_unique_keys: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_row_bound == 0 {
            return Err(ProfileError::InvalidConfig(
                "Sample row bound must be at least 1".to_string(),
            ));
        }
        if self.header_row_index == 0 {
            return Err(ProfileError::InvalidConfig(
                "Header row index is 1-based and must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn sample_options(&self, delimiter: u8) -> SampleOptions {
        SampleOptions::new(delimiter)
            .header_row(self.header_row_index)
            .row_limit(self.sample_row_bound)
            .encoding(self.encoding)
    }
}

/// Non-fatal conditions found while profiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No data rows were found within the sample bound.
    EmptySample,
    /// Every column was returned as the key because no prefix was unique.
    NoUniqueKeyFound { sampled_rows: usize },
    /// The file name carries none of the recognized date shapes.
    UnrecognizedDateShape { file_name: String },
}

/// Structured result handed to the DAG, DDL and model generators.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    #[serde(serialize_with = "serialize_delimiter")]
    pub delimiter: u8,
    pub columns: Vec<String>,
    pub mirror_schema: DerivedSchema,
    pub stage_schema: DerivedSchema,
    pub unique_keys: Vec<String>,
    pub file_name_pattern: String,
    pub datetime_pattern: String,
    pub file_schema: SchemaMap,
    pub column_profiles: Vec<ColumnProfile>,
    pub sample_rows: usize,
    pub unique_key_found: bool,
    pub diagnostics: Vec<Diagnostic>,
}

fn serialize_delimiter<S>(delimiter: &u8, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_char(char::from(*delimiter))
}

pub fn profile_dataset(options: &ProfileOptions) -> Result<DatasetProfile> {
    options.validate()?;
    let path = options.file_path.as_path();

    let delimiter = match options.delimiter {
        Some(delimiter) => delimiter,
        None => sniff_delimiter(path)?,
    };
    info!(
        "Using delimiter '{}' for {:?}",
        io_utils::printable_delimiter(delimiter),
        path
    );

    let sample = Sample::load(path, &options.sample_options(delimiter))?;
    profile_loaded_sample(path, delimiter, &sample, options)
}

fn profile_loaded_sample(
    path: &Path,
    delimiter: u8,
    sample: &Sample,
    options: &ProfileOptions,
) -> Result<DatasetProfile> {
    let storage = &WAREHOUSE_STORAGE_TYPES;
    let mut diagnostics = Vec::new();

    if sample.is_empty() {
        warn!("No data rows found in {path:?}; column types default to string");
        diagnostics.push(Diagnostic::EmptySample);
    }

    let types = profile_sample(sample, storage);
    info!("Profiled {} column(s) from {} row(s)", types.columns.len(), sample.row_count());

    let keys = select_unique_keys(sample);
    if keys.unique {
        info!("Unique key: {}", keys.columns.iter().join(", "));
    } else if options.strict_unique_keys {
        return Err(ProfileError::NoUniqueKey {
            rows: sample.row_count(),
        });
    } else {
        warn!(
            "No unique column prefix within {} sampled row(s); using all {} column(s)",
            sample.row_count(),
            keys.columns.len()
        );
        diagnostics.push(Diagnostic::NoUniqueKeyFound {
            sampled_rows: sample.row_count(),
        });
    }

    let file_name = base_name(path).unwrap_or_default();
    let name_pattern = extract_file_name_pattern(&file_name);
    if name_pattern.date_format.is_none() && options.date_format_override.is_none() {
        warn!("No date shape recognized in file name '{file_name}'");
        diagnostics.push(Diagnostic::UnrecognizedDateShape {
            file_name: file_name.clone(),
        });
    }
    let datetime_pattern = options
        .date_format_override
        .clone()
        .unwrap_or_else(|| name_pattern.datetime_pattern());

    let mirror_schema = compose_schema(
        &types.columns,
        &types.profiles,
        &keys.columns,
        Layer::Mirror,
        storage,
    )?;
    let stage_schema = compose_schema(
        &types.columns,
        &types.profiles,
        &keys.columns,
        Layer::Stage,
        storage,
    )?;

    Ok(DatasetProfile {
        delimiter,
        file_schema: SchemaMap::uniform(&types.columns, storage),
        columns: types.columns,
        mirror_schema,
        stage_schema,
        unique_keys: keys.columns,
        file_name_pattern: name_pattern.pattern,
        datetime_pattern,
        column_profiles: types.profiles,
        sample_rows: sample.row_count(),
        unique_key_found: keys.unique,
        diagnostics,
    })
}
