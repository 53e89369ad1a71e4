//! Column name normalization and primitive type inference.
//!
//! Every value is classified into one of five [`PrimitiveType`]s and a column
//! takes the merge of its non-missing values. The lattice is ordered:
//! whole numbers, then any finite number, then logical tokens, then
//! recognized dates and date-times, and `String` for everything else.
//! Storage names for the warehouse come from an immutable [`StorageTypeMap`].

use std::{fmt, path::Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    sample::{Sample, SampleOptions},
};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

// `%.f` also accepts values without a fractional part.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const BOOLEAN_TOKENS: &[&str] = &["true", "false", "t", "f", "yes", "no", "y", "n"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Integer,
    Float,
    Boolean,
    Timestamp,
    String,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Integer => "integer",
            PrimitiveType::Float => "float",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::String => "string",
        }
    }

    /// Most specific type able to hold both operands.
    pub fn merge(self, other: PrimitiveType) -> PrimitiveType {
        match (self, other) {
            (a, b) if a == b => a,
            (PrimitiveType::Integer, PrimitiveType::Float)
            | (PrimitiveType::Float, PrimitiveType::Integer) => PrimitiveType::Float,
            _ => PrimitiveType::String,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered primitive → storage type lookup table.
#[derive(Debug, Clone, Copy)]
pub struct StorageTypeMap<'a> {
    entries: &'a [(PrimitiveType, &'a str)],
    fallback: &'a str,
}

impl<'a> StorageTypeMap<'a> {
    pub const fn new(entries: &'a [(PrimitiveType, &'a str)], fallback: &'a str) -> Self {
        Self { entries, fallback }
    }

    /// Storage name for `ty`, or the fallback when the table has no entry.
    pub fn lookup(&self, ty: PrimitiveType) -> &'a str {
        self.entries
            .iter()
            .find(|(primitive, _)| *primitive == ty)
            .map(|(_, storage)| *storage)
            .unwrap_or(self.fallback)
    }

    pub fn string_type(&self) -> &'a str {
        self.lookup(PrimitiveType::String)
    }
}

pub const WAREHOUSE_STORAGE_TYPES: StorageTypeMap<'static> = StorageTypeMap::new(
    &[
        (PrimitiveType::Integer, "NUMBER"),
        (PrimitiveType::Float, "FLOAT"),
        (PrimitiveType::Boolean, "BOOLEAN"),
        (PrimitiveType::Timestamp, "TIMESTAMP"),
        (PrimitiveType::String, "STRING"),
    ],
    "STRING",
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub source_name: String,
    pub primitive_type: PrimitiveType,
    pub storage_type: String,
}

/// Normalized column names plus one profile per column, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeProfile {
    pub columns: Vec<String>,
    pub profiles: Vec<ColumnProfile>,
}

impl TypeProfile {
    pub fn profile(&self, name: &str) -> Option<&ColumnProfile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }
}

/// Spaces become underscores, then the name is upper-cased.
pub fn normalize_column_name(name: &str) -> String {
    name.replace(' ', "_").to_uppercase()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.naive_utc())
}

pub fn is_boolean_token(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    BOOLEAN_TOKENS.contains(&lowered.as_str())
}

pub fn classify_value(value: &str) -> PrimitiveType {
    let trimmed = value.trim();
    if trimmed.parse::<i64>().is_ok() {
        PrimitiveType::Integer
    } else if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        PrimitiveType::Float
    } else if is_boolean_token(trimmed) {
        PrimitiveType::Boolean
    } else if parse_timestamp(trimmed).is_some() {
        PrimitiveType::Timestamp
    } else {
        PrimitiveType::String
    }
}

/// Merged type of the non-missing values; `String` when nothing was observed.
pub fn infer_column_type<'v, I>(values: I) -> PrimitiveType
where
    I: IntoIterator<Item = Option<&'v str>>,
{
    let mut inferred: Option<PrimitiveType> = None;
    for value in values.into_iter().flatten() {
        let observed = classify_value(value);
        let merged = match inferred {
            Some(current) => current.merge(observed),
            None => observed,
        };
        if merged == PrimitiveType::String {
            return PrimitiveType::String;
        }
        inferred = Some(merged);
    }
    inferred.unwrap_or(PrimitiveType::String)
}

pub fn profile_sample(sample: &Sample, storage: &StorageTypeMap<'_>) -> TypeProfile {
    let mut profile = TypeProfile::default();
    for (idx, source_name) in sample.headers().iter().enumerate() {
        let name = normalize_column_name(source_name);
        let primitive_type = infer_column_type(sample.column_values(idx));
        debug!("Column '{name}' inferred as {primitive_type}");
        profile.columns.push(name.clone());
        profile.profiles.push(ColumnProfile {
            name,
            source_name: source_name.clone(),
            primitive_type,
            storage_type: storage.lookup(primitive_type).to_string(),
        });
    }
    profile
}

pub fn profile_types(
    path: &Path,
    options: &SampleOptions,
    storage: &StorageTypeMap<'_>,
) -> Result<TypeProfile> {
    let sample = Sample::load(path, options)?;
    Ok(profile_sample(&sample, storage))
}
