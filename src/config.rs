//! YAML profiling configuration.
//!
//! A config file supplies the same options as the `profile` command line.
//! Values given on the command line win over the file.
//!
//! ```yaml
//! file_path: landing/sales_2023-05-01.csv
//! sample_row_bound: 10000
//! header_row_index: 1
//! date_format_override: YYYY-MM-DD
//! input_encoding: windows-1252
//! delimiter: ";"
//! strict_unique_keys: false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    cli::parse_delimiter,
    error::{ProfileError, Result},
    io_utils,
    profile::ProfileOptions,
    sample::{DEFAULT_HEADER_ROW, DEFAULT_SAMPLE_ROWS},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub file_path: Option<PathBuf>,
    pub sample_row_bound: Option<usize>,
    pub header_row_index: Option<usize>,
    pub date_format_override: Option<String>,
    pub input_encoding: Option<String>,
    pub delimiter: Option<String>,
    pub strict_unique_keys: Option<bool>,
}

impl ProfileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let reader = io_utils::open_buffered(path)?;
        serde_yaml::from_reader(reader).map_err(|err| {
            ProfileError::InvalidConfig(format!("Parsing config {path:?}: {err}"))
        })
    }

    /// Fields set in `other` replace the ones in `self`.
    pub fn overlay(self, other: ProfileConfig) -> ProfileConfig {
        ProfileConfig {
            file_path: other.file_path.or(self.file_path),
            sample_row_bound: other.sample_row_bound.or(self.sample_row_bound),
            header_row_index: other.header_row_index.or(self.header_row_index),
            date_format_override: other.date_format_override.or(self.date_format_override),
            input_encoding: other.input_encoding.or(self.input_encoding),
            delimiter: other.delimiter.or(self.delimiter),
            strict_unique_keys: other.strict_unique_keys.or(self.strict_unique_keys),
        }
    }

    pub fn into_options(self) -> Result<ProfileOptions> {
        let file_path = self.file_path.ok_or_else(|| {
            ProfileError::InvalidConfig(
                "An input file is required (--input or file_path)".to_string(),
            )
        })?;
        let delimiter = self
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()
            .map_err(ProfileError::InvalidConfig)?;
        let options = ProfileOptions {
            file_path,
            sample_row_bound: self.sample_row_bound.unwrap_or(DEFAULT_SAMPLE_ROWS),
            header_row_index: self.header_row_index.unwrap_or(DEFAULT_HEADER_ROW),
            date_format_override: self.date_format_override.filter(|f| !f.trim().is_empty()),
            delimiter,
            encoding: io_utils::resolve_encoding(self.input_encoding.as_deref())?,
            strict_unique_keys: self.strict_unique_keys.unwrap_or(false),
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_reads_yaml_fields() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "file_path: data/sales.csv").unwrap();
        writeln!(file, "sample_row_bound: 250").unwrap();
        writeln!(file, "delimiter: pipe").unwrap();
        writeln!(file, "input_encoding: windows-1252").unwrap();

        let config = ProfileConfig::load(file.path()).expect("load config");
        assert_eq!(config.sample_row_bound, Some(250));

        let options = config.into_options().expect("options");
        assert_eq!(options.file_path, PathBuf::from("data/sales.csv"));
        assert_eq!(options.sample_row_bound, 250);
        assert_eq!(options.header_row_index, DEFAULT_HEADER_ROW);
        assert_eq!(options.delimiter, Some(b'|'));
        assert_eq!(options.encoding, WINDOWS_1252);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "sample_rows: 10").unwrap();
        let err = ProfileConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidConfig(_)));
    }

    #[test]
    fn overlay_prefers_explicit_values() {
        let base = ProfileConfig {
            file_path: Some(PathBuf::from("from_file.csv")),
            sample_row_bound: Some(10),
            strict_unique_keys: Some(true),
            ..ProfileConfig::default()
        };
        let cli = ProfileConfig {
            sample_row_bound: Some(99),
            ..ProfileConfig::default()
        };
        let merged = base.overlay(cli);
        assert_eq!(merged.file_path, Some(PathBuf::from("from_file.csv")));
        assert_eq!(merged.sample_row_bound, Some(99));
        assert_eq!(merged.strict_unique_keys, Some(true));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let options = ProfileConfig {
            file_path: Some(PathBuf::from("x.csv")),
            date_format_override: Some("  ".to_string()),
            ..ProfileConfig::default()
        }
        .into_options()
        .expect("options");
        assert_eq!(options.sample_row_bound, DEFAULT_SAMPLE_ROWS);
        assert_eq!(options.delimiter, None);
        assert_eq!(options.date_format_override, None);
        assert_eq!(options.encoding, UTF_8);
        assert!(!options.strict_unique_keys);
    }

    #[test]
    fn missing_input_and_bad_values_are_invalid() {
        assert!(matches!(
            ProfileConfig::default().into_options().unwrap_err(),
            ProfileError::InvalidConfig(_)
        ));
        let bad_delimiter = ProfileConfig {
            file_path: Some(PathBuf::from("x.csv")),
            delimiter: Some(";;".to_string()),
            ..ProfileConfig::default()
        };
        assert!(matches!(
            bad_delimiter.into_options().unwrap_err(),
            ProfileError::InvalidConfig(_)
        ));
        let zero_header = ProfileConfig {
            file_path: Some(PathBuf::from("x.csv")),
            header_row_index: Some(0),
            ..ProfileConfig::default()
        };
        assert!(matches!(
            zero_header.into_options().unwrap_err(),
            ProfileError::InvalidConfig(_)
        ));
    }
}
