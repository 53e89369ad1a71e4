use std::{collections::HashSet, path::Path};

use csv::ByteRecord;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    error::{ProfileError, Result},
    io_utils,
};

pub const DEFAULT_SAMPLE_ROWS: usize = 5000;
pub const DEFAULT_HEADER_ROW: usize = 1;

/// How a bounded sample is drawn from a delimited file.
#[derive(Debug, Clone, Copy)]
pub struct SampleOptions {
    pub delimiter: u8,
    /// 1-based record number holding the column names.
    pub header_row: usize,
    /// Maximum number of data rows kept after the header.
    pub row_limit: usize,
    pub encoding: &'static Encoding,
}

impl SampleOptions {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            header_row: DEFAULT_HEADER_ROW,
            row_limit: DEFAULT_SAMPLE_ROWS,
            encoding: UTF_8,
        }
    }

    pub fn header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Bounded in-memory prefix of a delimited file.
///
/// Cells that are empty or only whitespace are stored as `None`. Rows shorter
/// than the header are padded with `None`; fields beyond the header width are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Sample {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn load(path: &Path, options: &SampleOptions) -> Result<Self> {
        if options.header_row == 0 {
            return Err(ProfileError::InvalidConfig(
                "Header row index is 1-based and must be at least 1".to_string(),
            ));
        }
        if options.row_limit == 0 {
            return Err(ProfileError::InvalidConfig(
                "Sample row bound must be at least 1".to_string(),
            ));
        }
        let mut reader = io_utils::open_csv_reader(path, options.delimiter)?;
        let mut record = ByteRecord::new();
        let mut position = 0usize;
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        loop {
            if headers.is_some() && rows.len() >= options.row_limit {
                break;
            }
            let more = reader
                .read_byte_record(&mut record)
                .map_err(|err| ProfileError::csv(path, err))?;
            if !more {
                break;
            }
            position += 1;
            if headers.is_none() {
                if position == options.header_row {
                    let decoded = io_utils::decode_record(&record, options.encoding, path)?;
                    headers = Some(disambiguate_headers(
                        decoded.into_iter().map(|h| h.trim().to_string()),
                    ));
                }
                continue;
            }
            let width = headers.as_ref().map_or(0, Vec::len);
            let mut row = Vec::with_capacity(width);
            for field in record.iter().take(width) {
                row.push(decode_cell(field, options.encoding, path)?);
            }
            row.resize(width, None);
            rows.push(row);
        }

        let headers = headers.unwrap_or_default();
        debug!(
            "Sampled {} row(s) across {} column(s) from {:?} (header row {}, limit {})",
            rows.len(),
            headers.len(),
            path,
            options.header_row,
            options.row_limit
        );
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }
}

/// Repeated header names get a `.<n>` suffix, counting from 1, skipping
/// any suffixed name the file already uses.
fn disambiguate_headers(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let names: Vec<String> = names.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut headers = Vec::with_capacity(names.len());
    for name in &names {
        if taken.insert(name.clone()) {
            headers.push(name.clone());
            continue;
        }
        let renamed = (1..)
            .map(|n| format!("{name}.{n}"))
            .find(|candidate| !names.contains(candidate) && !taken.contains(candidate))
            .unwrap_or_else(|| name.clone());
        debug!("Renamed repeated header '{name}' to '{renamed}'");
        taken.insert(renamed.clone());
        headers.push(renamed);
    }
    headers
}

fn decode_cell(field: &[u8], encoding: &'static Encoding, path: &Path) -> Result<Option<String>> {
    if field.is_empty() {
        return Ok(None);
    }
    let decoded = io_utils::decode_bytes(field, encoding, path)?;
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents).expect("write temp file");
        file
    }

    #[test]
    fn load_reads_headers_and_bounded_rows() {
        let file = write_temp(b"id,name\n1,a\n2,b\n3,c\n");
        let sample = Sample::load(file.path(), &SampleOptions::new(b',').row_limit(2))
            .expect("load sample");
        assert_eq!(sample.headers(), ["id", "name"]);
        assert_eq!(sample.row_count(), 2);
        assert_eq!(sample.rows()[1][1].as_deref(), Some("b"));
    }

    #[test]
    fn load_skips_records_before_header_row() {
        let file = write_temp(b"exported by tool;v2\nid;amount\n7;1.5\n");
        let sample = Sample::load(file.path(), &SampleOptions::new(b';').header_row(2))
            .expect("load sample");
        assert_eq!(sample.headers(), ["id", "amount"]);
        assert_eq!(sample.row_count(), 1);
    }

    #[test]
    fn blank_and_missing_cells_become_none() {
        let file = write_temp(b"a,b,c\n1,  ,\n2\n");
        let sample = Sample::load(file.path(), &SampleOptions::new(b',')).expect("load sample");
        assert_eq!(sample.rows()[0], vec![Some("1".to_string()), None, None]);
        assert_eq!(sample.rows()[1], vec![Some("2".to_string()), None, None]);
    }

    #[test]
    fn header_only_file_yields_empty_sample() {
        let file = write_temp(b"id,name\n");
        let sample = Sample::load(file.path(), &SampleOptions::new(b',')).expect("load sample");
        assert_eq!(sample.column_count(), 2);
        assert!(sample.is_empty());
    }

    #[test]
    fn repeated_headers_are_suffixed() {
        let file = write_temp(b"id,id,name,id,id.1\n1,2,a,3,4\n");
        let sample = Sample::load(file.path(), &SampleOptions::new(b',')).expect("load sample");
        assert_eq!(sample.headers(), ["id", "id.2", "name", "id.3", "id.1"]);
        assert_eq!(sample.rows()[0][1].as_deref(), Some("2"));
    }

    #[test]
    fn zero_row_limit_is_rejected() {
        let file = write_temp(b"id\n1\n");
        let err = Sample::load(file.path(), &SampleOptions::new(b',').row_limit(0)).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidConfig(_)));
    }

    #[test]
    fn zero_header_row_is_rejected() {
        let file = write_temp(b"id\n1\n");
        let err = Sample::load(file.path(), &SampleOptions::new(b',').header_row(0)).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidConfig(_)));
    }

    #[test]
    fn load_decodes_configured_encoding() {
        let (encoded, _, _) = WINDOWS_1252.encode("id,name\n1,Caf\u{e9}\n");
        let file = write_temp(&encoded);
        let sample = Sample::load(
            file.path(),
            &SampleOptions::new(b',').encoding(WINDOWS_1252),
        )
        .expect("load sample");
        assert_eq!(sample.rows()[0][1].as_deref(), Some("Caf\u{e9}"));
    }

    #[test]
    fn new_pads_short_rows() {
        let sample = Sample::new(
            vec!["a".into(), "b".into()],
            vec![vec![Some("1".into())]],
        );
        assert_eq!(sample.rows()[0].len(), 2);
        assert_eq!(sample.column_values(1).collect::<Vec<_>>(), vec![None]);
    }
}
