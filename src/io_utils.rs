//! File access, decoding, and delimiter helpers.
//!
//! Every read performed by the profiler goes through this module so that
//! failures carry the offending path and handles are dropped on every exit
//! path. Input is decoded with `encoding_rs`, defaulting to UTF-8.

use std::{fs::File, io::BufReader, path::Path};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{ProfileError, Result};

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| ProfileError::InvalidConfig(format!("Unknown encoding '{value}'"))),
        None => Ok(UTF_8),
    }
}

pub fn open_buffered(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|err| ProfileError::io(path, err))?;
    Ok(BufReader::new(file))
}

/// Opens `path` as headerless, flexible delimited records.
///
/// Header handling is left to the caller because the header may sit on any
/// row of the file.
pub fn open_csv_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    let reader = open_buffered(path)?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    Ok(builder.from_reader(reader))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(ProfileError::Encoding {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    path: &Path,
) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding, path))
        .collect()
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
