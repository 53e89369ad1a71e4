//! Delimiter detection from the first few raw lines of a file.
//!
//! The sniffer counts each candidate delimiter across the first
//! [`SNIFF_LINE_COUNT`] lines and picks the most frequent one. It is a
//! best-effort heuristic: quoting is ignored and ties go to the candidate
//! declared first in [`DELIMITER_CANDIDATES`].

use std::{io::BufRead, path::Path};

use log::debug;

use crate::{
    error::{ProfileError, Result},
    io_utils,
};

pub const SNIFF_LINE_COUNT: usize = 3;

/// Candidate delimiters in tie-break order.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

pub fn sniff_delimiter(path: &Path) -> Result<u8> {
    let reader = io_utils::open_buffered(path)?;
    let delimiter = sniff_reader(reader).map_err(|err| ProfileError::io(path, err))?;
    debug!(
        "Sniffed delimiter '{}' from the first {} line(s) of {:?}",
        io_utils::printable_delimiter(delimiter),
        SNIFF_LINE_COUNT,
        path
    );
    Ok(delimiter)
}

/// Reads up to `lines` newline-terminated lines; a short file is not an error.
pub fn read_leading_lines<R: BufRead>(reader: &mut R, lines: usize) -> std::io::Result<Vec<u8>> {
    let mut sample = Vec::new();
    for _ in 0..lines {
        let read = reader.read_until(b'\n', &mut sample)?;
        if read == 0 {
            break;
        }
    }
    Ok(sample)
}

pub fn count_candidates(sample: &[u8]) -> [usize; DELIMITER_CANDIDATES.len()] {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    for byte in sample {
        if let Some(slot) = DELIMITER_CANDIDATES.iter().position(|c| c == byte) {
            counts[slot] += 1;
        }
    }
    counts
}

pub fn pick_delimiter(sample: &[u8]) -> u8 {
    let counts = count_candidates(sample);
    let mut best = 0usize;
    for (slot, count) in counts.iter().enumerate().skip(1) {
        // strictly greater keeps the earliest candidate on ties
        if *count > counts[best] {
            best = slot;
        }
    }
    DELIMITER_CANDIDATES[best]
}

pub fn sniff_reader<R: BufRead>(mut reader: R) -> std::io::Result<u8> {
    let sample = read_leading_lines(&mut reader, SNIFF_LINE_COUNT)?;
    Ok(pick_delimiter(&sample))
}
