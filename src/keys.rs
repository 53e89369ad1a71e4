//! Minimal unique-key discovery over a bounded sample.
//!
//! Columns are added left to right until the tuple of their values no longer
//! repeats within the sample. Missing values take part in the comparison and
//! compare equal to each other.

use std::path::Path;

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::{
    error::Result,
    sample::{Sample, SampleOptions},
    types::normalize_column_name,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueKeySelection {
    /// Normalized key column names, in file order.
    pub columns: Vec<String>,
    /// `false` when no prefix was unique and every column was returned.
    pub unique: bool,
    pub sampled_rows: usize,
}

/// Highest number of rows sharing one value combination over `columns`.
///
/// Zero for an empty sample.
pub fn max_multiplicity(sample: &Sample, columns: &[usize]) -> usize {
    sample
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|idx| row.get(*idx).and_then(|cell| cell.as_deref()))
                .collect::<Vec<_>>()
        })
        .counts()
        .into_values()
        .max()
        .unwrap_or(0)
}

pub fn select_unique_keys(sample: &Sample) -> UniqueKeySelection {
    let headers = sample.headers();
    let mut working = Vec::with_capacity(headers.len());
    for idx in 0..headers.len() {
        working.push(idx);
        let multiplicity = max_multiplicity(sample, &working);
        debug!(
            "Key candidate {:?} has max multiplicity {}",
            working.iter().map(|i| &headers[*i]).collect::<Vec<_>>(),
            multiplicity
        );
        if multiplicity == 1 {
            return UniqueKeySelection {
                columns: working
                    .iter()
                    .map(|i| normalize_column_name(&headers[*i]))
                    .collect(),
                unique: true,
                sampled_rows: sample.row_count(),
            };
        }
    }
    UniqueKeySelection {
        columns: headers.iter().map(|h| normalize_column_name(h)).collect(),
        unique: false,
        sampled_rows: sample.row_count(),
    }
}

pub fn discover_unique_keys(path: &Path, options: &SampleOptions) -> Result<UniqueKeySelection> {
    let sample = Sample::load(path, options)?;
    Ok(select_unique_keys(&sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(headers: &[&str], rows: &[&[Option<&str>]]) -> Sample {
        Sample::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
                .collect(),
        )
    }

    #[test]
    fn stops_at_first_unique_prefix() {
        let sample = sample(
            &["region", "store", "clerk"],
            &[
                &[Some("north"), Some("1"), Some("ann")],
                &[Some("north"), Some("2"), Some("ann")],
                &[Some("south"), Some("1"), Some("bob")],
            ],
        );
        let keys = select_unique_keys(&sample);
        assert_eq!(keys.columns, ["REGION", "STORE"]);
        assert!(keys.unique);
    }

    #[test]
    fn single_row_uses_first_column() {
        let sample = sample(&["a", "b"], &[&[Some("x"), Some("y")]]);
        let keys = select_unique_keys(&sample);
        assert_eq!(keys.columns, ["A"]);
        assert!(keys.unique);
    }

    #[test]
    fn missing_values_compare_equal() {
        let sample = sample(
            &["a", "b"],
            &[&[None, Some("1")], &[None, Some("2")]],
        );
        assert_eq!(max_multiplicity(&sample, &[0]), 2);
        assert_eq!(select_unique_keys(&sample).columns, ["A", "B"]);
    }

    #[test]
    fn duplicate_rows_fall_back_to_all_columns() {
        let sample = sample(
            &["a", "b"],
            &[&[Some("1"), Some("x")], &[Some("1"), Some("x")]],
        );
        let keys = select_unique_keys(&sample);
        assert_eq!(keys.columns, ["A", "B"]);
        assert!(!keys.unique);
        assert_eq!(keys.sampled_rows, 2);
    }

    #[test]
    fn empty_sample_returns_every_column() {
        let sample = sample(&["a", "b"], &[]);
        assert_eq!(max_multiplicity(&sample, &[0]), 0);
        let keys = select_unique_keys(&sample);
        assert_eq!(keys.columns, ["A", "B"]);
        assert!(!keys.unique);
    }

    proptest! {
        #[test]
        fn selected_prefix_is_unique_and_minimal(
            rows in proptest::collection::vec(proptest::collection::vec(0u8..3, 3), 1..12)
        ) {
            let headers = vec!["c0".to_string(), "c1".to_string(), "c2".to_string()];
            let sample = Sample::new(
                headers,
                rows.iter()
                    .map(|row| row.iter().map(|v| Some(v.to_string())).collect())
                    .collect(),
            );
            let keys = select_unique_keys(&sample);
            let width = keys.columns.len();
            let prefix: Vec<usize> = (0..width).collect();
            if keys.unique {
                prop_assert_eq!(max_multiplicity(&sample, &prefix), 1);
                if width > 1 {
                    prop_assert!(max_multiplicity(&sample, &prefix[..width - 1]) > 1);
                }
            } else {
                prop_assert_eq!(width, 3);
                prop_assert!(max_multiplicity(&sample, &prefix) > 1);
            }
        }
    }
}
