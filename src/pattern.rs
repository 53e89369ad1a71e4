//! Date placeholder extraction from file names.

use std::{path::Path, sync::LazyLock};

use chrono::NaiveDate;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

pub const DATETIME_PLACEHOLDER: &str = "{datetime_pattern}";

static ISO_DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("Invalid ISO dashed date pattern"));
static DAY_FIRST_DASHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{2}-\d{2}-\d{4}").expect("Invalid day-first dashed date pattern")
});
// Both compact layouts share this shape; the digits decide which one applies.
static COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{8}").expect("Invalid compact date pattern"));

/// Date layouts recognized inside file names, in matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    YearMonthDayDashed,
    DayMonthYearDashed,
    YearMonthDayCompact,
    DayMonthYearCompact,
}

impl DateFormat {
    pub const PRIORITY: [DateFormat; 4] = [
        DateFormat::YearMonthDayDashed,
        DateFormat::DayMonthYearDashed,
        DateFormat::YearMonthDayCompact,
        DateFormat::DayMonthYearCompact,
    ];

    /// chrono-style format string.
    pub fn strftime(self) -> &'static str {
        match self {
            DateFormat::YearMonthDayDashed => "%Y-%m-%d",
            DateFormat::DayMonthYearDashed => "%d-%m-%Y",
            DateFormat::YearMonthDayCompact => "%Y%m%d",
            DateFormat::DayMonthYearCompact => "%d%m%Y",
        }
    }

    /// Format in `YYYY`/`MM`/`DD` tokens.
    pub fn template(self) -> String {
        strftime_to_template(self.strftime())
    }

    fn shape(self) -> &'static Regex {
        match self {
            DateFormat::YearMonthDayDashed => &*ISO_DASHED,
            DateFormat::DayMonthYearDashed => &*DAY_FIRST_DASHED,
            DateFormat::YearMonthDayCompact | DateFormat::DayMonthYearCompact => &*COMPACT,
        }
    }

    fn found_in(self, file_name: &str) -> bool {
        match self {
            DateFormat::YearMonthDayCompact | DateFormat::DayMonthYearCompact => COMPACT
                .find_iter(file_name)
                .any(|found| compact_layout(found.as_str()) == self),
            _ => self.shape().is_match(file_name),
        }
    }
}

/// `YYYYMMDD` when the digits form a calendar date in that order, else
/// `DDMMYYYY` when they do day-first. Digits valid in neither layout keep
/// the year-first label.
fn compact_layout(digits: &str) -> DateFormat {
    let valid = |year: &str, month: &str, day: &str| {
        match (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>()) {
            (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day).is_some(),
            _ => false,
        }
    };
    if digits.len() != 8 || valid(&digits[0..4], &digits[4..6], &digits[6..8]) {
        DateFormat::YearMonthDayCompact
    } else if valid(&digits[4..8], &digits[2..4], &digits[0..2]) {
        DateFormat::DayMonthYearCompact
    } else {
        DateFormat::YearMonthDayCompact
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNamePattern {
    pub pattern: String,
    pub date_format: Option<DateFormat>,
}

impl FileNamePattern {
    /// Empty when no date shape was found.
    pub fn datetime_pattern(&self) -> String {
        self.date_format
            .map(DateFormat::template)
            .unwrap_or_default()
    }

    pub fn strftime(&self) -> &'static str {
        self.date_format.map(DateFormat::strftime).unwrap_or("")
    }
}

pub fn strftime_to_template(format: &str) -> String {
    format
        .replace("%Y", "YYYY")
        .replace("%m", "MM")
        .replace("%d", "DD")
}

/// Final component of `path`, lossily converted to UTF-8.
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Replaces every occurrence of the highest-priority date shape found in
/// `file_name` with [`DATETIME_PLACEHOLDER`]. Other shapes are left alone.
pub fn extract_file_name_pattern(file_name: &str) -> FileNamePattern {
    for format in DateFormat::PRIORITY {
        if format.found_in(file_name) {
            let pattern = format
                .shape()
                .replace_all(file_name, NoExpand(DATETIME_PLACEHOLDER))
                .into_owned();
            return FileNamePattern {
                pattern,
                date_format: Some(format),
            };
        }
    }
    FileNamePattern {
        pattern: file_name.to_string(),
        date_format: None,
    }
}
