// src/timesheet.rs
//! Month grouping, duration resolution and row layout for the exported timesheet.
//!
//! Nothing in here does I/O. [`build_sheet`] is the whole conversion: it takes
//! the flat list of fetched records and yields a [`RenderedSheet`] or an
//! [`ExportError`]. Turning the sheet into bytes is [`crate::xlsx`]'s job.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ess_data::ActivityRecord;

pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const COLUMN_HEADERS: [&str; 3] = ["Tanggal", "Durasi (Jam)", "Kegiatan"];

const MONTHS_TITLE: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTHS_UPPER: [&str; 12] = [
    "JANUARI",
    "FEBRUARI",
    "MARET",
    "APRIL",
    "MEI",
    "JUNI",
    "JULI",
    "AGUSTUS",
    "SEPTEMBER",
    "OKTOBER",
    "NOVEMBER",
    "DESEMBER",
];

// --- Errors ---

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("invalid date format: {0}")]
    MalformedDate(String),

    #[error("no activity found for project '{0}'")]
    ProjectNotFound(String),

    #[error("invalid duration range: min {min} is greater than max {max}")]
    InvalidDurationRange { min: i32, max: i32 },

    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// --- Params & options ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportParams {
    pub project_filter: String,
    pub is_randomize_duration: bool,
    pub min_duration: i32,
    pub max_duration: i32,
}

impl ExportParams {
    /// Params that keep every original duration.
    pub fn new(project_filter: impl Into<String>) -> Self {
        Self {
            project_filter: project_filter.into(),
            is_randomize_duration: false,
            min_duration: 0,
            max_duration: 0,
        }
    }

    pub fn randomized(mut self, min_duration: i32, max_duration: i32) -> Self {
        self.is_randomize_duration = true;
        self.min_duration = min_duration;
        self.max_duration = max_duration;
        self
    }

    /// Validates the range and picks how durations are resolved.
    pub fn duration_mode(&self) -> Result<DurationMode, ExportError> {
        if !self.is_randomize_duration {
            return Ok(DurationMode::Original);
        }
        if self.max_duration < self.min_duration {
            return Err(ExportError::InvalidDurationRange {
                min: self.min_duration,
                max: self.max_duration,
            });
        }
        Ok(DurationMode::Randomized(self.min_duration..=self.max_duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthNameCase {
    /// "Januari"
    Title,
    /// "JANUARI"
    #[default]
    Upper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetOptions {
    pub month_case: MonthNameCase,
    pub styled: bool,
    pub font_name: String,
    pub font_size: f64,
    pub column_width: f64,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            month_case: MonthNameCase::Upper,
            styled: true,
            font_name: "Times New Roman".to_string(),
            font_size: 12.0,
            column_width: 15.0,
        }
    }
}

/// Indonesian name for a 1-based month number.
pub fn month_name(month: u32, case: MonthNameCase) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    match case {
        MonthNameCase::Title => MONTHS_TITLE.get(index).copied(),
        MonthNameCase::Upper => MONTHS_UPPER.get(index).copied(),
    }
}

// --- Month Grouper ---

/// `(year, month)` bucket. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub year: i32,
    pub month: u32,
}

impl GroupKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub type MonthGroups = BTreeMap<GroupKey, Vec<ActivityRecord>>;

/// Parses a strict `DD-MM-YYYY` date. chrono alone accepts single-digit fields.
pub fn parse_record_date(date_string: &str) -> Result<NaiveDate, ExportError> {
    let bytes = date_string.as_bytes();
    let well_shaped = bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !well_shaped {
        return Err(ExportError::MalformedDate(date_string.to_string()));
    }
    NaiveDate::parse_from_str(date_string, DATE_FORMAT)
        .map_err(|_| ExportError::MalformedDate(date_string.to_string()))
}

/// Keeps the records of `project_filter` and buckets them by month.
///
/// Arrival order is kept inside each bucket. The first unparsable date of a
/// matching record aborts the whole grouping.
pub fn group_by_month(
    records: &[ActivityRecord],
    project_filter: &str,
) -> Result<MonthGroups, ExportError> {
    let mut grouped = MonthGroups::new();
    for record in records.iter().filter(|r| r.project_name == project_filter) {
        let date = parse_record_date(&record.date_string).map_err(|e| {
            warn!("Record {} has malformed date '{}'", record.id, record.date_string);
            e
        })?;
        grouped
            .entry(GroupKey::from_date(date))
            .or_default()
            .push(record.clone());
    }
    debug!(
        "Grouped {} month(s) for project '{}'",
        grouped.len(),
        project_filter
    );
    Ok(grouped)
}

// --- Duration Resolver ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationMode {
    Original,
    Randomized(RangeInclusive<i32>),
}

impl DurationMode {
    /// Every call on a randomized mode is an independent draw.
    pub fn resolve<R: Rng + ?Sized>(&self, original: i32, rng: &mut R) -> i32 {
        match self {
            DurationMode::Original => original,
            DurationMode::Randomized(range) => rng.gen_range(range.clone()),
        }
    }
}

// --- Sheet Renderer ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRow {
    Blank,
    MonthLabel(String),
    ColumnHeader,
    Data {
        date: String,
        duration: i32,
        detail: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSheet {
    rows: Vec<SheetRow>,
}

impl RenderedSheet {
    /// Rows paired with their 1-based row number.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (u32, &SheetRow)> + '_ {
        (1u32..).zip(self.rows.iter())
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn data_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, SheetRow::Data { .. }))
            .count()
    }

    fn push(&mut self, row: SheetRow) {
        self.rows.push(row);
    }
}

pub fn render<R: Rng + ?Sized>(
    grouped: &MonthGroups,
    mode: &DurationMode,
    options: &SheetOptions,
    rng: &mut R,
) -> RenderedSheet {
    let mut sheet = RenderedSheet::default();

    for (index, (key, records)) in grouped.iter().enumerate() {
        if index > 0 {
            sheet.push(SheetRow::Blank);
        }

        // GroupKey only ever comes from a parsed date, so the month is in range.
        let label = month_name(key.month, options.month_case).unwrap_or_default();
        sheet.push(SheetRow::MonthLabel(label.to_string()));
        sheet.push(SheetRow::ColumnHeader);

        for record in records {
            sheet.push(SheetRow::Data {
                date: record.date_string.clone(),
                duration: mode.resolve(record.duration, rng),
                detail: record.activity_detail.clone(),
            });
        }
    }

    sheet
}

/// Full conversion: validate, group, check the project exists, render.
pub fn build_sheet<R: Rng + ?Sized>(
    records: &[ActivityRecord],
    params: &ExportParams,
    options: &SheetOptions,
    rng: &mut R,
) -> Result<RenderedSheet, ExportError> {
    let mode = params.duration_mode()?;
    let grouped = group_by_month(records, &params.project_filter)?;
    if grouped.is_empty() {
        return Err(ExportError::ProjectNotFound(params.project_filter.clone()));
    }

    let sheet = render(&grouped, &mode, options, rng);
    info!(
        "Rendered {} month(s), {} data row(s) for project '{}'",
        grouped.len(),
        sheet.data_row_count(),
        params.project_filter
    );
    Ok(sheet)
}
