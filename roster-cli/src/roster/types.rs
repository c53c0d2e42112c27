//! Roster records, per-row outcomes and the batch run aggregate

use serde::Serialize;
use std::fmt;

/// Column headers expected in the first row of a roster sheet
pub mod columns {
    pub const ROOM_NO: &str = "Room No";
    pub const CURRENT_STUDENT: &str = "Current Student";
    pub const TOTAL_CAPACITY: &str = "Total Capacity";

    pub const ALL: [&str; 3] = [ROOM_NO, CURRENT_STUDENT, TOTAL_CAPACITY];
}

/// A spreadsheet cell reduced to the shapes the importer cares about
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Empty cells and whitespace-only text both count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form, `None` when blank
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(self.to_string().trim().to_string())
    }

    /// Whole-number interpretation of the cell.
    ///
    /// Numeric cells and numeric text are accepted as long as they carry no
    /// fractional part; everything else yields `None`.
    pub fn as_count(&self) -> Option<i64> {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::Bool(_) => return None,
        };

        if !n.is_finite() || n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
            return None;
        }
        Some(n as i64)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // Integral floats print without the trailing ".0" Excel never shows
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// The three roster columns of one spreadsheet row, before validation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    pub room_no: CellValue,
    pub current_student: CellValue,
    pub total_capacity: CellValue,
}

/// A validated room record, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub room_no: String,
    pub current_student: u32,
    pub total_capacity: u32,
}

/// Outcome of a processed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowStatus {
    Success,
    Failed,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Success => write!(f, "Success"),
            RowStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Where a failed row went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Rejected locally, never sent
    Validation,
    /// The API answered with a non-success status
    Server,
    /// The request never completed
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::Server => write!(f, "server"),
            FailureKind::Network => write!(f, "network"),
        }
    }
}

/// Result of processing a single spreadsheet row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowResult {
    /// Spreadsheet row number (header is row 1)
    pub row_index: usize,
    pub status: RowStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// The row as it was read, kept for display
    pub source_row: RosterRecord,
}

impl RowResult {
    pub fn success(row_index: usize, source_row: RosterRecord, message: impl Into<String>) -> Self {
        Self {
            row_index,
            status: RowStatus::Success,
            message: message.into(),
            failure: None,
            source_row,
        }
    }

    pub fn failed(
        row_index: usize,
        source_row: RosterRecord,
        failure: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_index,
            status: RowStatus::Failed,
            message: message.into(),
            failure: Some(failure),
            source_row,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RowStatus::Success
    }
}

/// Aggregate state of one upload attempt.
///
/// Counters only grow while a run is in progress and `results` is append-only,
/// so any snapshot taken mid-run is a prefix of the final state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRun {
    pub total_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    pub results: Vec<RowResult>,
}

impl BatchRun {
    /// Clear everything from a previous run
    pub fn reset(&mut self) {
        *self = BatchRun::default();
    }

    /// Start a run over `total` parsed rows
    pub fn begin(&mut self, total: usize) {
        self.reset();
        self.total_records = total;
    }

    /// Append a row outcome and bump the matching counter
    pub fn record(&mut self, result: RowResult) {
        match result.status {
            RowStatus::Success => self.successful_records += 1,
            RowStatus::Failed => self.failed_records += 1,
        }
        self.results.push(result);
    }

    /// Number of rows processed so far
    pub fn processed(&self) -> usize {
        self.successful_records + self.failed_records
    }

    pub fn is_complete(&self) -> bool {
        self.processed() == self.total_records
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}
