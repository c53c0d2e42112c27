//! Local validation of roster records
//!
//! Rules run in a fixed order and stop at the first failure, so every
//! rejected row carries exactly one message.

use super::types::{RosterRecord, RosterRow};

/// Why a row was rejected before being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowValidationError {
    /// Room No is absent or blank
    MissingRoomNo,
    /// Current Student is negative or not a whole number
    InvalidCurrentStudent,
    /// Total Capacity is absent, not a whole number, or not positive
    InvalidTotalCapacity,
    /// More students than beds
    OverCapacity,
}

impl std::fmt::Display for RowValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowValidationError::MissingRoomNo => write!(f, "Missing or invalid Room No"),
            RowValidationError::InvalidCurrentStudent => write!(
                f,
                "Invalid Current Student count (must be a non-negative number)"
            ),
            RowValidationError::InvalidTotalCapacity => write!(
                f,
                "Missing or invalid Total Capacity (must be a positive number)"
            ),
            RowValidationError::OverCapacity => {
                write!(f, "Current Student count cannot exceed Total Capacity")
            }
        }
    }
}

impl std::error::Error for RowValidationError {}

/// Validate a record and project it into a submittable row
pub fn validate_record(record: &RosterRecord) -> Result<RosterRow, RowValidationError> {
    let room_no = record
        .room_no
        .as_text()
        .ok_or(RowValidationError::MissingRoomNo)?;

    // A blank Current Student means an empty room
    let current_student = if record.current_student.is_blank() {
        0
    } else {
        record
            .current_student
            .as_count()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(RowValidationError::InvalidCurrentStudent)?
    };

    let total_capacity = record
        .total_capacity
        .as_count()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or(RowValidationError::InvalidTotalCapacity)?;

    if current_student > total_capacity {
        return Err(RowValidationError::OverCapacity);
    }

    Ok(RosterRow {
        room_no,
        current_student,
        total_capacity,
    })
}
