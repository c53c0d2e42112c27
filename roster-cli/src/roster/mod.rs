//! Batch room-roster import
//!
//! Spreadsheet in, one POST per valid row out, with a [`BatchRun`] recording
//! what happened to every row.

pub mod error;
pub mod excel;
pub mod importer;
pub mod types;
pub mod validate;

pub use error::ImportError;
pub use importer::{
    DEFAULT_SERVER_ERROR, DEFAULT_SUCCESS_MESSAGE, Importer, PreviewRow, SourceFile,
    XLSX_MIME_TYPE, preview_file,
};
pub use types::{
    BatchRun, CellValue, FailureKind, RosterRecord, RosterRow, RowResult, RowStatus, columns,
};
pub use validate::{RowValidationError, validate_record};
