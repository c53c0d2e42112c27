//! Errors that end an import before any row is processed

/// Terminal import failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Neither the declared MIME type nor the file name say xlsx
    InvalidFileType { file_name: String },
    /// The workbook could not be opened or its first sheet read
    UnreadableWorkbook { reason: String },
    /// Header row present but no data rows
    EmptyFile,
    /// No access token in the credential store
    Unauthenticated,
    /// Another run on the same importer has not finished yet
    AlreadyRunning,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::InvalidFileType { file_name } => write!(
                f,
                "'{}' is not an Excel workbook - please select a .xlsx file",
                file_name
            ),
            ImportError::UnreadableWorkbook { reason } => {
                write!(f, "Could not read spreadsheet: {}", reason)
            }
            ImportError::EmptyFile => write!(f, "The selected file contains no data rows"),
            ImportError::Unauthenticated => write!(
                f,
                "No access token found - log in (roster-cli auth set-token) and try again"
            ),
            ImportError::AlreadyRunning => write!(f, "An import is already in progress"),
        }
    }
}

impl std::error::Error for ImportError {}
