//! Batch roster importer
//!
//! Reads a roster workbook, validates every row, and submits the valid ones
//! one at a time. Each row's outcome is appended to the current [`BatchRun`],
//! which is republished after every row so observers can follow progress.
//!
//! Rows are processed strictly in sequence: the next row is not looked at
//! until the previous submission has resolved. This keeps at most one
//! request in flight and makes `results` come out in spreadsheet order.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use super::error::ImportError;
use super::excel::{SheetRow, read_roster_sheet};
use super::types::{BatchRun, FailureKind, RosterRecord, RosterRow, RowResult};
use super::validate::{RowValidationError, validate_record};
use crate::api::{RoomSubmitter, SubmitOutcome};
use crate::config::CredentialProvider;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Room saved successfully";
pub const DEFAULT_SERVER_ERROR: &str = "Server error occurred";

/// A user-supplied file: name, declared MIME type and contents
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    /// Read a file from disk; files on disk carry no declared MIME type
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, None, bytes))
    }

    /// Accepted if either the MIME type or the extension says xlsx
    pub fn is_spreadsheet(&self) -> bool {
        let mime_ok = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case(XLSX_MIME_TYPE));
        mime_ok || self.name.to_ascii_lowercase().ends_with(".xlsx")
    }

    fn ensure_spreadsheet(&self) -> Result<(), ImportError> {
        if self.is_spreadsheet() {
            Ok(())
        } else {
            Err(ImportError::InvalidFileType {
                file_name: self.name.clone(),
            })
        }
    }
}

/// One row of a dry run
#[derive(Debug, Clone)]
pub struct PreviewRow {
    pub row_index: usize,
    pub record: RosterRecord,
    pub outcome: Result<RosterRow, RowValidationError>,
}

/// Clears the running flag when a run ends, however it ends
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ImportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ImportError::AlreadyRunning)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the current [`BatchRun`] and drives imports against it
pub struct Importer {
    credentials: Arc<dyn CredentialProvider>,
    run: watch::Sender<BatchRun>,
    running: AtomicBool,
}

impl Importer {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        let (run, _) = watch::channel(BatchRun::default());
        Self {
            credentials,
            run,
            running: AtomicBool::new(false),
        }
    }

    /// Observe the run; the receiver sees every per-row update
    pub fn subscribe(&self) -> watch::Receiver<BatchRun> {
        self.run.subscribe()
    }

    /// Copy of the current run state
    pub fn snapshot(&self) -> BatchRun {
        self.run.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Accept a file for import and clear the previous run.
    ///
    /// Rejected files leave the current state untouched.
    pub fn select_file(&self, file: &SourceFile) -> Result<(), ImportError> {
        if self.is_running() {
            return Err(ImportError::AlreadyRunning);
        }
        file.ensure_spreadsheet()?;

        self.run.send_modify(BatchRun::reset);
        debug!("Selected {} ({} bytes)", file.name, file.bytes.len());
        Ok(())
    }

    /// Run a full import of `file`, submitting valid rows through `submitter`.
    ///
    /// Terminal problems (wrong file type, unreadable or empty workbook,
    /// missing token) are returned as [`ImportError`]; problems with
    /// individual rows are recorded in the returned run and never abort it.
    pub async fn run_import<S>(&self, file: &SourceFile, submitter: &S) -> Result<BatchRun, ImportError>
    where
        S: RoomSubmitter + ?Sized,
    {
        let _guard = RunGuard::acquire(&self.running)?;
        file.ensure_spreadsheet()?;

        self.run.send_modify(BatchRun::reset);

        let rows = parse_rows(file)?;

        // Publish the total before the first row so progress is determinate
        self.run.send_modify(|run| run.begin(rows.len()));

        let token = self
            .credentials
            .get_token()
            .ok_or(ImportError::Unauthenticated)?;

        info!("Importing {} rows from {}", rows.len(), file.name);

        for sheet_row in &rows {
            let result = process_row(sheet_row, &token, submitter).await;
            self.run.send_modify(|run| run.record(result));
        }

        let finished = self.snapshot();
        info!(
            "Import of {} finished: {} succeeded, {} failed",
            file.name, finished.successful_records, finished.failed_records
        );
        Ok(finished)
    }
}

fn parse_rows(file: &SourceFile) -> Result<Vec<SheetRow>, ImportError> {
    let rows = read_roster_sheet(&file.bytes).map_err(|e| ImportError::UnreadableWorkbook {
        reason: format!("{:#}", e),
    })?;

    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }
    Ok(rows)
}

/// Validate one row and, if it passes, submit it
async fn process_row<S>(sheet_row: &SheetRow, token: &str, submitter: &S) -> RowResult
where
    S: RoomSubmitter + ?Sized,
{
    let row_index = sheet_row.row_index;
    let record = sheet_row.to_record();

    let row = match validate_record(&record) {
        Ok(row) => row,
        Err(e) => {
            warn!("Row {}: {}", row_index, e);
            return RowResult::failed(row_index, record, FailureKind::Validation, e.to_string());
        }
    };

    match submitter.submit(&row, token).await {
        Ok(SubmitOutcome::Accepted { message }) => {
            debug!("Row {}: room {} saved", row_index, row.room_no);
            RowResult::success(
                row_index,
                record,
                message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            )
        }
        Ok(SubmitOutcome::Rejected { status, message }) => {
            let message = message.unwrap_or_else(|| DEFAULT_SERVER_ERROR.to_string());
            warn!(
                "Row {}: server rejected room {} ({}): {}",
                row_index,
                row.room_no,
                status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                message
            );
            RowResult::failed(row_index, record, FailureKind::Server, message)
        }
        Err(e) => {
            warn!("Row {}: request failed: {:#}", row_index, e);
            RowResult::failed(
                row_index,
                record,
                FailureKind::Network,
                format!("Network error: {:#}", e),
            )
        }
    }
}

/// Parse and validate `file` without a token or any submission
pub fn preview_file(file: &SourceFile) -> Result<Vec<PreviewRow>, ImportError> {
    file.ensure_spreadsheet()?;

    Ok(parse_rows(file)?
        .iter()
        .map(|sheet_row| {
            let record = sheet_row.to_record();
            let outcome = validate_record(&record);
            PreviewRow {
                row_index: sheet_row.row_index,
                record,
                outcome,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryStore, StoredCredentials};
    use crate::roster::types::{CellValue, RowStatus, columns};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rust_xlsxwriter::Workbook;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Clone, Copy)]
    enum Cell {
        Num(f64),
        Text(&'static str),
        Blank,
    }

    fn workbook(rows: &[[Cell; 3]]) -> SourceFile {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, h) in columns::ALL.iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32 + 1, c as u16);
                match cell {
                    Cell::Num(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Text(s) => {
                        sheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
        SourceFile::new("rooms.xlsx", None, workbook.save_to_buffer().unwrap())
    }

    fn importer_with_token() -> Importer {
        Importer::new(Arc::new(StoredCredentials::new(MemoryStore::with_entry(
            "jwtToken", "secret",
        ))))
    }

    /// Records submitted rooms and answers from a script (default: accept)
    #[derive(Default)]
    struct StubSubmitter {
        calls: Mutex<Vec<(String, String)>>,
        script: Mutex<Vec<Result<SubmitOutcome, String>>>,
    }

    impl StubSubmitter {
        fn scripted(outcomes: Vec<Result<SubmitOutcome, String>>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                script: Mutex::new(outcomes.into_iter().rev().collect()),
            }
        }

        fn rooms(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
        }
    }

    fn accepted(message: Option<&str>) -> Result<SubmitOutcome, String> {
        Ok(SubmitOutcome::Accepted {
            message: message.map(str::to_string),
        })
    }

    #[async_trait]
    impl RoomSubmitter for StubSubmitter {
        async fn submit(&self, row: &RosterRow, token: &str) -> Result<SubmitOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((row.room_no.clone(), token.to_string()));
            match self.script.lock().unwrap().pop() {
                Some(Ok(outcome)) => Ok(outcome),
                Some(Err(e)) => Err(anyhow!(e)),
                None => Ok(SubmitOutcome::Accepted { message: None }),
            }
        }
    }

    #[tokio::test]
    async fn test_mixed_rows_scenario() {
        let file = workbook(&[
            [Cell::Num(101.0), Cell::Num(2.0), Cell::Num(4.0)],
            [Cell::Text(""), Cell::Num(1.0), Cell::Num(3.0)],
            [Cell::Num(103.0), Cell::Num(5.0), Cell::Num(2.0)],
        ]);
        let importer = importer_with_token();
        let submitter = StubSubmitter::default();

        importer.select_file(&file).unwrap();
        let run = importer.run_import(&file, &submitter).await.unwrap();

        assert_eq!(run.total_records, 3);
        assert_eq!(run.successful_records, 1);
        assert_eq!(run.failed_records, 2);
        assert!(run.is_complete());

        let statuses: Vec<_> = run.results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![RowStatus::Success, RowStatus::Failed, RowStatus::Failed]
        );
        assert_eq!(run.results[0].message, DEFAULT_SUCCESS_MESSAGE);
        assert_eq!(run.results[1].message, "Missing or invalid Room No");
        assert_eq!(
            run.results[2].message,
            "Current Student count cannot exceed Total Capacity"
        );
        assert_eq!(run.results[2].failure, Some(FailureKind::Validation));

        let indices: Vec<_> = run.results.iter().map(|r| r.row_index).collect();
        assert_eq!(indices, vec![2, 3, 4]);

        // Only the valid row reached the API, with the stored token
        assert_eq!(
            *submitter.calls.lock().unwrap(),
            vec![("101".to_string(), "secret".to_string())]
        );
        assert_eq!(importer.snapshot(), run);
    }

    #[tokio::test]
    async fn test_missing_token_aborts_before_any_row() {
        let file = workbook(&[[Cell::Num(101.0), Cell::Num(1.0), Cell::Num(2.0)]]);
        let importer = Importer::new(Arc::new(StoredCredentials::new(MemoryStore::new())));
        let submitter = StubSubmitter::default();

        let err = importer.run_import(&file, &submitter).await.unwrap_err();
        assert_eq!(err, ImportError::Unauthenticated);

        let run = importer.snapshot();
        assert!(run.results.is_empty());
        assert_eq!(run.processed(), 0);
        assert!(submitter.rooms().is_empty());
        assert!(!importer.is_running());
    }

    #[tokio::test]
    async fn test_network_error_is_recorded_per_row() {
        let file = workbook(&[
            [Cell::Text("A1"), Cell::Num(0.0), Cell::Num(2.0)],
            [Cell::Text("A2"), Cell::Blank, Cell::Num(2.0)],
        ]);
        let importer = importer_with_token();
        let submitter = StubSubmitter::scripted(vec![
            accepted(Some("Room A1 updated")),
            Err("connection refused".to_string()),
        ]);

        let run = importer.run_import(&file, &submitter).await.unwrap();

        assert_eq!(run.results[0].status, RowStatus::Success);
        assert_eq!(run.results[0].message, "Room A1 updated");
        assert_eq!(run.results[1].status, RowStatus::Failed);
        assert!(run.results[1].message.starts_with("Network error: "));
        assert_eq!(run.results[1].failure, Some(FailureKind::Network));
        assert_eq!(submitter.rooms(), vec!["A1", "A2"]);
    }

    #[tokio::test]
    async fn test_server_rejection_uses_server_message_or_default() {
        let file = workbook(&[
            [Cell::Text("A1"), Cell::Num(0.0), Cell::Num(2.0)],
            [Cell::Text("A2"), Cell::Num(0.0), Cell::Num(2.0)],
        ]);
        let importer = importer_with_token();
        let submitter = StubSubmitter::scripted(vec![
            Ok(SubmitOutcome::Rejected {
                status: Some(403),
                message: Some("Only the provost may edit rooms".to_string()),
            }),
            Ok(SubmitOutcome::Rejected {
                status: Some(500),
                message: None,
            }),
        ]);

        let run = importer.run_import(&file, &submitter).await.unwrap();

        assert_eq!(run.failed_records, 2);
        assert_eq!(run.results[0].message, "Only the provost may edit rooms");
        assert_eq!(run.results[1].message, DEFAULT_SERVER_ERROR);
        assert_eq!(run.results[1].failure, Some(FailureKind::Server));
    }

    #[tokio::test]
    async fn test_empty_file_is_terminal() {
        let file = workbook(&[]);
        let importer = importer_with_token();
        let submitter = StubSubmitter::default();

        let err = importer.run_import(&file, &submitter).await.unwrap_err();
        assert_eq!(err, ImportError::EmptyFile);
        assert_eq!(importer.snapshot(), BatchRun::default());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_terminal() {
        let file = SourceFile::new("rooms.xlsx", None, b"not a zip".to_vec());
        let importer = importer_with_token();

        let err = importer
            .run_import(&file, &StubSubmitter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnreadableWorkbook { .. }));
    }

    #[test]
    fn test_file_type_check() {
        let by_name = SourceFile::new("Rooms.XLSX", None, Vec::new());
        let by_mime = SourceFile::new("upload", Some(XLSX_MIME_TYPE.to_string()), Vec::new());
        let csv = SourceFile::new("rooms.csv", Some("text/csv".to_string()), Vec::new());
        let legacy = SourceFile::new("rooms.xls", None, Vec::new());

        assert!(by_name.is_spreadsheet());
        assert!(by_mime.is_spreadsheet());
        assert!(!csv.is_spreadsheet());
        assert!(!legacy.is_spreadsheet());
    }

    #[tokio::test]
    async fn test_select_file_resets_previous_run() {
        let file = workbook(&[[Cell::Num(101.0), Cell::Num(1.0), Cell::Num(2.0)]]);
        let importer = importer_with_token();
        importer
            .run_import(&file, &StubSubmitter::default())
            .await
            .unwrap();
        assert_eq!(importer.snapshot().processed(), 1);

        // A rejected file leaves the previous run alone
        let csv = SourceFile::new("rooms.csv", None, Vec::new());
        assert_eq!(
            importer.select_file(&csv),
            Err(ImportError::InvalidFileType {
                file_name: "rooms.csv".to_string()
            })
        );
        assert_eq!(importer.snapshot().processed(), 1);

        importer.select_file(&file).unwrap();
        let run = importer.snapshot();
        assert_eq!(run.total_records, 0);
        assert_eq!(run.successful_records, 0);
        assert_eq!(run.failed_records, 0);
        assert!(run.results.is_empty());
    }

    /// Captures what an observer sees at the moment each row is submitted
    struct ObservingSubmitter {
        progress: watch::Receiver<BatchRun>,
        seen: Mutex<Vec<(usize, usize)>>,
    }

    #[async_trait]
    impl RoomSubmitter for ObservingSubmitter {
        async fn submit(&self, _row: &RosterRow, _token: &str) -> Result<SubmitOutcome> {
            let run = self.progress.borrow();
            self.seen
                .lock()
                .unwrap()
                .push((run.total_records, run.processed()));
            Ok(SubmitOutcome::Accepted { message: None })
        }
    }

    #[tokio::test]
    async fn test_progress_is_published_after_every_row() {
        let file = workbook(&[
            [Cell::Num(1.0), Cell::Num(0.0), Cell::Num(1.0)],
            [Cell::Num(2.0), Cell::Num(9.0), Cell::Num(1.0)],
            [Cell::Num(3.0), Cell::Num(0.0), Cell::Num(1.0)],
        ]);
        let importer = importer_with_token();
        let submitter = ObservingSubmitter {
            progress: importer.subscribe(),
            seen: Mutex::new(Vec::new()),
        };

        let run = importer.run_import(&file, &submitter).await.unwrap();

        // Total is known up front; row 3 (invalid) was counted before row 4 was sent
        assert_eq!(*submitter.seen.lock().unwrap(), vec![(3, 0), (3, 2)]);
        assert_eq!(run.processed(), run.total_records);
    }

    /// Holds every submission until released
    struct GatedSubmitter {
        release: Notify,
    }

    #[async_trait]
    impl RoomSubmitter for GatedSubmitter {
        async fn submit(&self, _row: &RosterRow, _token: &str) -> Result<SubmitOutcome> {
            self.release.notified().await;
            Ok(SubmitOutcome::Accepted { message: None })
        }
    }

    #[tokio::test]
    async fn test_second_run_is_rejected_while_running() {
        let file = workbook(&[[Cell::Num(101.0), Cell::Num(1.0), Cell::Num(2.0)]]);
        let importer = importer_with_token();
        let gate = GatedSubmitter {
            release: Notify::new(),
        };

        let first = importer.run_import(&file, &gate);
        let second = async {
            tokio::task::yield_now().await;
            assert!(importer.is_running());
            assert_eq!(importer.select_file(&file), Err(ImportError::AlreadyRunning));
            let result = importer.run_import(&file, &gate).await;
            gate.release.notify_one();
            result
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(second.unwrap_err(), ImportError::AlreadyRunning);
        assert_eq!(first.unwrap().successful_records, 1);
        assert!(!importer.is_running());
    }

    #[test]
    fn test_preview_reports_every_row() {
        let file = workbook(&[
            [Cell::Text("C3"), Cell::Blank, Cell::Num(2.0)],
            [Cell::Text("C4"), Cell::Num(-1.0), Cell::Num(2.0)],
        ]);

        let rows = preview_file(&file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_index, 2);
        assert_eq!(rows[0].outcome.as_ref().unwrap().current_student, 0);
        assert_eq!(rows[1].record.current_student, CellValue::Number(-1.0));
        assert_eq!(
            rows[1].outcome,
            Err(RowValidationError::InvalidCurrentStudent)
        );
    }
}
