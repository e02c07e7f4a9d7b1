//! Persisting finished sessions as JSON or CSV files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use super::domain::{CandidateRecord, SessionId};

const MAX_NAME_ATTEMPTS: usize = 100;
const EMAIL_HASH_LEN: usize = 16;

/// Short pseudonymous key for a candidate: the first 16 hex digits of the SHA-256 of
/// the trimmed, lowercased address.
pub fn email_hash(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(EMAIL_HASH_LEN);
    hash
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Where a successful export landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub format: ExportFormat,
}

/// Sink for completed sessions so the conversation can be exercised without a disk.
pub trait SessionExporter: Send + Sync {
    fn export(
        &self,
        session_id: &SessionId,
        record: &CandidateRecord,
        format: ExportFormat,
    ) -> Result<ExportReceipt, ExportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode JSON export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("no free export file name under {}", directory.display())]
    NameExhausted { directory: PathBuf },
    #[error("export task did not finish: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// JSON export envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSession {
    pub session_id: SessionId,
    /// Submission time.
    pub exported_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_hash: Option<String>,
    pub candidate: CandidateRecord,
}

/// Writes one new file per export under `directory`, creating it on demand.
#[derive(Debug, Clone)]
pub struct FileExporter {
    directory: PathBuf,
}

impl FileExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn create_unique(
        &self,
        session_id: &SessionId,
        timestamp: &DateTime<Utc>,
        format: ExportFormat,
    ) -> Result<(PathBuf, File), ExportError> {
        fs::create_dir_all(&self.directory).map_err(|source| ExportError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let stem = format!(
            "candidate_{}_{}",
            file_safe(&session_id.0),
            timestamp.format("%Y%m%d_%H%M%S")
        );

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = match attempt {
                0 => format!("{stem}.{}", format.extension()),
                n => format!("{stem}_{n}.{}", format.extension()),
            };
            let path = self.directory.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ExportError::Io { path, source }),
            }
        }

        Err(ExportError::NameExhausted {
            directory: self.directory.clone(),
        })
    }
}

impl SessionExporter for FileExporter {
    fn export(
        &self,
        session_id: &SessionId,
        record: &CandidateRecord,
        format: ExportFormat,
    ) -> Result<ExportReceipt, ExportError> {
        let exported_at = Utc::now();
        let (path, file) = self.create_unique(session_id, &exported_at, format)?;

        let written = match format {
            ExportFormat::Json => write_json(file, session_id, record, exported_at),
            ExportFormat::Csv => write_csv(file, session_id, record, exported_at),
        };

        if let Err(err) = written {
            // Leave no half-written file behind.
            let _ = fs::remove_file(&path);
            return Err(match err {
                ExportError::Io { source, .. } => ExportError::Io { path, source },
                other => other,
            });
        }

        info!(
            session_id = %session_id,
            path = %path.display(),
            format = format.extension(),
            answers = record.answer_count(),
            "candidate session exported"
        );

        Ok(ExportReceipt { path, format })
    }
}

fn write_json(
    file: File,
    session_id: &SessionId,
    record: &CandidateRecord,
    exported_at: DateTime<Utc>,
) -> Result<(), ExportError> {
    let envelope = ExportedSession {
        session_id: session_id.clone(),
        exported_at,
        email_hash: record.email.as_deref().map(email_hash),
        candidate: record.clone(),
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: PathBuf::new(),
        source,
    })
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    session_id: &'a str,
    exported_at: String,
    full_name: Option<&'a str>,
    email: Option<&'a str>,
    email_hash: Option<String>,
    phone: Option<&'a str>,
    experience_years: Option<u32>,
    desired_position: Option<&'a str>,
    location: Option<&'a str>,
    tech_stack: String,
    technology: Option<&'a str>,
    question: Option<&'a str>,
    answer: Option<&'a str>,
    completed: bool,
}

/// One row per (technology, question, answer); identity columns repeat on every row.
fn csv_rows<'a>(
    session_id: &'a SessionId,
    record: &'a CandidateRecord,
    exported_at: DateTime<Utc>,
) -> Vec<CsvRow<'a>> {
    let hashed_email = record.email.as_deref().map(email_hash);
    let identity = |technology, question, answer| CsvRow {
        session_id: &session_id.0,
        exported_at: exported_at.to_rfc3339(),
        full_name: record.full_name.as_deref(),
        email: record.email.as_deref(),
        email_hash: hashed_email.clone(),
        phone: record.phone.as_deref(),
        experience_years: record.experience_years,
        desired_position: record.desired_position.as_deref(),
        location: record.location.as_deref(),
        tech_stack: record.tech_stack.join("; "),
        technology,
        question,
        answer,
        completed: record.completed,
    };

    let rows: Vec<CsvRow<'a>> = record
        .answers
        .iter()
        .flat_map(|entry| {
            entry.responses.iter().map(move |response| {
                (
                    entry.technology.as_str(),
                    response.question.as_str(),
                    response.answer.as_str(),
                )
            })
        })
        .map(|(technology, question, answer)| {
            identity(Some(technology), Some(question), Some(answer))
        })
        .collect();

    if rows.is_empty() {
        vec![identity(None, None, None)]
    } else {
        rows
    }
}

fn write_csv(
    file: File,
    session_id: &SessionId,
    record: &CandidateRecord,
    exported_at: DateTime<Utc>,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in csv_rows(session_id, record, exported_at) {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: PathBuf::new(),
        source,
    })
}

/// Read a JSON export back into its envelope.
pub fn read_json_export(path: &Path) -> Result<ExportedSession, ExportError> {
    let raw = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn file_safe(value: &str) -> String {
    value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scratch_dir(label: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "talent-scout-export-{label}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn record() -> CandidateRecord {
        let mut record = CandidateRecord {
            full_name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            phone: Some("+15551234567".to_string()),
            experience_years: Some(4),
            desired_position: Some("Backend Engineer".to_string()),
            location: Some("Berlin, Germany".to_string()),
            tech_stack: vec!["Rust".to_string(), "SQL".to_string()],
            completed: true,
            ..CandidateRecord::default()
        };
        record.record_answer("Rust", "What is ownership?", "Single owner, moves transfer it.");
        record.record_answer("Rust", "What is a lifetime?", "A region where a borrow is valid.");
        record.record_answer("SQL", "What is an index?", "A lookup structure, e.g. a B-tree.");
        record
    }

    #[test]
    fn json_export_round_trips() {
        let dir = scratch_dir("json");
        let exporter = FileExporter::new(&dir);
        let session = SessionId("session-000042".to_string());

        let receipt = exporter
            .export(&session, &record(), ExportFormat::Json)
            .expect("export");
        assert_eq!(receipt.format, ExportFormat::Json);
        assert!(receipt.path.starts_with(&dir));
        let name = receipt
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .expect("file name");
        assert!(name.starts_with("candidate_session-000042_"));
        assert!(name.ends_with(".json"));

        let restored = read_json_export(&receipt.path).expect("read back");
        assert_eq!(restored.session_id, session);
        assert_eq!(
            restored.email_hash.as_deref(),
            Some(email_hash("jane@example.com").as_str())
        );
        assert!(restored.exported_at <= Utc::now());
        assert_eq!(restored.candidate, record());
        assert_eq!(
            restored
                .candidate
                .answers
                .iter()
                .map(|entry| entry.technology.as_str())
                .collect::<Vec<_>>(),
            vec!["Rust", "SQL"]
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn csv_export_writes_one_row_per_answer() {
        let dir = scratch_dir("csv");
        let exporter = FileExporter::new(&dir);
        let receipt = exporter
            .export(&SessionId("s-1".to_string()), &record(), ExportFormat::Csv)
            .expect("export");

        let mut reader = csv::Reader::from_path(&receipt.path).expect("open csv");
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(&headers[0], "session_id");
        assert!(headers.iter().any(|header| header == "question"));

        let rows: Vec<csv::StringRecord> = reader
            .records()
            .collect::<Result<_, _>>()
            .expect("rows");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| &row[2] == "Jane Doe"));
        assert!(rows.iter().all(|row| row[4] == email_hash("jane@example.com")));
        assert_eq!(&rows[2][10], "SQL");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn csv_without_answers_writes_identity_row() {
        let session_id = SessionId("s-2".to_string());
        let record = CandidateRecord {
            full_name: Some("Sam".to_string()),
            ..CandidateRecord::default()
        };

        let rows = csv_rows(&session_id, &record, Utc::now());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, Some("Sam"));
        assert!(rows[0].question.is_none());
    }

    #[test]
    fn repeated_exports_never_overwrite() {
        let dir = scratch_dir("unique");
        let exporter = FileExporter::new(&dir);
        let session = SessionId("session-000007".to_string());

        let first = exporter
            .export(&session, &record(), ExportFormat::Json)
            .expect("first");
        let second = exporter
            .export(&session, &record(), ExportFormat::Json)
            .expect("second");

        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_directory_reports_io_error() {
        let dir = scratch_dir("blocked");
        fs::create_dir_all(&dir).expect("scratch");
        let blocker = dir.join("not-a-directory");
        fs::write(&blocker, b"occupied").expect("blocker file");

        let exporter = FileExporter::new(&blocker);
        let err = exporter
            .export(&SessionId("s-3".to_string()), &record(), ExportFormat::Csv)
            .expect_err("directory is a file");
        assert!(matches!(err, ExportError::Io { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn email_hash_is_a_truncated_sha256() {
        assert_eq!(email_hash("jane.doe@example.com"), "86e0b9e56c17cc4d");
        assert_eq!(email_hash("  Jane.Doe@Example.com "), "86e0b9e56c17cc4d");
        assert_eq!(email_hash("ada@analytical.engine.org").len(), 16);
    }

    #[test]
    fn envelope_without_hash_still_reads() {
        let raw = r#"{
            "session_id": "session-000001",
            "exported_at": "2024-05-01T10:00:00Z",
            "candidate": {}
        }"#;
        let envelope: ExportedSession = serde_json::from_str(raw).expect("envelope");
        assert!(envelope.email_hash.is_none());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_safe("../evil id"), "___evil_id");
        assert_eq!(ExportFormat::parse(" CSV "), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("xml"), None);
    }
}
