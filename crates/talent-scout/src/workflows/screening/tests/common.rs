use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::ScreeningConfig;
use crate::workflows::screening::{
    CandidateRecord, Conversation, ConversationReply, ExportError, ExportFormat, ExportReceipt,
    QuestionChain, QuestionRequest, QuestionSource, ScreeningService, SessionExporter, SessionId,
    SourceUnavailable, StaticQuestionTable,
};

pub(super) const PROFILE: [&str; 8] = [
    "hello",
    "Jane Doe",
    "jane.doe@example.com",
    "+1 (555) 123-4567",
    "4 years",
    "Backend Engineer",
    "Berlin, Germany",
    "Rust, Python",
];

pub(super) const ANSWERS: [&str; 6] = [
    "Each value has a single owner and moves transfer it.",
    "Shared ownership with runtime borrow checks.",
    "Generics are monomorphized, trait objects use a vtable.",
    "Tuples are immutable and lists are not.",
    "With try and except blocks around the risky call.",
    "A decorator wraps a function to add behaviour.",
];

#[derive(Default)]
pub(super) struct MemoryExporter {
    exports: Mutex<Vec<(SessionId, CandidateRecord, ExportFormat)>>,
}

impl MemoryExporter {
    pub(super) fn exports(&self) -> Vec<(SessionId, CandidateRecord, ExportFormat)> {
        self.exports.lock().expect("lock").clone()
    }

    pub(super) fn count(&self) -> usize {
        self.exports.lock().expect("lock").len()
    }
}

impl SessionExporter for MemoryExporter {
    fn export(
        &self,
        session_id: &SessionId,
        record: &CandidateRecord,
        format: ExportFormat,
    ) -> Result<ExportReceipt, ExportError> {
        let mut guard = self.exports.lock().expect("lock");
        guard.push((session_id.clone(), record.clone(), format));
        Ok(ExportReceipt {
            path: PathBuf::from(format!(
                "memory/{}-{}.{}",
                session_id,
                guard.len(),
                format.extension()
            )),
            format,
        })
    }
}

/// Fails the first `failures` exports, then delegates to memory.
pub(super) struct FlakyExporter {
    failures: AtomicUsize,
    pub(super) inner: MemoryExporter,
}

impl FlakyExporter {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            inner: MemoryExporter::default(),
        }
    }
}

impl SessionExporter for FlakyExporter {
    fn export(
        &self,
        session_id: &SessionId,
        record: &CandidateRecord,
        format: ExportFormat,
    ) -> Result<ExportReceipt, ExportError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ExportError::Io {
                path: PathBuf::from("read-only/candidate.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"),
            });
        }
        self.inner.export(session_id, record, format)
    }
}

pub(super) struct UnavailableSource;

#[async_trait]
impl QuestionSource for UnavailableSource {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn questions(
        &self,
        _request: &QuestionRequest,
    ) -> Result<Vec<String>, SourceUnavailable> {
        Err(SourceUnavailable::Transport("connection refused".to_string()))
    }
}

/// Always-failing AI provider in front of the built-in table.
pub(super) fn fallback_chain() -> Arc<QuestionChain> {
    Arc::new(QuestionChain::new(vec![
        Arc::new(UnavailableSource),
        Arc::new(StaticQuestionTable::standard()),
    ]))
}

pub(super) fn broken_chain() -> Arc<QuestionChain> {
    Arc::new(QuestionChain::new(vec![Arc::new(UnavailableSource)]))
}

pub(super) fn conversation<E: SessionExporter + 'static>(exporter: Arc<E>) -> Conversation<E> {
    Conversation::new(
        fallback_chain(),
        exporter,
        ScreeningConfig::default(),
        ExportFormat::Json,
    )
}

pub(super) fn service<E: SessionExporter + 'static>(exporter: Arc<E>) -> ScreeningService<E> {
    ScreeningService::new(
        fallback_chain(),
        exporter,
        ScreeningConfig::default(),
        ExportFormat::Csv,
    )
}

pub(super) async fn drive<E: SessionExporter + 'static>(
    conversation: &mut Conversation<E>,
    inputs: &[&str],
) -> Vec<ConversationReply> {
    let mut replies = Vec::with_capacity(inputs.len());
    for input in inputs {
        replies.push(conversation.handle(input).await.expect("turn succeeds"));
    }
    replies
}

/// Profile plus every technical answer, leaving the session in `Summary`.
pub(super) async fn drive_to_summary<E: SessionExporter + 'static>(
    conversation: &mut Conversation<E>,
) {
    drive(conversation, &PROFILE).await;
    drive(conversation, &ANSWERS).await;
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
