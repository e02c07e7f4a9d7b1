use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use super::conversation::{Conversation, ConversationError, ConversationReply, ConversationStage};
use super::domain::SessionId;
use super::export::{ExportFormat, ExportReceipt, SessionExporter};
use super::questions::QuestionChain;
use super::summary::{markdown_report, CandidateSummary};
use crate::config::ScreeningConfig;

type SharedConversation<E> = Arc<Mutex<Conversation<E>>>;

/// Registry of live sessions. Each conversation sits behind its own async mutex so
/// messages for one session are processed strictly in order. A session is dropped as
/// soon as a message leaves it `Completed` or `Exited`.
pub struct ScreeningService<E> {
    sessions: RwLock<HashMap<SessionId, SharedConversation<E>>>,
    questions: Arc<QuestionChain>,
    exporter: Arc<E>,
    settings: ScreeningConfig,
    format: ExportFormat,
}

/// Read-only projection of a session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub stage: ConversationStage,
    pub progress: u8,
    pub summary: CandidateSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<PendingQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportReceipt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingQuestion {
    pub technology: String,
    pub question: String,
}

impl<E> ScreeningService<E>
where
    E: SessionExporter + 'static,
{
    pub fn new(
        questions: Arc<QuestionChain>,
        exporter: Arc<E>,
        settings: ScreeningConfig,
        format: ExportFormat,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            questions,
            exporter,
            settings,
            format,
        }
    }

    /// Open a new session and return its greeting.
    pub fn start(&self) -> ConversationReply {
        let conversation = Conversation::new(
            Arc::clone(&self.questions),
            Arc::clone(&self.exporter),
            self.settings.clone(),
            self.format,
        );
        let greeting = conversation.greeting();
        let id = conversation.id().clone();

        self.sessions
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .insert(id.clone(), Arc::new(Mutex::new(conversation)));
        info!(
            session_id = %id,
            active = self.session_count(),
            "screening session started"
        );

        greeting
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .len()
    }

    fn session(&self, id: &SessionId) -> Result<SharedConversation<E>, ScreeningServiceError> {
        self.sessions
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| ScreeningServiceError::NotFound(id.clone()))
    }

    pub async fn send(
        &self,
        id: &SessionId,
        message: &str,
    ) -> Result<ConversationReply, ScreeningServiceError> {
        let session = self.session(id)?;
        let mut conversation = session.lock().await;
        let outcome = conversation.handle(message).await;

        if conversation.stage().is_terminal() {
            drop(conversation);
            self.evict(id);
        }

        Ok(outcome?)
    }

    /// Finished sessions leave the registry; their data lives on in the export.
    fn evict(&self, id: &SessionId) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .remove(id);
        if removed.is_some() {
            info!(
                session_id = %id,
                active = self.session_count(),
                "screening session closed"
            );
        }
    }

    pub async fn reset(&self, id: &SessionId) -> Result<ConversationReply, ScreeningServiceError> {
        let session = self.session(id)?;
        let mut conversation = session.lock().await;
        Ok(conversation.reset())
    }

    pub async fn view(&self, id: &SessionId) -> Result<SessionView, ScreeningServiceError> {
        let session = self.session(id)?;
        let conversation = session.lock().await;

        Ok(SessionView {
            session_id: conversation.id().clone(),
            stage: conversation.stage(),
            progress: conversation.stage().progress(),
            summary: conversation.summary(),
            current_question: conversation.current_question().map(|(technology, question)| {
                PendingQuestion {
                    technology: technology.to_string(),
                    question: question.to_string(),
                }
            }),
            export: conversation.export_receipt().cloned(),
        })
    }

    pub async fn report(&self, id: &SessionId) -> Result<String, ScreeningServiceError> {
        let session = self.session(id)?;
        let conversation = session.lock().await;
        Ok(markdown_report(
            conversation.id(),
            conversation.record(),
            Utc::now(),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error("screening session {0} not found")]
    NotFound(SessionId),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}
