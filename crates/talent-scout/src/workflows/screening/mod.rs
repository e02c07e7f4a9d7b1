//! Candidate screening: field collection, technical questions, and session export.

pub mod context;
pub mod conversation;
pub mod domain;
pub mod export;
pub mod language;
pub mod personalization;
pub mod questions;
pub mod router;
pub mod sentiment;
pub mod service;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod tests;

pub use context::{check_context, ContextViolation};
pub use conversation::{
    is_exit_command, is_reset_command, Conversation, ConversationError, ConversationReply,
    ConversationStage,
};
pub use domain::{CandidateRecord, FieldKind, QuestionAnswer, SessionId, TechnologyAnswers};
pub use export::{
    email_hash, read_json_export, ExportError, ExportFormat, ExportReceipt, ExportedSession,
    FileExporter, SessionExporter,
};
pub use language::Language;
pub use personalization::{CommunicationStyle, DifficultyLevel, QuestionDifficulty};
pub use questions::{
    CachedQuestionSource, OpenAiQuestionSource, QuestionChain, QuestionRequest, QuestionSource,
    QuestionsExhausted, SourceUnavailable, StaticQuestionTable,
};
pub use router::screening_router;
pub use sentiment::{annotate, Emotion, SentimentAnnotation};
pub use service::{PendingQuestion, ScreeningService, ScreeningServiceError, SessionView};
pub use summary::{markdown_report, CandidateSummary};
pub use validation::{FieldValidator, FieldValue, ValidationError};
