//! The per-session screening state machine.
//!
//! A [`Conversation`] is driven one inbound message at a time. Exit and reset commands
//! are recognised before anything else, field stages validate and advance, and the
//! technical-question stage pulls questions lazily from the [`QuestionChain`] the first
//! time each technology is reached. Leaving `Summary` exports the record exactly once.
//!
//! Fixed prompts follow the session [`Language`]; profile answers pass a context check
//! before validation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::context::{check_context, ContextViolation, OFF_TOPIC_STRIKES, REFOCUS_NOTICE};
use super::domain::{CandidateRecord, FieldKind, SessionId};
use super::export::{ExportError, ExportFormat, ExportReceipt, SessionExporter};
use super::language::Language;
use super::personalization::response_prefix;
use super::questions::{QuestionChain, QuestionRequest, QuestionsExhausted};
use super::sentiment::{annotate, SentimentAnnotation};
use super::summary::CandidateSummary;
use super::validation::{FieldValidator, FieldValue, ValidationError};
use crate::config::ScreeningConfig;

const EXIT_COMMANDS: [&str; 5] = ["exit", "quit", "bye", "goodbye", "stop"];
const RESET_COMMANDS: [&str; 3] = ["reset", "restart", "start over"];
const FINAL_ORDINAL: u16 = 10;

fn normalize_command(input: &str) -> String {
    input
        .trim()
        .trim_end_matches(['.', '!'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS.contains(&normalize_command(input).as_str())
}

pub fn is_reset_command(input: &str) -> bool {
    RESET_COMMANDS.contains(&normalize_command(input).as_str())
}

/// Closed set of conversation stages.
///
/// `AskingTechQuestions` carries indices into the tech stack and into the question list
/// fetched for that technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ConversationStage {
    Greeting,
    CollectingName,
    CollectingEmail,
    CollectingPhone,
    CollectingExperience,
    CollectingPosition,
    CollectingLocation,
    CollectingTechStack,
    AskingTechQuestions { technology: usize, question: usize },
    Summary,
    Completed,
    Exited,
}

impl ConversationStage {
    pub const fn label(self) -> &'static str {
        match self {
            ConversationStage::Greeting => "greeting",
            ConversationStage::CollectingName => "collecting_name",
            ConversationStage::CollectingEmail => "collecting_email",
            ConversationStage::CollectingPhone => "collecting_phone",
            ConversationStage::CollectingExperience => "collecting_experience",
            ConversationStage::CollectingPosition => "collecting_position",
            ConversationStage::CollectingLocation => "collecting_location",
            ConversationStage::CollectingTechStack => "collecting_tech_stack",
            ConversationStage::AskingTechQuestions { .. } => "asking_tech_questions",
            ConversationStage::Summary => "summary",
            ConversationStage::Completed => "completed",
            ConversationStage::Exited => "exited",
        }
    }

    /// Record field populated by this stage, if any.
    pub const fn field(self) -> Option<FieldKind> {
        match self {
            ConversationStage::CollectingName => Some(FieldKind::FullName),
            ConversationStage::CollectingEmail => Some(FieldKind::Email),
            ConversationStage::CollectingPhone => Some(FieldKind::Phone),
            ConversationStage::CollectingExperience => Some(FieldKind::Experience),
            ConversationStage::CollectingPosition => Some(FieldKind::Position),
            ConversationStage::CollectingLocation => Some(FieldKind::Location),
            ConversationStage::CollectingTechStack => Some(FieldKind::TechStack),
            _ => None,
        }
    }

    /// Linear successor. Question iteration inside `AskingTechQuestions` is driven by
    /// the conversation; from the stage's point of view it is followed by `Summary`.
    pub const fn next(self) -> Self {
        match self {
            ConversationStage::Greeting => ConversationStage::CollectingName,
            ConversationStage::CollectingName => ConversationStage::CollectingEmail,
            ConversationStage::CollectingEmail => ConversationStage::CollectingPhone,
            ConversationStage::CollectingPhone => ConversationStage::CollectingExperience,
            ConversationStage::CollectingExperience => ConversationStage::CollectingPosition,
            ConversationStage::CollectingPosition => ConversationStage::CollectingLocation,
            ConversationStage::CollectingLocation => ConversationStage::CollectingTechStack,
            ConversationStage::CollectingTechStack => ConversationStage::AskingTechQuestions {
                technology: 0,
                question: 0,
            },
            ConversationStage::AskingTechQuestions { .. } => ConversationStage::Summary,
            ConversationStage::Summary => ConversationStage::Completed,
            ConversationStage::Completed => ConversationStage::Completed,
            ConversationStage::Exited => ConversationStage::Exited,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ConversationStage::Completed | ConversationStage::Exited)
    }

    const fn ordinal(self) -> u16 {
        match self {
            ConversationStage::Greeting => 0,
            ConversationStage::CollectingName => 1,
            ConversationStage::CollectingEmail => 2,
            ConversationStage::CollectingPhone => 3,
            ConversationStage::CollectingExperience => 4,
            ConversationStage::CollectingPosition => 5,
            ConversationStage::CollectingLocation => 6,
            ConversationStage::CollectingTechStack => 7,
            ConversationStage::AskingTechQuestions { .. } => 8,
            ConversationStage::Summary => 9,
            ConversationStage::Completed | ConversationStage::Exited => FINAL_ORDINAL,
        }
    }

    /// Percentage of the linear stage sequence already reached.
    pub const fn progress(self) -> u8 {
        (self.ordinal() * 100 / FINAL_ORDINAL) as u8
    }
}

/// Outbound turn: the text to show plus structured metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationReply {
    pub session_id: SessionId,
    pub message: String,
    pub stage: ConversationStage,
    pub progress: u8,
    pub sentiment: SentimentAnnotation,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_violation: Option<ContextViolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportReceipt>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("failed to export the completed session: {0}")]
    ExportFailed(#[from] ExportError),
    #[error("session aborted: {0}")]
    FatalConfiguration(#[from] QuestionsExhausted),
}

/// One candidate's screening session.
pub struct Conversation<E> {
    id: SessionId,
    stage: ConversationStage,
    record: CandidateRecord,
    current_questions: Vec<String>,
    receipt: Option<ExportReceipt>,
    language: Language,
    off_topic_strikes: u32,
    validator: FieldValidator,
    settings: ScreeningConfig,
    format: ExportFormat,
    questions: Arc<QuestionChain>,
    exporter: Arc<E>,
}

impl<E> Conversation<E>
where
    E: SessionExporter + 'static,
{
    pub fn new(
        questions: Arc<QuestionChain>,
        exporter: Arc<E>,
        settings: ScreeningConfig,
        format: ExportFormat,
    ) -> Self {
        let id = SessionId::generate();
        debug!(session_id = %id, "screening session created");

        Self {
            id,
            stage: ConversationStage::Greeting,
            record: CandidateRecord::default(),
            current_questions: Vec::new(),
            receipt: None,
            language: settings.language,
            off_topic_strikes: 0,
            validator: FieldValidator::new(settings.max_experience_years),
            settings,
            format,
            questions,
            exporter,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn stage(&self) -> ConversationStage {
        self.stage
    }

    pub fn record(&self) -> &CandidateRecord {
        &self.record
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn export_receipt(&self) -> Option<&ExportReceipt> {
        self.receipt.as_ref()
    }

    pub fn summary(&self) -> CandidateSummary {
        CandidateSummary::from_record(&self.id, &self.record)
    }

    /// Technology and question text awaiting an answer, while in `AskingTechQuestions`.
    pub fn current_question(&self) -> Option<(&str, &str)> {
        match self.stage {
            ConversationStage::AskingTechQuestions {
                technology,
                question,
            } => Some((
                self.record.tech_stack.get(technology)?.as_str(),
                self.current_questions.get(question)?.as_str(),
            )),
            _ => None,
        }
    }

    /// Opening message for a fresh session.
    pub fn greeting(&self) -> ConversationReply {
        self.reply(self.welcome_text(), SentimentAnnotation::neutral())
    }

    /// Discard everything gathered so far and return to `Greeting`.
    pub fn reset(&mut self) -> ConversationReply {
        info!(
            session_id = %self.id,
            from = self.stage.label(),
            "screening session reset"
        );
        self.stage = ConversationStage::Greeting;
        self.record = CandidateRecord::default();
        self.current_questions.clear();
        self.receipt = None;
        self.language = self.settings.language;
        self.off_topic_strikes = 0;

        let message = format!("Let's start over. {}", self.welcome_text());
        self.reply(message, SentimentAnnotation::neutral())
    }

    /// Feed one inbound message through the state machine.
    pub async fn handle(&mut self, input: &str) -> Result<ConversationReply, ConversationError> {
        let input = input.trim();
        let sentiment = annotate(input);
        self.detect_language(input);

        if is_exit_command(input) {
            return Ok(self.exit(sentiment));
        }
        if is_reset_command(input) {
            let mut reply = self.reset();
            reply.sentiment = sentiment;
            return Ok(reply);
        }
        if let Some(field) = self.stage.field() {
            if let Some(violation) = check_context(input, field) {
                return Ok(self.redirect(field, violation, sentiment));
            }
        }

        match self.stage {
            ConversationStage::Greeting => {
                self.stage = self.stage.next();
                let message = format!(
                    "{} {}",
                    self.language.begin(),
                    self.language.prompt(FieldKind::FullName)
                );
                Ok(self.reply(message, sentiment))
            }
            ConversationStage::CollectingName => {
                self.collect(FieldKind::FullName, input, sentiment).await
            }
            ConversationStage::CollectingEmail => {
                self.collect(FieldKind::Email, input, sentiment).await
            }
            ConversationStage::CollectingPhone => {
                self.collect(FieldKind::Phone, input, sentiment).await
            }
            ConversationStage::CollectingExperience => {
                self.collect(FieldKind::Experience, input, sentiment).await
            }
            ConversationStage::CollectingPosition => {
                self.collect(FieldKind::Position, input, sentiment).await
            }
            ConversationStage::CollectingLocation => {
                self.collect(FieldKind::Location, input, sentiment).await
            }
            ConversationStage::CollectingTechStack => {
                self.collect(FieldKind::TechStack, input, sentiment).await
            }
            ConversationStage::AskingTechQuestions {
                technology,
                question,
            } => self.answer(technology, question, input, sentiment).await,
            ConversationStage::Summary => self.complete(sentiment).await,
            ConversationStage::Completed => {
                let message = format!(
                    "Your application has already been submitted. {}",
                    self.settings.communication_style.closing()
                );
                Ok(self.reply(message, sentiment))
            }
            ConversationStage::Exited => Ok(self.reply(
                "This session has ended. Start a new session to apply again.".to_string(),
                sentiment,
            )),
        }
    }

    /// Only an English session switches, and only on input long enough to judge.
    fn detect_language(&mut self, input: &str) {
        if !self.settings.detect_language
            || self.language != Language::English
            || input.chars().count() <= 10
        {
            return;
        }
        if let Some(detected) = Language::detect(input) {
            info!(
                session_id = %self.id,
                language = detected.code(),
                "switching session language"
            );
            self.language = detected;
        }
    }

    fn redirect(
        &mut self,
        field: FieldKind,
        violation: ContextViolation,
        sentiment: SentimentAnnotation,
    ) -> ConversationReply {
        debug!(
            session_id = %self.id,
            field = field.label(),
            ?violation,
            "answer outside the application context"
        );

        let mut message = String::new();
        if violation == ContextViolation::OffTopic {
            self.off_topic_strikes += 1;
            if self.off_topic_strikes >= OFF_TOPIC_STRIKES {
                message.push_str(REFOCUS_NOTICE);
                message.push(' ');
            }
        }
        message.push_str(violation.message());
        message.push_str("\n\n");
        message.push_str(self.language.prompt(field));

        let mut reply = self.reply(message, sentiment);
        reply.context_violation = Some(violation);
        reply
    }

    fn exit(&mut self, sentiment: SentimentAnnotation) -> ConversationReply {
        info!(
            session_id = %self.id,
            from = self.stage.label(),
            "candidate left the screening session"
        );
        self.stage = ConversationStage::Exited;
        self.current_questions.clear();

        let message = format!(
            "{} {}",
            self.language.goodbye(),
            self.settings.communication_style.closing()
        );
        self.reply(message, sentiment)
    }

    async fn collect(
        &mut self,
        field: FieldKind,
        input: &str,
        sentiment: SentimentAnnotation,
    ) -> Result<ConversationReply, ConversationError> {
        let value = match self.validator.validate(field, input) {
            Ok(value) => value,
            Err(rejection) => {
                debug!(
                    session_id = %self.id,
                    field = field.label(),
                    reason = rejection.kind_label(),
                    "field rejected"
                );
                let message = format!(
                    "Sorry, your {rejection}. Please enter {}.",
                    field.expected_format()
                );
                let mut reply = self.reply(message, sentiment);
                reply.validation_error = Some(rejection);
                return Ok(reply);
            }
        };

        self.store(value);
        self.off_topic_strikes = 0;
        self.stage = self.stage.next();
        debug!(session_id = %self.id, field = field.label(), "field captured");

        let lead = match (field, self.record.full_name.as_deref()) {
            (FieldKind::FullName, Some(name)) => format!("Nice to meet you, {name}! "),
            _ => String::new(),
        };

        match self.stage.field() {
            Some(next) => {
                let message = format!("{lead}{}", self.language.prompt(next));
                Ok(self.personalized(message, sentiment))
            }
            None => self.start_questions(sentiment).await,
        }
    }

    fn store(&mut self, value: FieldValue) {
        let record = &mut self.record;
        match (self.stage, value) {
            (ConversationStage::CollectingName, FieldValue::Text(name)) => {
                record.full_name = Some(name)
            }
            (ConversationStage::CollectingEmail, FieldValue::Text(email)) => {
                record.email = Some(email)
            }
            (ConversationStage::CollectingPhone, FieldValue::Text(phone)) => {
                record.phone = Some(phone)
            }
            (ConversationStage::CollectingExperience, FieldValue::Years(years)) => {
                record.experience_years = Some(years)
            }
            (ConversationStage::CollectingPosition, FieldValue::Text(position)) => {
                record.desired_position = Some(position)
            }
            (ConversationStage::CollectingLocation, FieldValue::Text(location)) => {
                record.location = Some(location)
            }
            (ConversationStage::CollectingTechStack, FieldValue::Technologies(stack)) => {
                record.tech_stack = stack
            }
            (stage, value) => warn!(
                stage = stage.label(),
                ?value,
                "validated value does not match the stage field"
            ),
        }
    }

    async fn start_questions(
        &mut self,
        sentiment: SentimentAnnotation,
    ) -> Result<ConversationReply, ConversationError> {
        self.load_questions(0).await?;

        let message = format!(
            "{}\n\n{}",
            self.language.technical_intro(&self.record.tech_stack),
            self.question_prompt()
        );
        Ok(self.personalized(message, sentiment))
    }

    async fn answer(
        &mut self,
        technology: usize,
        question: usize,
        input: &str,
        sentiment: SentimentAnnotation,
    ) -> Result<ConversationReply, ConversationError> {
        let Some((tech, asked)) = self
            .current_question()
            .map(|(tech, asked)| (tech.to_string(), asked.to_string()))
        else {
            // Nothing left to ask for this stage position.
            self.stage = ConversationStage::Summary;
            return Ok(self.summary_reply(sentiment));
        };

        if input.is_empty() {
            let message = format!(
                "Please share an answer, even a partial one.\n\n{}",
                self.question_prompt()
            );
            return Ok(self.reply(message, sentiment));
        }

        self.record.record_answer(&tech, asked, input);

        if question + 1 < self.current_questions.len() {
            self.stage = ConversationStage::AskingTechQuestions {
                technology,
                question: question + 1,
            };
            return Ok(self.personalized(self.question_prompt(), sentiment));
        }

        if technology + 1 < self.record.tech_stack.len() {
            self.load_questions(technology + 1).await?;
            let message = format!(
                "{} {}.\n\n{}",
                self.settings.communication_style.transition(),
                self.record.tech_stack[technology + 1],
                self.question_prompt()
            );
            return Ok(self.personalized(message, sentiment));
        }

        self.stage = ConversationStage::Summary;
        self.current_questions.clear();
        Ok(self.summary_reply(sentiment))
    }

    async fn load_questions(&mut self, technology: usize) -> Result<(), ConversationError> {
        let Some(name) = self.record.tech_stack.get(technology).cloned() else {
            self.stage = ConversationStage::Summary;
            return Ok(());
        };

        let experience_years = self.record.experience_years.unwrap_or_default();
        let request = QuestionRequest {
            technology: name,
            experience_years,
            difficulty: self.settings.difficulty.resolve(experience_years),
            count: self.settings.questions_per_technology,
        };

        match self.questions.questions(&request).await {
            Ok(questions) => {
                self.current_questions = questions;
                self.stage = ConversationStage::AskingTechQuestions {
                    technology,
                    question: 0,
                };
                Ok(())
            }
            Err(exhausted) => {
                error!(
                    session_id = %self.id,
                    technology = %exhausted.technology,
                    "no question source available, aborting session"
                );
                self.stage = ConversationStage::Exited;
                self.current_questions.clear();
                Err(ConversationError::FatalConfiguration(exhausted))
            }
        }
    }

    async fn complete(
        &mut self,
        sentiment: SentimentAnnotation,
    ) -> Result<ConversationReply, ConversationError> {
        let mut snapshot = self.record.clone();
        snapshot.completed = true;

        // File writes block; keep them off the async worker that owns this session.
        let exporter = Arc::clone(&self.exporter);
        let (id, format) = (self.id.clone(), self.format);
        let exported = tokio::task::spawn_blocking(move || {
            let outcome = exporter.export(&id, &snapshot, format);
            (snapshot, outcome)
        })
        .await;

        let (snapshot, outcome) = match exported {
            Ok(pair) => pair,
            Err(join) => {
                warn!(session_id = %self.id, error = %join, "session export task failed");
                return Err(ConversationError::ExportFailed(ExportError::from(join)));
            }
        };

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "session export failed");
                return Err(ConversationError::ExportFailed(err));
            }
        };

        self.record = snapshot;
        self.stage = ConversationStage::Completed;
        self.receipt = Some(receipt.clone());

        let message = format!(
            "{} {}",
            self.language.submitted(),
            self.settings.communication_style.closing()
        );
        let mut reply = self.reply(message, sentiment);
        reply.export = Some(receipt);
        Ok(reply)
    }

    fn summary_reply(&self, sentiment: SentimentAnnotation) -> ConversationReply {
        let message = format!(
            "That's all the technical questions. Here's what I have:\n\n{}\n\n\
             Send any message to submit your application, 'reset' to start over, or 'exit' to leave without submitting.",
            self.summary().render_text()
        );
        self.personalized(message, sentiment)
    }

    fn question_prompt(&self) -> String {
        match (self.stage, self.current_question()) {
            (ConversationStage::AskingTechQuestions { question, .. }, Some((tech, text))) => {
                format!(
                    "{tech} question {} of {}: {text}",
                    question + 1,
                    self.current_questions.len()
                )
            }
            _ => String::new(),
        }
    }

    fn welcome_text(&self) -> String {
        format!(
            "{} {}",
            self.settings.communication_style.greeting(),
            self.language.welcome()
        )
    }

    fn personalized(&self, message: String, sentiment: SentimentAnnotation) -> ConversationReply {
        let message = match response_prefix(self.settings.communication_style, &sentiment) {
            Some(prefix) => format!("{prefix} {message}"),
            None => message,
        };
        self.reply(message, sentiment)
    }

    fn reply(&self, message: String, sentiment: SentimentAnnotation) -> ConversationReply {
        ConversationReply {
            session_id: self.id.clone(),
            message,
            stage: self.stage,
            progress: self.stage.progress(),
            sentiment,
            language: self.language,
            validation_error: None,
            context_violation: None,
            export: None,
        }
    }
}
