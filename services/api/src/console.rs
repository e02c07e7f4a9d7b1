use crate::infra::{exporter, question_chain};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use talent_scout::config::AppConfig;
use talent_scout::error::AppError;
use talent_scout::telemetry;
use talent_scout::workflows::screening::{
    markdown_report, CommunicationStyle, Conversation, ConversationError, ConversationReply,
    ConversationStage, ExportFormat, Language, QuestionDifficulty, QuestionRequest,
    SessionExporter,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct ChatArgs {
    /// Tone of the assistant (casual, professional, formal)
    #[arg(long, value_parser = crate::infra::parse_style)]
    pub(crate) style: Option<CommunicationStyle>,
    /// Question difficulty (easy, medium, hard, adaptive)
    #[arg(long, value_parser = crate::infra::parse_difficulty)]
    pub(crate) difficulty: Option<QuestionDifficulty>,
    /// Language the assistant starts in (en, es, fr, de)
    #[arg(long, value_parser = crate::infra::parse_language)]
    pub(crate) language: Option<Language>,
    /// Export format for the completed session (json, csv)
    #[arg(long, value_parser = crate::infra::parse_format)]
    pub(crate) format: Option<ExportFormat>,
    /// Directory that receives the exported session
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
    /// Use the built-in question table only
    #[arg(long)]
    pub(crate) offline: bool,
    /// Print the Markdown report once the session ends
    #[arg(long)]
    pub(crate) report: bool,
}

impl ChatArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(style) = self.style {
            config.screening.communication_style = style;
        }
        if let Some(difficulty) = self.difficulty {
            config.screening.difficulty = difficulty;
        }
        if let Some(language) = self.language {
            config.screening.language = language;
        }
        if let Some(format) = self.format {
            config.export.format = format;
        }
        if let Some(directory) = &self.export_dir {
            config.export.directory = directory.clone();
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct QuestionsArgs {
    /// Technologies to generate questions for
    #[arg(required = true)]
    pub(crate) technologies: Vec<String>,
    /// Candidate experience used to pick the difficulty
    #[arg(long, default_value_t = 3)]
    pub(crate) years: u32,
    /// Number of questions per technology (defaults to the configured count)
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Question difficulty (easy, medium, hard, adaptive)
    #[arg(long, value_parser = crate::infra::parse_difficulty)]
    pub(crate) difficulty: Option<QuestionDifficulty>,
    /// Use the built-in question table only
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run_chat(args: ChatArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.apply(&mut config);
    telemetry::init(&config.telemetry)?;

    let mut conversation = Conversation::new(
        question_chain(&config.questions, args.offline),
        exporter(&config),
        config.screening.clone(),
        config.export.format,
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_session(&mut conversation, stdin, &mut stdout, args.report).await
}

/// Drives one conversation from line-oriented input until it reaches a terminal stage
/// or the input closes.
pub(crate) async fn run_session<E, R, W>(
    conversation: &mut Conversation<E>,
    input: R,
    output: &mut W,
    show_report: bool,
) -> Result<(), AppError>
where
    E: SessionExporter + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_reply(output, &conversation.greeting()).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match conversation.handle(&line).await {
            Ok(reply) => {
                write_reply(output, &reply).await?;
                if reply.stage.is_terminal() {
                    break;
                }
            }
            Err(ConversationError::ExportFailed(err)) => {
                warn!(error = %err, "session export failed");
                output
                    .write_all(
                        b"We could not save your profile just now. Send any message to try again.\n",
                    )
                    .await?;
                output.flush().await?;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if show_report && conversation.stage() == ConversationStage::Completed {
        let report = markdown_report(conversation.id(), conversation.record(), Utc::now());
        output.write_all(b"\n").await?;
        output.write_all(report.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

async fn write_reply<W>(output: &mut W, reply: &ConversationReply) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(format_reply(reply).as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

fn format_reply(reply: &ConversationReply) -> String {
    let mut text = format!("[{:>3}%] {}\n", reply.progress, reply.message);
    if let Some(receipt) = &reply.export {
        text.push_str(&format!("        saved to {}\n", receipt.path.display()));
    }
    text
}

pub(crate) async fn run_questions(args: QuestionsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let chain = question_chain(&config.questions, args.offline);
    let difficulty = args
        .difficulty
        .unwrap_or(config.screening.difficulty)
        .resolve(args.years);
    let count = args
        .count
        .unwrap_or(config.screening.questions_per_technology)
        .max(1);

    for technology in &args.technologies {
        let request = QuestionRequest {
            technology: technology.trim().to_string(),
            experience_years: args.years,
            difficulty,
            count,
        };
        let questions = chain
            .questions(&request)
            .await
            .map_err(ConversationError::from)?;

        println!("{} ({} difficulty)", request.technology, difficulty.label());
        for (index, question) in questions.iter().enumerate() {
            println!("  {}. {}", index + 1, question);
        }
    }

    Ok(())
}
