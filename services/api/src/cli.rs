use crate::console::{run_chat, run_questions, ChatArgs, QuestionsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talent_scout::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TalentScout",
    about = "Run the TalentScout candidate screening assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run an interactive screening session in the terminal
    Chat(ChatArgs),
    /// Print technical questions for one or more technologies
    Questions(QuestionsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Chat(args) => run_chat(args).await,
        Command::Questions(args) => run_questions(args).await,
    }
}
