mod cli;
mod console;
mod infra;
mod routes;
mod server;

use talent_scout::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
