mod cli;
mod commands;
mod infra;
mod prompt;
mod routes;
mod server;

use kitty_alloc::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
