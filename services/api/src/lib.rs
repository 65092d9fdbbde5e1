mod cli;
mod infra;
mod routes;
mod server;
mod sheets;

use giraffe_quality::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
