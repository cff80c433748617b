mod audit;
mod cli;
mod provision;

use compliance_bundler::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
