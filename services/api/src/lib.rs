mod cli;
mod dashboard;
mod infra;
mod report;
mod routes;
mod server;

use maintenance_kpi::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
