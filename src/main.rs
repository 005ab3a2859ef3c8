use account_dao::cli::Cli;
use account_dao::infrastructure::logging::init_logging;
use account_dao::AppConfig;
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    cli.run(&config).await
}
