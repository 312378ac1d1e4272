use catalog_app::{context::AppContext, database};
use clap::{Parser, Subcommand};

use crate::cli::config::{CatalogConfig, DatabaseConfig, LoggingConfig};

pub(crate) mod config;
mod db;
mod product;

#[derive(Debug, Parser)]
#[command(name = "catalog-app", about = "Product catalog CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    catalog: CatalogConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Product(product::ProductCommand),
}

impl Cli {
    /// Parse arguments, falling back to the environment and `.env`.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let pool = database::connect(&self.database.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        match self.command {
            Commands::Db(command) => db::run(command, &pool).await,
            Commands::Product(command) => {
                let settings = self
                    .catalog
                    .settings()
                    .map_err(|error| format!("invalid catalog settings: {error}"))?;

                product::run(command, &AppContext::from_pool(pool, settings)).await
            }
        }
    }
}
