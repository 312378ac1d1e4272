//! Product Catalog CLI

use std::process;

use crate::cli::Cli;

mod cli;
mod logging;

#[tokio::main]
pub async fn main() {
    let cli = Cli::load().unwrap_or_else(|e| e.exit());

    if let Err(error) = logging::init(&cli.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
