use catalog_app::{
    context::AppContext,
    domain::products::records::{ProductRecord, ProductUuid},
};
use clap::{Args, Subcommand};
use jiff::Timestamp;
use serde::Serialize;

mod create;
mod delete;
mod get;
mod list;
mod update;

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Create a product with an unused sku
    Create(create::CreateProductArgs),
    /// Show the active product with a sku
    Get(get::GetProductArgs),
    /// List active products, newest first
    List(list::ListProductsArgs),
    /// Update a product at a known version
    Update(update::UpdateProductArgs),
    /// Soft-delete a product at a known version
    Delete(delete::DeleteProductArgs),
}

pub(crate) async fn run(command: ProductCommand, app: &AppContext) -> Result<(), String> {
    match command.command {
        ProductSubcommand::Create(args) => create::run(args, app).await,
        ProductSubcommand::Get(args) => get::run(args, app).await,
        ProductSubcommand::List(args) => list::run(args, app).await,
        ProductSubcommand::Update(args) => update::run(args, app).await,
        ProductSubcommand::Delete(args) => delete::run(args, app).await,
    }
}

#[derive(Debug, Serialize)]
struct ProductOutput {
    uuid: ProductUuid,
    sku: String,
    product_name: String,
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<ProductRecord> for ProductOutput {
    fn from(product: ProductRecord) -> Self {
        Self {
            uuid: product.uuid,
            version: product.version(),
            sku: product.sku,
            product_name: product.product_name,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{json}");

    Ok(())
}
