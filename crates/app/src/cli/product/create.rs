use catalog_app::{context::AppContext, domain::products::data::NewProduct};
use clap::Args;

use super::{ProductOutput, print_json};

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// Business key, unique among active products
    #[arg(long)]
    sku: String,

    /// Display name
    #[arg(long)]
    product_name: String,
}

pub(crate) async fn run(args: CreateProductArgs, app: &AppContext) -> Result<(), String> {
    let product = app
        .products
        .create_product(NewProduct {
            sku: args.sku,
            product_name: args.product_name,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    print_json(&ProductOutput::from(product))
}
