use catalog_app::context::AppContext;
use clap::Args;

use super::{ProductOutput, print_json};

#[derive(Debug, Args)]
pub(crate) struct GetProductArgs {
    /// Sku of the product
    #[arg(long)]
    sku: String,
}

pub(crate) async fn run(args: GetProductArgs, app: &AppContext) -> Result<(), String> {
    let product = app
        .products
        .get_product_detail(&args.sku)
        .await
        .map_err(|error| format!("failed to fetch product: {error}"))?;

    print_json(&ProductOutput::from(product))
}
