use catalog_app::{
    context::AppContext,
    domain::products::{data::ProductUpdate, records::ProductUuid},
};
use clap::Args;

use super::{ProductOutput, print_json};

#[derive(Debug, Args)]
pub(crate) struct UpdateProductArgs {
    /// Product UUID
    #[arg(long)]
    uuid: ProductUuid,

    /// Version last read; the update is rejected if it is stale
    #[arg(long = "version", id = "expected_version")]
    version: u64,

    /// New sku
    #[arg(long)]
    sku: Option<String>,

    /// New display name
    #[arg(long)]
    product_name: Option<String>,
}

pub(crate) async fn run(args: UpdateProductArgs, app: &AppContext) -> Result<(), String> {
    let product = app
        .products
        .update_product(
            args.uuid,
            ProductUpdate {
                version: args.version,
                sku: args.sku,
                product_name: args.product_name,
            },
        )
        .await
        .map_err(|error| format!("failed to update product: {error}"))?;

    print_json(&ProductOutput::from(product))
}
