use catalog_app::{context::AppContext, domain::products::records::ProductUuid};
use clap::Args;

use super::print_json;

#[derive(Debug, Args)]
pub(crate) struct DeleteProductArgs {
    /// Product UUID
    #[arg(long)]
    uuid: ProductUuid,

    /// Version last read; the delete is rejected if it is stale
    #[arg(long = "version", id = "expected_version")]
    version: u64,
}

pub(crate) async fn run(args: DeleteProductArgs, app: &AppContext) -> Result<(), String> {
    let deleted = app
        .products
        .delete_product(args.uuid, args.version)
        .await
        .map_err(|error| format!("failed to delete product: {error}"))?;

    print_json(&serde_json::json!({ "deleted": deleted }))
}
