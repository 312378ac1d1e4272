use catalog_app::{context::AppContext, domain::products::data::ProductListQuery};
use clap::Args;

use super::{ProductOutput, print_json};

#[derive(Debug, Args)]
pub(crate) struct ListProductsArgs {
    /// Sku whitelist as a single-quoted array, e.g. "['A1','A2']"
    #[arg(long)]
    skus: Option<String>,

    /// Product name to search for
    #[arg(long)]
    product_name: Option<String>,

    /// Match the product name exactly instead of as a substring
    #[arg(long)]
    search_true: Option<bool>,

    /// 1-based page number
    #[arg(long)]
    page: Option<u64>,

    /// Page size
    #[arg(long)]
    limit: Option<u64>,

    /// First creation day to include (YYYY-MM-DD)
    #[arg(long)]
    from_date: Option<String>,

    /// Last creation day to include (YYYY-MM-DD)
    #[arg(long)]
    to_date: Option<String>,
}

impl From<ListProductsArgs> for ProductListQuery {
    fn from(args: ListProductsArgs) -> Self {
        Self {
            skus: args.skus,
            product_name: args.product_name,
            search_true: args.search_true,
            page: args.page,
            limit: args.limit,
            from_date: args.from_date,
            to_date: args.to_date,
        }
    }
}

pub(crate) async fn run(args: ListProductsArgs, app: &AppContext) -> Result<(), String> {
    let products = app
        .products
        .get_list_products(args.into())
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    let products: Vec<ProductOutput> = products.into_iter().map(Into::into).collect();

    print_json(&products)
}
