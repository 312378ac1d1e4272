//! Test Helpers

use jiff::Timestamp;
use testresult::TestResult;

use crate::domain::products::records::{INITIAL_VERSION, ProductRecord, ProductState, ProductUuid};

/// Active product created at `created_at` (RFC 3339).
pub(crate) fn seeded_product(
    sku: &str,
    product_name: &str,
    created_at: &str,
) -> TestResult<ProductRecord> {
    let created_at: Timestamp = created_at.parse()?;

    Ok(ProductRecord {
        uuid: ProductUuid::new(),
        sku: sku.to_string(),
        product_name: product_name.to_string(),
        state: ProductState::Active {
            version: INITIAL_VERSION,
        },
        created_at,
        updated_at: created_at,
    })
}
