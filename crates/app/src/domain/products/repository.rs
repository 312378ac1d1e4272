//! Products Repository

use async_trait::async_trait;
use mockall::automock;

use crate::domain::products::{
    data::{NewProduct, Page, ProductPatch},
    errors::ProductsServiceError,
    filter::ProductFilter,
    records::{ProductRecord, ProductUuid},
};

/// Persistence operations the products service relies on.
///
/// Each call is atomic on its own. Lookups report absence as `None` rather
/// than as an error, and every lookup is limited to active products.
#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// First active product matching `filter`.
    async fn find_one(
        &self,
        filter: &ProductFilter,
    ) -> Result<Option<ProductRecord>, ProductsServiceError>;

    /// Active products matching `filter`, newest first, windowed by `page`.
    async fn find_many(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Active product with the given identifier.
    async fn find_by_id(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, ProductsServiceError>;

    /// Persist a new product, assigning its identifier, timestamps and
    /// initial version.
    async fn create(&self, product: NewProduct) -> Result<ProductRecord, ProductsServiceError>;

    /// Apply `patch` and bump the version, provided the product is active and
    /// still at `expected_version`.
    async fn update_by_id(
        &self,
        product: ProductUuid,
        expected_version: u64,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>, ProductsServiceError>;

    /// Soft-delete the product, provided it is active and still at
    /// `expected_version`. Returns whether a record was deleted.
    async fn soft_delete_by_id(
        &self,
        product: ProductUuid,
        expected_version: u64,
    ) -> Result<bool, ProductsServiceError>;
}
