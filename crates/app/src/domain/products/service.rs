//! Products service.

use async_trait::async_trait;
use jiff::tz::TimeZone;
use mockall::automock;
use tracing::{debug, info};

use crate::domain::products::{
    data::{DEFAULT_LIMIT, NewProduct, Page, ProductListQuery, ProductPatch, ProductUpdate},
    errors::ProductsServiceError,
    filter::{CreatedRange, ProductFilter, parse_skus},
    records::{ProductRecord, ProductUuid},
    repositories::PgProductsRepository,
    repository::ProductsRepository,
};

/// Products service backed by `PostgreSQL`.
pub type PgProductsService = RepositoryProductsService<PgProductsRepository>;

/// Products service enforcing sku uniqueness, soft deletion and optimistic
/// versioning on top of any [`ProductsRepository`].
#[derive(Debug, Clone)]
pub struct RepositoryProductsService<R> {
    repository: R,
    time_zone: TimeZone,
    default_limit: u64,
}

impl<R: ProductsRepository> RepositoryProductsService<R> {
    #[must_use]
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            time_zone: TimeZone::UTC,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Time zone used to expand list date filters to day boundaries.
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Page size used when a list query leaves `limit` unset.
    #[must_use]
    pub fn with_default_limit(mut self, default_limit: u64) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Explain why a compare-and-swap matched nothing after the pre-check
    /// passed: the product was deleted or someone else bumped its version.
    async fn lost_race(&self, product: ProductUuid, expected: u64) -> ProductsServiceError {
        match self.repository.find_by_id(product).await {
            Ok(Some(current)) => {
                info!(
                    expected,
                    actual = current.version(),
                    "lost optimistic concurrency race"
                );

                ProductsServiceError::VersionMismatch {
                    expected,
                    actual: current.version(),
                }
            }
            Ok(None) => ProductsServiceError::NotFound,
            Err(error) => error,
        }
    }

    fn build_filter(&self, query: &ProductListQuery) -> Result<ProductFilter, ProductsServiceError> {
        let mut filter = ProductFilter::active();

        if let Some(skus) = present(query.skus.as_deref()) {
            filter = filter.with_skus(parse_skus(skus)?);
        }

        if let Some(name) = present(query.product_name.as_deref()) {
            filter = filter.with_name(name, query.search_true.unwrap_or(false));
        }

        if let Some(range) = CreatedRange::from_dates(
            present(query.from_date.as_deref()),
            present(query.to_date.as_deref()),
            &self.time_zone,
        )? {
            filter = filter.with_created_between(range);
        }

        Ok(filter)
    }
}

/// Treat blank strings as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn require_sku(sku: &str) -> Result<&str, ProductsServiceError> {
    if sku.trim().is_empty() {
        return Err(ProductsServiceError::EmptySku);
    }

    Ok(sku)
}

fn check_version(expected: u64, stored: &ProductRecord) -> Result<(), ProductsServiceError> {
    if expected == stored.version() {
        return Ok(());
    }

    info!(
        expected,
        actual = stored.version(),
        "rejected write with stale version"
    );

    Err(ProductsServiceError::VersionMismatch {
        expected,
        actual: stored.version(),
    })
}

#[async_trait]
impl<R: ProductsRepository> ProductsService for RepositoryProductsService<R> {
    #[tracing::instrument(
        name = "products.service.create_product",
        skip(self, product),
        fields(sku = %product.sku)
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let sku = require_sku(&product.sku)?.to_string();

        let existing = self
            .repository
            .find_one(&ProductFilter::active().with_sku(sku.as_str()))
            .await?;

        if existing.is_some() {
            debug!("sku already held by an active product");

            return Err(ProductsServiceError::AlreadyExists(sku));
        }

        match self.repository.create(product).await {
            Ok(created) => {
                info!(uuid = %created.uuid, "created product");

                Ok(created)
            }
            Err(ProductsServiceError::Conflict) => Err(ProductsServiceError::AlreadyExists(sku)),
            Err(error) => Err(error),
        }
    }

    #[tracing::instrument(name = "products.service.get_product_detail", skip(self))]
    async fn get_product_detail(&self, sku: &str) -> Result<ProductRecord, ProductsServiceError> {
        let sku = require_sku(sku)?;

        self.repository
            .find_one(&ProductFilter::active().with_sku(sku))
            .await?
            .ok_or(ProductsServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "products.service.get_list_products",
        skip(self, query),
        fields(page = query.page, limit = query.limit)
    )]
    async fn get_list_products(
        &self,
        query: ProductListQuery,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let page = Page::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(self.default_limit),
        )
        .ok_or(ProductsServiceError::InvalidPagination)?;

        let filter = self.build_filter(&query)?;

        self.repository.find_many(&filter, page).await
    }

    #[tracing::instrument(
        name = "products.service.update_product",
        skip(self, update),
        fields(version = update.version)
    )]
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if let Some(sku) = update.sku.as_deref() {
            require_sku(sku)?;
        }

        let current = self
            .repository
            .find_by_id(product)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        check_version(update.version, &current)?;

        let new_sku = update.sku.clone().filter(|sku| *sku != current.sku);

        if let Some(sku) = new_sku.as_deref() {
            let taken = self
                .repository
                .find_one(&ProductFilter::active().with_sku(sku).excluding(product))
                .await?;

            if taken.is_some() {
                debug!(sku, "sku already held by another active product");

                return Err(ProductsServiceError::AlreadyExists(sku.to_string()));
            }
        }

        let expected = update.version;

        match self
            .repository
            .update_by_id(product, expected, ProductPatch::from(update))
            .await
        {
            Ok(Some(updated)) => {
                info!(version = updated.version(), "updated product");

                Ok(updated)
            }
            Ok(None) => Err(self.lost_race(product, expected).await),
            Err(ProductsServiceError::Conflict) => Err(ProductsServiceError::AlreadyExists(
                new_sku.unwrap_or(current.sku),
            )),
            Err(error) => Err(error),
        }
    }

    #[tracing::instrument(name = "products.service.delete_product", skip(self))]
    async fn delete_product(
        &self,
        product: ProductUuid,
        version: u64,
    ) -> Result<bool, ProductsServiceError> {
        let current = self
            .repository
            .find_by_id(product)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        check_version(version, &current)?;

        if self.repository.soft_delete_by_id(product, version).await? {
            info!("soft-deleted product");

            return Ok(true);
        }

        Err(self.lost_race(product, version).await)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Creates a product whose sku is not held by any active product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Retrieves the active product with the given sku.
    async fn get_product_detail(&self, sku: &str) -> Result<ProductRecord, ProductsServiceError>;

    /// Retrieves a page of active products matching the query, newest first.
    async fn get_list_products(
        &self,
        query: ProductListQuery,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Applies an update when `update.version` matches the stored version.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-deletes a product when `version` matches the stored version.
    async fn delete_product(
        &self,
        product: ProductUuid,
        version: u64,
    ) -> Result<bool, ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        domain::products::{
            ErrorKind,
            records::{INITIAL_VERSION, ProductState},
            repository::MockProductsRepository,
        },
        test::{TestContext, helpers::seeded_product},
    };

    use super::*;

    fn new_product(sku: &str, product_name: &str) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            product_name: product_name.to_string(),
        }
    }

    fn skus(products: &[ProductRecord]) -> Vec<&str> {
        products.iter().map(|product| product.sku.as_str()).collect()
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        let fetched = ctx.products.get_product_detail("A1").await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.sku, "A1");
        assert_eq!(fetched.product_name, "Anvil");
        assert_eq!(fetched.state, ProductState::Active {
            version: INITIAL_VERSION
        });

        Ok(())
    }

    #[tokio::test]
    async fn create_duplicate_active_sku_returns_already_exists() -> TestResult {
        let ctx = TestContext::new();

        ctx.products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        let result = ctx
            .products
            .create_product(new_product("A1", "Another Anvil"))
            .await;

        assert!(
            matches!(&result, Err(ProductsServiceError::AlreadyExists(sku)) if sku == "A1"),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_reuses_sku_of_deleted_product() -> TestResult {
        let ctx = TestContext::new();

        let first = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        ctx.products
            .delete_product(first.uuid, first.version())
            .await?;

        let second = ctx
            .products
            .create_product(new_product("A1", "Anvil Mk II"))
            .await?;

        assert_ne!(second.uuid, first.uuid);
        assert_eq!(
            ctx.products.get_product_detail("A1").await?.product_name,
            "Anvil Mk II"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_blank_sku_is_rejected() {
        let ctx = TestContext::new();

        let result = ctx.products.create_product(new_product("  ", "Blank")).await;

        assert!(
            matches!(result, Err(ProductsServiceError::EmptySku)),
            "expected EmptySku, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_unknown_sku_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx.products.get_product_detail("missing").await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_deleted_sku_returns_not_found() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        ctx.products
            .delete_product(created.uuid, created.version())
            .await?;

        let result = ctx.products.get_product_detail("A1").await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_with_skus_returns_only_listed_skus() -> TestResult {
        let ctx = TestContext::with_records([
            seeded_product("X", "Shoe X", "2024-01-01T10:00:00Z")?,
            seeded_product("Y", "Shoe Y", "2024-01-02T10:00:00Z")?,
            seeded_product("Z", "Shoe Z", "2024-01-03T10:00:00Z")?,
        ]);

        let products = ctx
            .products
            .get_list_products(ProductListQuery {
                skus: Some("['X','Y']".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&products), vec!["Y", "X"]);

        let narrowed = ctx
            .products
            .get_list_products(ProductListQuery {
                skus: Some("['X','Y']".to_string()),
                product_name: Some("shoe y".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&narrowed), vec!["Y"]);

        Ok(())
    }

    #[tokio::test]
    async fn list_with_empty_sku_array_is_unrestricted() -> TestResult {
        let ctx = TestContext::with_records([
            seeded_product("X", "Shoe X", "2024-01-01T10:00:00Z")?,
            seeded_product("Y", "Shoe Y", "2024-01-02T10:00:00Z")?,
        ]);

        let products = ctx
            .products
            .get_list_products(ProductListQuery {
                skus: Some("[]".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(products.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn list_with_malformed_skus_is_a_validation_error() {
        let ctx = TestContext::new();

        let result = ctx
            .products
            .get_list_products(ProductListQuery {
                skus: Some("['X',".to_string()),
                ..ProductListQuery::default()
            })
            .await;

        assert!(
            matches!(
                &result,
                Err(error @ ProductsServiceError::InvalidSkusFilter { .. })
                    if error.kind() == ErrorKind::Validation
            ),
            "expected InvalidSkusFilter, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_name_search_exact_or_substring() -> TestResult {
        let ctx = TestContext::with_records([
            seeded_product("S1", "Shoe", "2024-01-01T10:00:00Z")?,
            seeded_product("S2", "Running Shoe", "2024-01-02T10:00:00Z")?,
            seeded_product("B1", "Boot", "2024-01-03T10:00:00Z")?,
        ]);

        let exact = ctx
            .products
            .get_list_products(ProductListQuery {
                product_name: Some("Shoe".to_string()),
                search_true: Some(true),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&exact), vec!["S1"]);

        let fuzzy = ctx
            .products
            .get_list_products(ProductListQuery {
                product_name: Some("shoe".to_string()),
                search_true: Some(false),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&fuzzy), vec!["S2", "S1"]);

        let unset = ctx
            .products
            .get_list_products(ProductListQuery {
                product_name: Some("SHOE".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&unset), vec!["S2", "S1"]);

        Ok(())
    }

    #[tokio::test]
    async fn list_second_page_skips_first_limit() -> TestResult {
        let records = (0..25)
            .map(|day| {
                seeded_product(
                    &format!("P{day:02}"),
                    "Widget",
                    &format!("2024-01-{:02}T08:00:00Z", day + 1),
                )
            })
            .collect::<TestResult<Vec<_>>>()?;

        let ctx = TestContext::with_records(records);

        let page = ctx
            .products
            .get_list_products(ProductListQuery {
                page: Some(2),
                limit: Some(10),
                ..ProductListQuery::default()
            })
            .await?;

        let expected: Vec<String> = (5..15).rev().map(|day| format!("P{day:02}")).collect();

        assert_eq!(skus(&page), expected);

        let last = ctx
            .products
            .get_list_products(ProductListQuery {
                page: Some(3),
                limit: Some(10),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(last.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn list_defaults_to_ten_per_page() -> TestResult {
        let records = (0..12)
            .map(|hour| {
                seeded_product(
                    &format!("P{hour:02}"),
                    "Widget",
                    &format!("2024-01-01T{hour:02}:00:00Z"),
                )
            })
            .collect::<TestResult<Vec<_>>>()?;

        let ctx = TestContext::with_records(records);

        let products = ctx
            .products
            .get_list_products(ProductListQuery::default())
            .await?;

        assert_eq!(products.len(), 10);
        assert_eq!(products.first().map(|p| p.sku.as_str()), Some("P11"));

        Ok(())
    }

    #[tokio::test]
    async fn list_zero_page_is_rejected() {
        let ctx = TestContext::new();

        let result = ctx
            .products
            .get_list_products(ProductListQuery {
                page: Some(0),
                ..ProductListQuery::default()
            })
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidPagination)),
            "expected InvalidPagination, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_same_day_range_returns_that_day_only() -> TestResult {
        let ctx = TestContext::with_records([
            seeded_product("EVE", "Widget", "2023-12-31T23:59:59.999Z")?,
            seeded_product("DAWN", "Widget", "2024-01-01T00:00:00Z")?,
            seeded_product("DUSK", "Widget", "2024-01-01T23:59:59.999Z")?,
            seeded_product("NEXT", "Widget", "2024-01-02T00:00:00Z")?,
        ]);

        let products = ctx
            .products
            .get_list_products(ProductListQuery {
                from_date: Some("2024-01-01".to_string()),
                to_date: Some("2024-01-01".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&products), vec!["DUSK", "DAWN"]);

        Ok(())
    }

    #[tokio::test]
    async fn list_with_only_from_date_is_open_ended() -> TestResult {
        let ctx = TestContext::with_records([
            seeded_product("OLD", "Widget", "2023-06-01T00:00:00Z")?,
            seeded_product("NEW", "Widget", "2024-06-01T00:00:00Z")?,
        ]);

        let products = ctx
            .products
            .get_list_products(ProductListQuery {
                from_date: Some("2024-01-01".to_string()),
                to_date: Some(String::new()),
                ..ProductListQuery::default()
            })
            .await?;

        assert_eq!(skus(&products), vec!["NEW"]);

        Ok(())
    }

    #[tokio::test]
    async fn list_with_no_matches_is_empty() -> TestResult {
        let ctx = TestContext::new();

        let products = ctx
            .products
            .get_list_products(ProductListQuery {
                product_name: Some("nothing".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert!(products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn list_excludes_deleted_products() -> TestResult {
        let ctx = TestContext::new();

        let kept = ctx
            .products
            .create_product(new_product("KEEP", "Widget"))
            .await?;
        let gone = ctx
            .products
            .create_product(new_product("GONE", "Widget"))
            .await?;

        ctx.products
            .delete_product(gone.uuid, gone.version())
            .await?;

        let products = ctx
            .products
            .get_list_products(ProductListQuery::default())
            .await?;

        assert_eq!(products, vec![kept]);

        Ok(())
    }

    #[tokio::test]
    async fn update_with_current_version_merges_and_bumps_version() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        let updated = ctx
            .products
            .update_product(
                created.uuid,
                ProductUpdate {
                    version: created.version(),
                    sku: None,
                    product_name: Some("Heavy Anvil".to_string()),
                },
            )
            .await?;

        assert_eq!(updated.uuid, created.uuid);
        assert_eq!(updated.sku, "A1");
        assert_eq!(updated.product_name, "Heavy Anvil");
        assert_eq!(updated.version(), created.version() + 1);
        assert_eq!(updated.created_at, created.created_at);

        let fetched = ctx.products.get_product_detail("A1").await?;

        assert_eq!(fetched, updated);

        Ok(())
    }

    #[tokio::test]
    async fn update_with_stale_version_fails_without_writing() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        ctx.products
            .update_product(
                created.uuid,
                ProductUpdate {
                    version: created.version(),
                    sku: None,
                    product_name: Some("Second".to_string()),
                },
            )
            .await?;

        let before = ctx.repository.snapshot().await;

        let result = ctx
            .products
            .update_product(
                created.uuid,
                ProductUpdate {
                    version: created.version(),
                    sku: None,
                    product_name: Some("Stale".to_string()),
                },
            )
            .await;

        assert!(
            matches!(
                &result,
                Err(error @ ProductsServiceError::VersionMismatch { expected: 0, actual: 1 })
                    if error.kind() == ErrorKind::Validation
            ),
            "expected VersionMismatch, got {result:?}"
        );
        assert_eq!(ctx.repository.snapshot().await, before);

        Ok(())
    }

    #[tokio::test]
    async fn update_to_taken_sku_returns_already_exists() -> TestResult {
        let ctx = TestContext::new();

        ctx.products
            .create_product(new_product("A1", "Anvil"))
            .await?;
        let other = ctx
            .products
            .create_product(new_product("B1", "Bucket"))
            .await?;

        let result = ctx
            .products
            .update_product(
                other.uuid,
                ProductUpdate {
                    version: other.version(),
                    sku: Some("A1".to_string()),
                    product_name: None,
                },
            )
            .await;

        assert!(
            matches!(&result, Err(ProductsServiceError::AlreadyExists(sku)) if sku == "A1"),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_product_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx
            .products
            .update_product(
                ProductUuid::new(),
                ProductUpdate {
                    version: 0,
                    sku: None,
                    product_name: Some("Ghost".to_string()),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_soft_deletes_and_keeps_version() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        let deleted = ctx
            .products
            .delete_product(created.uuid, created.version())
            .await?;

        assert!(deleted);

        let stored = ctx.repository.snapshot().await;
        let record = stored.first().ok_or("record should still be stored")?;

        assert!(matches!(
            record.state,
            ProductState::Deleted { version, .. } if version == created.version()
        ));

        let update = ctx
            .products
            .update_product(
                created.uuid,
                ProductUpdate {
                    version: created.version(),
                    sku: None,
                    product_name: Some("Revived".to_string()),
                },
            )
            .await;

        assert!(
            matches!(update, Err(ProductsServiceError::NotFound)),
            "expected NotFound on update after delete, got {update:?}"
        );

        let again = ctx
            .products
            .delete_product(created.uuid, created.version())
            .await;

        assert!(
            matches!(again, Err(ProductsServiceError::NotFound)),
            "expected NotFound on second delete, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_with_stale_version_is_rejected() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx
            .products
            .create_product(new_product("A1", "Anvil"))
            .await?;

        let result = ctx
            .products
            .delete_product(created.uuid, created.version() + 3)
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::VersionMismatch { .. })),
            "expected VersionMismatch, got {result:?}"
        );
        assert!(ctx.products.get_product_detail("A1").await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn stale_version_never_reaches_the_write() -> TestResult {
        let stored = seeded_product("A1", "Anvil", "2024-01-01T00:00:00Z")?;
        let uuid = stored.uuid;

        let mut repository = MockProductsRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| {
                Ok(Some(ProductRecord {
                    state: ProductState::Active { version: 4 },
                    ..stored.clone()
                }))
            });
        repository.expect_update_by_id().never();
        repository.expect_soft_delete_by_id().never();

        let service = RepositoryProductsService::new(repository);

        let result = service
            .update_product(
                uuid,
                ProductUpdate {
                    version: 3,
                    sku: None,
                    product_name: None,
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(ProductsServiceError::VersionMismatch {
                    expected: 3,
                    actual: 4
                })
            ),
            "expected VersionMismatch, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn lost_update_race_reports_version_mismatch() -> TestResult {
        let stored = seeded_product("A1", "Anvil", "2024-01-01T00:00:00Z")?;
        let uuid = stored.uuid;

        let mut repository = MockProductsRepository::new();
        let mut reads = 0;

        repository.expect_find_by_id().times(2).returning(move |_| {
            reads += 1;

            let version = if reads == 1 { 0 } else { 1 };

            Ok(Some(ProductRecord {
                state: ProductState::Active { version },
                ..stored.clone()
            }))
        });
        repository
            .expect_update_by_id()
            .withf(|_, expected, _| *expected == 0)
            .times(1)
            .returning(|_, _, _| Ok(None));

        let service = RepositoryProductsService::new(repository);

        let result = service
            .update_product(
                uuid,
                ProductUpdate {
                    version: 0,
                    sku: None,
                    product_name: Some("Racing".to_string()),
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(ProductsServiceError::VersionMismatch {
                    expected: 0,
                    actual: 1
                })
            ),
            "expected VersionMismatch, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_racing_another_delete_reports_not_found() -> TestResult {
        let stored = seeded_product("A1", "Anvil", "2024-01-01T00:00:00Z")?;
        let uuid = stored.uuid;

        let mut repository = MockProductsRepository::new();
        let mut reads = 0;

        repository.expect_find_by_id().times(2).returning(move |_| {
            reads += 1;

            Ok((reads == 1).then(|| stored.clone()))
        });
        repository
            .expect_soft_delete_by_id()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = RepositoryProductsService::new(repository);

        let result = service.delete_product(uuid, 0).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_create_conflict_maps_to_already_exists() {
        let mut repository = MockProductsRepository::new();

        repository.expect_find_one().times(1).returning(|_| Ok(None));
        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(ProductsServiceError::Conflict));

        let service = RepositoryProductsService::new(repository);

        let result = service.create_product(new_product("A1", "Anvil")).await;

        assert!(
            matches!(&result, Err(ProductsServiceError::AlreadyExists(sku)) if sku == "A1"),
            "expected AlreadyExists, got {result:?}"
        );
    }

    #[tokio::test]
    async fn date_bounds_use_configured_time_zone() -> TestResult {
        let mut repository = MockProductsRepository::new();
        let expected_from: Timestamp = "2023-12-31T22:00:00Z".parse()?;

        repository
            .expect_find_many()
            .withf(move |filter, page| {
                page.offset == 0
                    && page.limit == 25
                    && filter.clauses().iter().any(|clause| {
                        matches!(
                            clause,
                            crate::domain::products::filter::FilterClause::CreatedBetween(range)
                                if range.from == Some(expected_from) && range.to.is_none()
                        )
                    })
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = RepositoryProductsService::new(repository)
            .with_time_zone(TimeZone::fixed(jiff::tz::offset(2)))
            .with_default_limit(25);

        let products = service
            .get_list_products(ProductListQuery {
                from_date: Some("2024-01-01".to_string()),
                ..ProductListQuery::default()
            })
            .await?;

        assert!(products.is_empty());

        Ok(())
    }
}
