//! In-memory Products Repository

use std::{cmp::Reverse, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::products::{
    data::{NewProduct, Page, ProductPatch},
    errors::ProductsServiceError,
    filter::ProductFilter,
    records::{INITIAL_VERSION, ProductRecord, ProductState, ProductUuid},
    repository::ProductsRepository,
};

/// Process-local product store.
///
/// Writes take the lock exclusively, so the version check and the write of
/// `update_by_id`/`soft_delete_by_id` happen as one step. Active skus are kept
/// unique the same way the `PostgreSQL` partial index does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductsRepository {
    records: Arc<RwLock<Vec<ProductRecord>>>,
}

impl InMemoryProductsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, deleted ones included.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    /// Every stored record, including soft-deleted ones.
    pub async fn snapshot(&self) -> Vec<ProductRecord> {
        self.records.read().await.clone()
    }
}

fn sku_taken(records: &[ProductRecord], sku: &str, except: Option<ProductUuid>) -> bool {
    records.iter().any(|record| {
        record.state.is_active() && record.sku == sku && Some(record.uuid) != except
    })
}

#[async_trait]
impl ProductsRepository for InMemoryProductsRepository {
    async fn find_one(
        &self,
        filter: &ProductFilter,
    ) -> Result<Option<ProductRecord>, ProductsServiceError> {
        let records = self.records.read().await;

        Ok(records.iter().find(|record| filter.matches(record)).cloned())
    }

    async fn find_many(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let records = self.records.read().await;

        let mut matching: Vec<&ProductRecord> =
            records.iter().filter(|record| filter.matches(record)).collect();

        matching.sort_by_key(|record| Reverse((record.created_at, record.uuid)));

        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);

        let found: Vec<ProductRecord> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        debug!(found = found.len(), "listed products from memory");

        Ok(found)
    }

    async fn find_by_id(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, ProductsServiceError> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .find(|record| record.uuid == product && record.state.is_active())
            .cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<ProductRecord, ProductsServiceError> {
        let mut records = self.records.write().await;

        if sku_taken(&records, &product.sku, None) {
            return Err(ProductsServiceError::Conflict);
        }

        let now = Timestamp::now();

        let record = ProductRecord {
            uuid: ProductUuid::new(),
            sku: product.sku,
            product_name: product.product_name,
            state: ProductState::Active {
                version: INITIAL_VERSION,
            },
            created_at: now,
            updated_at: now,
        };

        records.push(record.clone());

        Ok(record)
    }

    async fn update_by_id(
        &self,
        product: ProductUuid,
        expected_version: u64,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>, ProductsServiceError> {
        let mut records = self.records.write().await;

        if let Some(sku) = &patch.sku
            && sku_taken(&records, sku, Some(product))
        {
            return Err(ProductsServiceError::Conflict);
        }

        let Some(record) = records.iter_mut().find(|record| {
            record.uuid == product
                && record.state == ProductState::Active {
                    version: expected_version,
                }
        }) else {
            return Ok(None);
        };

        let next_version = u64::try_from(u128::from(expected_version) + 1)?;

        if let Some(sku) = patch.sku {
            record.sku = sku;
        }

        if let Some(product_name) = patch.product_name {
            record.product_name = product_name;
        }

        record.state = ProductState::Active {
            version: next_version,
        };
        record.updated_at = Timestamp::now();

        Ok(Some(record.clone()))
    }

    async fn soft_delete_by_id(
        &self,
        product: ProductUuid,
        expected_version: u64,
    ) -> Result<bool, ProductsServiceError> {
        let mut records = self.records.write().await;

        let Some(record) = records.iter_mut().find(|record| {
            record.uuid == product
                && record.state == ProductState::Active {
                    version: expected_version,
                }
        }) else {
            return Ok(false);
        };

        let now = Timestamp::now();

        record.state = ProductState::Deleted {
            version: expected_version,
            deleted_at: now,
        };
        record.updated_at = now;

        Ok(true)
    }
}
