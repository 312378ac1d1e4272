//! `PostgreSQL` Products Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, query, query_as};
use tracing::debug;

use crate::domain::products::{
    data::{NewProduct, Page, ProductPatch},
    errors::ProductsServiceError,
    filter::{FilterClause, ProductFilter},
    records::{INITIAL_VERSION, ProductRecord, ProductState, ProductUuid},
    repository::ProductsRepository,
};

const SELECT_PRODUCTS_SQL: &str = include_str!("../sql/select_products.sql");
const FIND_PRODUCT_BY_ID_SQL: &str = include_str!("../sql/find_product_by_id.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("../sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("../sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("../sql/delete_product.sql");

const ORDER_BY_NEWEST: &str = " ORDER BY created_at DESC, uuid DESC";

#[derive(Debug, Clone)]
/// PostgreSQL-backed products repository.
pub struct PgProductsRepository {
    pool: PgPool,
}

impl PgProductsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());

    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    escaped
}

/// Start a `SELECT` over active products with `filter`'s clauses appended.
fn select_filtered(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_PRODUCTS_SQL.trim_end());

    for clause in filter.clauses() {
        match clause {
            FilterClause::Sku(sku) => {
                builder.push(" AND sku = ").push_bind(sku.clone());
            }
            FilterClause::SkuIn(skus) => {
                builder
                    .push(" AND sku = ANY(")
                    .push_bind(skus.clone())
                    .push(")");
            }
            FilterClause::NameEquals(name) => {
                builder.push(" AND product_name = ").push_bind(name.clone());
            }
            FilterClause::NameContains(needle) => {
                builder
                    .push(" AND product_name ILIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)));
            }
            FilterClause::CreatedBetween(range) => {
                if let Some(from) = range.from {
                    builder
                        .push(" AND created_at >= ")
                        .push_bind(SqlxTimestamp::from(from));
                }
                if let Some(to) = range.to {
                    builder
                        .push(" AND created_at <= ")
                        .push_bind(SqlxTimestamp::from(to));
                }
            }
            FilterClause::NotUuid(uuid) => {
                builder.push(" AND uuid <> ").push_bind(uuid.into_uuid());
            }
        }
    }

    builder
}

#[async_trait]
impl ProductsRepository for PgProductsRepository {
    #[tracing::instrument(
        name = "products.repository.find_one",
        skip(self, filter),
        fields(clause_count = filter.clauses().len()),
        err
    )]
    async fn find_one(
        &self,
        filter: &ProductFilter,
    ) -> Result<Option<ProductRecord>, ProductsServiceError> {
        let mut builder = select_filtered(filter);

        builder.push(ORDER_BY_NEWEST).push(" LIMIT 1");

        let product = builder
            .build_query_as::<ProductRecord>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    #[tracing::instrument(
        name = "products.repository.find_many",
        skip(self, filter),
        fields(
            clause_count = filter.clauses().len(),
            found = tracing::field::Empty
        ),
        err
    )]
    async fn find_many(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.offset).unwrap_or(i64::MAX);

        let mut builder = select_filtered(filter);

        builder
            .push(ORDER_BY_NEWEST)
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let products = builder
            .build_query_as::<ProductRecord>()
            .fetch_all(&self.pool)
            .await?;

        tracing::Span::current().record("found", products.len());

        debug!(found = products.len(), "listed products");

        Ok(products)
    }

    #[tracing::instrument(name = "products.repository.find_by_id", skip(self), err)]
    async fn find_by_id(
        &self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, ProductsServiceError> {
        query_as::<Postgres, ProductRecord>(FIND_PRODUCT_BY_ID_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(ProductsServiceError::from)
    }

    #[tracing::instrument(
        name = "products.repository.create",
        skip(self, product),
        fields(sku = %product.sku),
        err
    )]
    async fn create(&self, product: NewProduct) -> Result<ProductRecord, ProductsServiceError> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(ProductUuid::new().into_uuid())
            .bind(product.sku)
            .bind(product.product_name)
            .bind(i64::try_from(INITIAL_VERSION)?)
            .fetch_one(&self.pool)
            .await
            .map_err(ProductsServiceError::from)
    }

    #[tracing::instrument(
        name = "products.repository.update_by_id",
        skip(self, patch),
        fields(updated = tracing::field::Empty),
        err
    )]
    async fn update_by_id(
        &self,
        product: ProductUuid,
        expected_version: u64,
        patch: ProductPatch,
    ) -> Result<Option<ProductRecord>, ProductsServiceError> {
        let updated = query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(i64::try_from(expected_version)?)
            .bind(patch.sku)
            .bind(patch.product_name)
            .fetch_optional(&self.pool)
            .await?;

        tracing::Span::current().record("updated", updated.is_some());

        Ok(updated)
    }

    #[tracing::instrument(
        name = "products.repository.soft_delete_by_id",
        skip(self),
        fields(rows_affected = tracing::field::Empty),
        err
    )]
    async fn soft_delete_by_id(
        &self,
        product: ProductUuid,
        expected_version: u64,
    ) -> Result<bool, ProductsServiceError> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(i64::try_from(expected_version)?)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::Span::current().record("rows_affected", rows_affected);

        Ok(rows_affected > 0)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let version_i64: i64 = row.try_get("version")?;

        let version = u64::try_from(version_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "version".to_string(),
            source: Box::new(e),
        })?;

        let deleted_at = row
            .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
            .map(SqlxTimestamp::to_jiff);

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            sku: row.try_get("sku")?,
            product_name: row.try_get("product_name")?,
            state: ProductState::from_parts(version, deleted_at),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
