//! App Context

use std::sync::Arc;

use jiff::tz::TimeZone;
use sqlx::PgPool;
use thiserror::Error;

use crate::domain::products::{
    PgProductsService, ProductsService, repositories::PgProductsRepository,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("unknown time zone `{name}`")]
    TimeZone {
        name: String,
        #[source]
        source: jiff::Error,
    },
}

/// Tunables for the products service.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Zone whose calendar days the list date filters refer to.
    pub time_zone: TimeZone,

    /// Page size for list queries without an explicit limit.
    pub default_limit: u64,
}

impl CatalogSettings {
    /// Resolve an IANA time zone name (`UTC` always resolves).
    ///
    /// # Errors
    ///
    /// Returns an error when the name is not in the time zone database.
    pub fn new(time_zone: &str, default_limit: u64) -> Result<Self, AppInitError> {
        let time_zone = if time_zone.eq_ignore_ascii_case("UTC") {
            TimeZone::UTC
        } else {
            TimeZone::get(time_zone).map_err(|source| AppInitError::TimeZone {
                name: time_zone.to_string(),
                source,
            })?
        };

        Ok(Self {
            time_zone,
            default_limit,
        })
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
}

impl AppContext {
    /// Build application context over an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool, settings: CatalogSettings) -> Self {
        let products = PgProductsService::new(PgProductsRepository::new(pool))
            .with_time_zone(settings.time_zone)
            .with_default_limit(settings.default_limit);

        Self {
            products: Arc::new(products),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
