//! Products Data

/// Default page size when a list query leaves `limit` unset.
pub const DEFAULT_LIMIT: u64 = 10;

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub sku: String,
    pub product_name: String,
}

/// Product Update Data
///
/// `version` is the version the caller last read; unset fields keep their
/// stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub version: u64,
    pub sku: Option<String>,
    pub product_name: Option<String>,
}

/// Fields written by a successful update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub product_name: Option<String>,
}

impl From<ProductUpdate> for ProductPatch {
    fn from(update: ProductUpdate) -> Self {
        Self {
            sku: update.sku,
            product_name: update.product_name,
        }
    }
}

/// Raw list parameters as received from a caller.
///
/// `skus` is a single-quoted array literal such as `['A1','A2']`, dates are
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListQuery {
    pub skus: Option<String>,
    pub product_name: Option<String>,
    pub search_true: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// Window for a 1-based `page` of `limit` records.
    ///
    /// Returns `None` when either value is zero or the offset overflows.
    pub fn new(page: u64, limit: u64) -> Option<Self> {
        if page == 0 || limit == 0 {
            return None;
        }

        let offset = (page - 1).checked_mul(limit)?;

        Some(Self { offset, limit })
    }
}
