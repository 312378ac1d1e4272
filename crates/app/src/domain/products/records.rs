//! Product Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Version assigned to a freshly created product.
pub const INITIAL_VERSION: u64 = 0;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Lifecycle of a stored product.
///
/// `Deleted` is terminal: nothing in the products service moves a record out
/// of it, and every lookup is scoped to `Active` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductState {
    /// Visible to reads and open to optimistic updates at `version`.
    Active {
        /// Optimistic concurrency token.
        version: u64,
    },

    /// Soft-deleted at `deleted_at`; `version` is the last active version.
    Deleted {
        /// Version the record held when it was deleted.
        version: u64,

        /// Soft-delete timestamp.
        deleted_at: Timestamp,
    },
}

impl ProductState {
    /// Build the state from the stored version and soft-delete marker.
    #[must_use]
    pub fn from_parts(version: u64, deleted_at: Option<Timestamp>) -> Self {
        match deleted_at {
            Some(deleted_at) => Self::Deleted {
                version,
                deleted_at,
            },
            None => Self::Active { version },
        }
    }

    /// Optimistic concurrency token, regardless of lifecycle.
    #[must_use]
    pub fn version(&self) -> u64 {
        match *self {
            Self::Active { version } | Self::Deleted { version, .. } => version,
        }
    }

    /// Whether the record is still visible to the service.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Soft-delete timestamp, if any.
    #[must_use]
    pub fn deleted_at(&self) -> Option<Timestamp> {
        match *self {
            Self::Active { .. } => None,
            Self::Deleted { deleted_at, .. } => Some(deleted_at),
        }
    }
}

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Store-assigned identifier.
    pub uuid: ProductUuid,

    /// Business key, unique among active products.
    pub sku: String,

    /// Display name.
    pub product_name: String,

    /// Lifecycle and version.
    pub state: ProductState,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last write timestamp.
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// Current optimistic concurrency token.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }
}
