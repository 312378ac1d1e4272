//! Products

pub mod data;
pub mod errors;
pub mod filter;
pub mod records;
pub mod repositories;
pub mod repository;
pub mod service;

pub use errors::{ErrorKind, ProductsServiceError};
pub use repository::{MockProductsRepository, ProductsRepository};
pub use service::*;
