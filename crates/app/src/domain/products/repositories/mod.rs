//! Products Repositories

mod memory;
mod postgres;

pub use memory::InMemoryProductsRepository;
pub use postgres::PgProductsRepository;
