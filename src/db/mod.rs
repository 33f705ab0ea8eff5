pub mod catalog;
pub mod memory;
pub mod postgres;

pub use catalog::{CatalogStore, PgCatalog};
pub use memory::InMemoryCatalog;
pub use postgres::{create_pool, run_migrations};

#[cfg(test)]
pub use catalog::MockCatalogStore;
