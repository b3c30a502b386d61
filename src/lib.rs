//! Catalog admin REST API: categories and genres with soft delete and
//! generated UUID keys.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod ident;
pub mod lifecycle;
pub mod routes;
pub mod store;
pub mod validation;

pub use config::ServerConfig;
pub use domain::{CatalogEntity, Category, Genre, Record};
pub use error::AppError;
pub use lifecycle::LifecycleController;
pub use routes::{common_routes, common_routes_with_ready, resource_routes};
pub use store::{
    ensure_catalog_tables, ensure_database_exists, EntityStore, MemoryStore, PgEntityStore, Scope,
};
pub use validation::{Gate, Rule, ValidationErrors, Violation};
