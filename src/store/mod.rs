//! Storage seam for catalog records.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_catalog_tables, ensure_database_exists, PgEntity, PgEntityStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Record;
use crate::error::AppError;

/// Visibility scope for lookups: default queries exclude soft-deleted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Active,
    WithDeleted,
}

impl Scope {
    pub fn admits<T>(self, record: &Record<T>) -> bool {
        self == Scope::WithDeleted || !record.is_deleted()
    }
}

/// Row storage for one entity type. Implementations provide row-level
/// atomicity per id; conflicting writes are last-writer-wins.
#[async_trait]
pub trait EntityStore<T>: Send + Sync {
    /// Insert a fresh record. The id is assigned by the caller and unique.
    async fn insert(&self, record: Record<T>) -> Result<Record<T>, AppError>;

    /// Fetch one record by id within the given scope.
    async fn fetch(&self, id: Uuid, scope: Scope) -> Result<Option<Record<T>>, AppError>;

    /// All records within the given scope. Order is unspecified but stable
    /// within a single snapshot.
    async fn list(&self, scope: Scope) -> Result<Vec<Record<T>>, AppError>;

    /// Write a full row back, keyed by its id.
    async fn save(&self, record: &Record<T>) -> Result<(), AppError>;

    /// Liveness probe for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
