//! In-memory store: a locked row vector, insertion-ordered.
//!
//! Backs the HTTP test harness and local runs without a database. Lock scopes
//! never span an await point.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use super::{EntityStore, Scope};
use crate::domain::Record;
use crate::error::AppError;

pub struct MemoryStore<T> {
    rows: Arc<RwLock<Vec<Record<T>>>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        MemoryStore {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        MemoryStore {
            rows: Arc::clone(&self.rows),
        }
    }
}

#[async_trait]
impl<T> EntityStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn insert(&self, record: Record<T>) -> Result<Record<T>, AppError> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        rows.push(record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: Uuid, scope: Scope) -> Result<Option<Record<T>>, AppError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows
            .iter()
            .find(|r| r.id == id && scope.admits(r))
            .cloned())
    }

    async fn list(&self, scope: Scope) -> Result<Vec<Record<T>>, AppError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().filter(|r| scope.admits(r)).cloned().collect())
    }

    async fn save(&self, record: &Record<T>) -> Result<(), AppError> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        match rows.iter_mut().find(|r| r.id == record.id) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(record.id.to_string())),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
