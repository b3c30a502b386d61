//! Lifecycle control for catalog records: validation, defaults, identifier
//! assignment, and the active/soft-deleted state machine.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CatalogEntity, Record};
use crate::error::AppError;
use crate::ident;
use crate::store::{EntityStore, Scope};
use crate::validation::Gate;

/// Drives one entity type through its lifecycle. Validation happens before
/// any mutation; a rejected payload leaves storage untouched.
pub struct LifecycleController<T: CatalogEntity> {
    gate: Gate,
    store: Arc<dyn EntityStore<T>>,
}

impl<T: CatalogEntity> Clone for LifecycleController<T> {
    fn clone(&self) -> Self {
        LifecycleController {
            gate: self.gate,
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: CatalogEntity> LifecycleController<T> {
    pub fn new(store: Arc<dyn EntityStore<T>>) -> Self {
        LifecycleController {
            gate: Gate::new(T::rules()),
            store,
        }
    }

    /// Validate, apply defaults, assign a fresh identifier, and persist.
    /// `created_at` and `updated_at` start equal; the row starts active.
    pub async fn create(&self, attrs: &Map<String, Value>) -> Result<Record<T>, AppError> {
        self.gate.check(attrs)?;
        let now = Utc::now();
        let record = Record {
            id: ident::generate(),
            attrs: T::from_attrs(attrs),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tracing::debug!(resource = T::RESOURCE, id = %record.id, "create");
        self.store.insert(record).await
    }

    /// Overwrite exactly the submitted fields and touch `updated_at`; the id
    /// and `created_at` never change. Soft-deleted rows stay reachable by id
    /// and remain editable.
    pub async fn update(&self, id: Uuid, attrs: &Map<String, Value>) -> Result<Record<T>, AppError> {
        let mut record = self
            .store
            .fetch(id, Scope::WithDeleted)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        self.gate.check(attrs)?;
        record.attrs.merge_attrs(attrs);
        record.updated_at = Utc::now();
        tracing::debug!(resource = T::RESOURCE, id = %id, "update");
        self.store.save(&record).await?;
        Ok(record)
    }

    /// Soft-delete an active row: set `deleted_at`, hiding it from default
    /// lookups. The row stays in storage and is restorable.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut record = self
            .store
            .fetch(id, Scope::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        let now = Utc::now();
        record.deleted_at = Some(now);
        record.updated_at = now;
        tracing::debug!(resource = T::RESOURCE, id = %id, "soft delete");
        self.store.save(&record).await
    }

    /// Clear the soft-delete marker. Resolves the row through the
    /// include-deleted scope; restoring an active row is a no-op that still
    /// touches `updated_at`.
    pub async fn restore(&self, id: Uuid) -> Result<Record<T>, AppError> {
        let mut record = self
            .store
            .fetch(id, Scope::WithDeleted)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        record.deleted_at = None;
        record.updated_at = Utc::now();
        tracing::debug!(resource = T::RESOURCE, id = %id, "restore");
        self.store.save(&record).await?;
        Ok(record)
    }

    pub async fn find(&self, id: Uuid, scope: Scope) -> Result<Record<T>, AppError> {
        self.store
            .fetch(id, scope)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub async fn list(&self, scope: Scope) -> Result<Vec<Record<T>>, AppError> {
        self.store.list(scope).await
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Genre};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn controller<T: CatalogEntity>() -> LifecycleController<T> {
        LifecycleController::new(Arc::new(MemoryStore::<T>::default()))
    }

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[tokio::test]
    async fn create_applies_defaults_and_assigns_identity() {
        let categories = controller::<Category>();
        let record = categories
            .create(&attrs(json!({"name": "category name"})))
            .await
            .unwrap();

        assert_eq!(record.id.get_version_num(), 4);
        assert_eq!(record.attrs.name, "category name");
        assert_eq!(record.attrs.description, None);
        assert!(record.attrs.is_active);
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.deleted_at.is_none());
    }

    #[tokio::test]
    async fn create_keeps_submitted_values() {
        let categories = controller::<Category>();
        let record = categories
            .create(&attrs(
                json!({"name": "n", "description": "d", "is_active": false}),
            ))
            .await
            .unwrap();

        assert_eq!(record.attrs.description.as_deref(), Some("d"));
        assert!(!record.attrs.is_active);
    }

    #[tokio::test]
    async fn create_rejection_leaves_storage_untouched() {
        let genres = controller::<Genre>();
        let err = genres.create(&attrs(json!({}))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(genres.list(Scope::WithDeleted).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_mutates_exactly_the_submitted_fields() {
        let categories = controller::<Category>();
        let created = categories
            .create(&attrs(
                json!({"name": "before", "description": "keep", "is_active": false}),
            ))
            .await
            .unwrap();

        let updated = categories
            .update(created.id, &attrs(json!({"name": "after"})))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.attrs.name, "after");
        assert_eq!(updated.attrs.description.as_deref(), Some("keep"));
        assert!(!updated.attrs.is_active);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_clears_description_on_explicit_null() {
        let categories = controller::<Category>();
        let created = categories
            .create(&attrs(json!({"name": "n", "description": "d"})))
            .await
            .unwrap();

        let updated = categories
            .update(created.id, &attrs(json!({"name": "n", "description": null})))
            .await
            .unwrap();
        assert_eq!(updated.attrs.description, None);
    }

    #[tokio::test]
    async fn update_rejection_leaves_row_unchanged() {
        let categories = controller::<Category>();
        let created = categories
            .create(&attrs(json!({"name": "original"})))
            .await
            .unwrap();

        let err = categories
            .update(created.id, &attrs(json!({"name": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = categories.find(created.id, Scope::Active).await.unwrap();
        assert_eq!(stored.attrs.name, "original");
        assert_eq!(stored.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let genres = controller::<Genre>();
        let err = genres
            .update(ident::generate(), &attrs(json!({"name": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_hides_row_from_default_lookups() {
        let genres = controller::<Genre>();
        let created = genres.create(&attrs(json!({"name": "drama"}))).await.unwrap();

        genres.delete(created.id).await.unwrap();

        let err = genres.find(created.id, Scope::Active).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let trashed = genres.find(created.id, Scope::WithDeleted).await.unwrap();
        assert!(trashed.deleted_at.is_some());

        assert!(genres.list(Scope::Active).await.unwrap().is_empty());
        assert_eq!(genres.list(Scope::WithDeleted).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_requires_an_active_row() {
        let genres = controller::<Genre>();
        let created = genres.create(&attrs(json!({"name": "drama"}))).await.unwrap();

        genres.delete(created.id).await.unwrap();
        let err = genres.delete(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn restore_returns_row_to_active_with_attributes_intact() {
        let categories = controller::<Category>();
        let created = categories
            .create(&attrs(
                json!({"name": "movies", "description": "d", "is_active": false}),
            ))
            .await
            .unwrap();

        categories.delete(created.id).await.unwrap();
        let restored = categories.restore(created.id).await.unwrap();
        assert!(restored.deleted_at.is_none());

        let found = categories.find(created.id, Scope::Active).await.unwrap();
        assert_eq!(found.attrs.name, "movies");
        assert_eq!(found.attrs.description.as_deref(), Some("d"));
        assert!(!found.attrs.is_active);
        assert_eq!(found.created_at, created.created_at);
    }

    #[tokio::test]
    async fn restore_unknown_id_is_not_found() {
        let categories = controller::<Category>();
        let err = categories.restore(ident::generate()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn soft_deleted_row_stays_editable_by_id() {
        let categories = controller::<Category>();
        let created = categories.create(&attrs(json!({"name": "old"}))).await.unwrap();
        categories.delete(created.id).await.unwrap();

        let updated = categories
            .update(created.id, &attrs(json!({"name": "new"})))
            .await
            .unwrap();
        assert_eq!(updated.attrs.name, "new");
        assert!(updated.deleted_at.is_some());
    }
}
