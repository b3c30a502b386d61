//! Catalog entities and the persisted-record wrapper.

mod category;
mod genre;

pub use category::Category;
pub use genre::Genre;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validation::FieldRules;

/// Maximum length of `name` on every catalog entity.
pub const NAME_MAX: u32 = 255;

/// A persisted catalog row: the generated identifier, audit timestamps, and
/// the soft-delete marker, wrapped around the entity's own attributes.
///
/// `deleted_at` is the soft-delete capability: a `Some` value hides the row
/// from default lookups without removing it from storage. The identifier is
/// assigned once at creation and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub attrs: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl<T> Record<T> {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A catalog entity type: its resource name, validation rule table, and how
/// its attributes are built from validated payloads.
///
/// `from_attrs` and `merge_attrs` are only called on payloads the gate has
/// accepted, so they read fields without re-checking types.
pub trait CatalogEntity: Clone + Send + Sync + 'static {
    /// Path segment and log label, e.g. `"categories"`.
    const RESOURCE: &'static str;

    /// The rule table handed to the validation gate at construction.
    fn rules() -> &'static [FieldRules];

    /// Build attributes from a create payload, applying defaults for absent
    /// optional fields.
    fn from_attrs(attrs: &Map<String, Value>) -> Self;

    /// Overwrite exactly the fields present in an update payload; absent
    /// fields keep their stored values.
    fn merge_attrs(&mut self, attrs: &Map<String, Value>);
}
