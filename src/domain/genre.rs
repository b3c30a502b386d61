//! Genre: a classification tag for catalog titles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CatalogEntity, NAME_MAX};
use crate::validation::{FieldRules, Rule};

const RULES: &[FieldRules] = &[
    FieldRules {
        field: "name",
        rules: &[Rule::Required, Rule::Text, Rule::MaxLength(NAME_MAX)],
    },
    FieldRules {
        field: "is_active",
        rules: &[Rule::Boolean],
    },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    pub is_active: bool,
}

impl CatalogEntity for Genre {
    const RESOURCE: &'static str = "genres";

    fn rules() -> &'static [FieldRules] {
        RULES
    }

    fn from_attrs(attrs: &Map<String, Value>) -> Self {
        Genre {
            name: attrs
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_active: attrs
                .get("is_active")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        }
    }

    fn merge_attrs(&mut self, attrs: &Map<String, Value>) {
        if let Some(name) = attrs.get("name").and_then(Value::as_str) {
            self.name = name.to_string();
        }
        if let Some(active) = attrs.get("is_active").and_then(Value::as_bool) {
            self.is_active = active;
        }
    }
}
