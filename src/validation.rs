//! Request validation against per-entity rule tables.
//!
//! Every rule of every field is evaluated; a rejected payload reports all
//! violations at once so a client can fix `name` and `is_active` in one pass.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A declarative field rule. Rules other than `Required` only apply when the
/// field is present and non-null.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Present, non-null, and (for strings) non-empty. Holds for create and
    /// update alike: partial updates are not supported.
    Required,
    /// Value must be a JSON string.
    Text,
    /// String length in characters must not exceed the limit.
    MaxLength(u32),
    /// Value must be a JSON boolean; `"true"` and `1` are rejected.
    Boolean,
}

/// The rule kind a violation reports back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    Text,
    Max,
    Boolean,
}

/// Rules for one field of an entity's payload.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

/// One failed rule: the field, the rule kind, its parameter, and a
/// client-facing message.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub rule: RuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub message: String,
}

/// Aggregate of every violation found in one payload.
#[derive(Debug, Clone)]
pub struct ValidationErrors {
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Per-field message lists, as served in the 422 response `details`.
    pub fn field_messages(&self) -> Value {
        let mut map = Map::new();
        for v in &self.violations {
            let entry = map
                .entry(v.field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(messages) = entry {
                messages.push(Value::String(v.message.clone()));
            }
        }
        Value::Object(map)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.violations {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", v.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The validation gate for one entity type. Holds the entity's rule table;
/// no global rule registry exists.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    rules: &'static [FieldRules],
}

impl Gate {
    pub fn new(rules: &'static [FieldRules]) -> Self {
        Gate { rules }
    }

    /// Validate a payload. Evaluates every declared rule and returns all
    /// violations together; an empty result means the payload is acceptable
    /// for create and update alike.
    pub fn check(&self, body: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut violations = Vec::new();
        for field_rules in self.rules {
            let value = body.get(field_rules.field);
            for rule in field_rules.rules {
                if let Some(v) = check_rule(field_rules.field, value, *rule) {
                    violations.push(v);
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { violations })
        }
    }
}

fn check_rule(field: &'static str, value: Option<&Value>, rule: Rule) -> Option<Violation> {
    match rule {
        Rule::Required => {
            let missing = match value {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            missing.then(|| Violation {
                field,
                rule: RuleKind::Required,
                limit: None,
                message: format!("{} is required", field),
            })
        }
        Rule::Text => match value {
            Some(v) if !v.is_null() && !v.is_string() => Some(Violation {
                field,
                rule: RuleKind::Text,
                limit: None,
                message: format!("{} must be a string", field),
            }),
            _ => None,
        },
        Rule::MaxLength(limit) => {
            // Character count, not bytes: a 255-char name passes regardless
            // of encoding width.
            let over = value
                .and_then(Value::as_str)
                .map(|s| s.chars().count() > limit as usize)
                .unwrap_or(false);
            over.then(|| Violation {
                field,
                rule: RuleKind::Max,
                limit: Some(limit),
                message: format!("{} must be at most {} characters", field, limit),
            })
        }
        Rule::Boolean => match value {
            Some(v) if !v.is_null() && !v.is_boolean() => Some(Violation {
                field,
                rule: RuleKind::Boolean,
                limit: None,
                message: format!("{} must be a boolean", field),
            }),
            _ => None,
        },
    }
}
