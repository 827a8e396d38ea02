//! Structural configuration schemas
//!
//! A provider may describe the shape of the configuration table it expects.
//! The default `configure()` checks the table against the schema, fills in
//! defaults, and reports every problem at once.

use strum_macros::Display;
use toml::{Table, Value};

/// Value type expected for a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    /// Accepts integers as well
    Float,
    Boolean,
    Array,
    Table,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldKind::String, Value::String(_))
                | (FieldKind::Integer, Value::Integer(_))
                | (FieldKind::Float, Value::Float(_))
                | (FieldKind::Float, Value::Integer(_))
                | (FieldKind::Boolean, Value::Boolean(_))
                | (FieldKind::Array, Value::Array(_))
                | (FieldKind::Table, Value::Table(_))
        )
    }
}

/// One field of a configuration schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

/// Expected shape of a plugin's configuration table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigSchema {
    fields: Vec<SchemaField>,
    allow_unknown: bool,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field that must be present
    pub fn required(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
        });
        self
    }

    /// Add a field that may be omitted
    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
        });
        self
    }

    /// Add an optional field filled with `default` when omitted
    pub fn with_default(mut self, name: &str, kind: FieldKind, default: impl Into<Value>) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            kind,
            required: false,
            default: Some(default.into()),
        });
        self
    }

    /// Accept keys the schema does not mention
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Validate `config` and return it with defaults applied.
    ///
    /// On failure every problem found is returned, in schema order followed
    /// by unknown keys in name order.
    pub fn validate(&self, config: &Table) -> Result<Table, Vec<String>> {
        let mut errors = Vec::new();
        let mut normalized = config.clone();

        for field in &self.fields {
            match config.get(&field.name) {
                Some(value) if !field.kind.matches(value) => errors.push(format!(
                    "field '{}' must be a {}, found {}",
                    field.name,
                    field.kind,
                    value.type_str()
                )),
                Some(_) => {}
                None if field.required => {
                    errors.push(format!("missing required field '{}'", field.name))
                }
                None => {
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }

        if !self.allow_unknown {
            let mut unknown: Vec<&String> = config
                .keys()
                .filter(|key| !self.fields.iter().any(|f| &f.name == *key))
                .collect();
            unknown.sort();
            errors.extend(unknown.into_iter().map(|key| format!("unknown field '{}'", key)));
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }
}
