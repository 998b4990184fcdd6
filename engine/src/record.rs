//! The record capability the engine sorts, and a dynamic record implementing it.

use crate::config::SettingsOverride;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column holding the primary key unless a record says otherwise.
pub const DEFAULT_KEY_NAME: &str = "id";

/// Minimal capability a record needs to be kept in order.
///
/// Implementors track which attributes changed since the record was loaded
/// ("dirty") and the values they had at load time ("original"). The engine
/// never changes group attributes; it only reads them and writes the order
/// column.
pub trait Sortable: Clone {
    /// Name of the primary key column.
    fn key_name(&self) -> &str {
        DEFAULT_KEY_NAME
    }

    /// Primary key value, `Null` when the record has none yet.
    fn key(&self) -> Value {
        self.attribute(self.key_name()).unwrap_or(Value::Null)
    }

    /// Current value of an attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Value of an attribute as last loaded from the store.
    fn original(&self, name: &str) -> Option<Value>;

    /// Change an attribute in memory.
    fn set_attribute(&mut self, name: &str, value: Value);

    /// Names of attributes changed since the record was loaded.
    fn dirty_attributes(&self) -> Vec<String>;

    fn is_dirty(&self, name: &str) -> bool {
        self.dirty_attributes().iter().any(|a| a == name)
    }

    /// Mark the current values as persisted.
    fn sync_original(&mut self);

    /// Per-record settings that win over collection and global settings.
    fn overrides(&self) -> Option<&SettingsOverride> {
        None
    }
}

/// A schemaless record backed by a JSON attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Name of the primary key attribute
    key_name: String,
    /// Current attribute values
    attributes: Map<String, Value>,
    /// Attribute values as last persisted
    #[serde(default)]
    original: Map<String, Value>,
    /// Per-record settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    overrides: Option<SettingsOverride>,
}

impl Record {
    /// Create a new, unsaved record with the given primary key.
    pub fn new(key: impl Into<Value>) -> Self {
        Self::with_key_name(DEFAULT_KEY_NAME, key)
    }

    /// Create a new record whose primary key lives in a custom column.
    pub fn with_key_name(key_name: impl Into<String>, key: impl Into<Value>) -> Self {
        let key_name = key_name.into();
        let mut attributes = Map::new();
        attributes.insert(key_name.clone(), key.into());
        Self {
            key_name,
            attributes,
            original: Map::new(),
            overrides: None,
        }
    }

    /// Set an attribute, builder style.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Attach per-record settings.
    pub fn with_overrides(mut self, overrides: SettingsOverride) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Mark every attribute as loaded from the store.
    pub fn loaded(mut self) -> Self {
        self.sync_original();
        self
    }

    /// Current value of an attribute as `i64`, if it is an integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(Value::as_i64)
    }

    /// All current attribute values.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Whether the record was ever persisted.
    pub fn exists(&self) -> bool {
        !self.original.is_empty()
    }
}

impl Sortable for Record {
    fn key_name(&self) -> &str {
        &self.key_name
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn original(&self, name: &str) -> Option<Value> {
        self.original.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn dirty_attributes(&self) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(name, value)| self.original.get(name.as_str()) != Some(value))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn is_dirty(&self, name: &str) -> bool {
        match self.attributes.get(name) {
            Some(value) => self.original.get(name) != Some(value),
            None => false,
        }
    }

    fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }

    fn overrides(&self) -> Option<&SettingsOverride> {
        self.overrides.as_ref()
    }
}
