//! Sorting configuration.
//!
//! Settings are resolved per call: a record's own override wins, then the
//! override registered for its collection, then the global defaults.

use crate::{error::Result, CollectionName, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Column used when nothing else is configured.
pub const DEFAULT_ORDER_COLUMN: &str = "order_column";

/// Fully resolved settings for one sorting call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Column holding the order value
    pub order_column_name: String,
    /// Assign `highest + 1` when a record is created
    pub sort_when_creating: bool,
    /// Renumber when the order column or a group attribute changes
    pub sort_when_updating: bool,
    /// Close the gap left behind by a deleted record
    pub sort_when_deleting: bool,
    /// Attributes whose combined values define a group
    pub groups: Vec<String>,
    /// First order value of every group
    pub start_order: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            order_column_name: DEFAULT_ORDER_COLUMN.to_string(),
            sort_when_creating: true,
            sort_when_updating: true,
            sort_when_deleting: true,
            groups: Vec::new(),
            start_order: 1,
        }
    }
}

impl Settings {
    /// Apply an override on top of these settings.
    pub fn merged(mut self, layer: &SettingsOverride) -> Self {
        if let Some(column) = &layer.order_column_name {
            self.order_column_name = column.clone();
        }
        if let Some(flag) = layer.sort_when_creating {
            self.sort_when_creating = flag;
        }
        if let Some(flag) = layer.sort_when_updating {
            self.sort_when_updating = flag;
        }
        if let Some(flag) = layer.sort_when_deleting {
            self.sort_when_deleting = flag;
        }
        if let Some(groups) = &layer.groups {
            self.groups = groups.clone();
        }
        if let Some(start) = layer.start_order {
            self.start_order = start;
        }
        self
    }

    /// Check the settings can produce a valid ordering.
    pub fn validate(&self) -> Result<()> {
        if self.order_column_name.trim().is_empty() {
            return Err(Error::InvalidConfig("order column name is empty".into()));
        }
        if self.start_order < 0 {
            return Err(Error::InvalidConfig(format!(
                "start order must not be negative, got {}",
                self.start_order
            )));
        }
        if let Some(group) = self
            .groups
            .iter()
            .find(|g| **g == self.order_column_name)
        {
            return Err(Error::InvalidConfig(format!(
                "order column '{group}' cannot also be a group attribute"
            )));
        }
        Ok(())
    }
}

/// Partial settings; unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_column_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_when_creating: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_when_updating: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_when_deleting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_order: Option<i64>,
}

impl SettingsOverride {
    /// Override only the order column.
    pub fn order_column(name: impl Into<String>) -> Self {
        Self {
            order_column_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Override only the group attributes.
    pub fn groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: Some(groups.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

/// Global defaults plus per-collection overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global defaults
    pub defaults: Settings,
    /// Overrides keyed by collection name
    pub types: HashMap<CollectionName, SettingsOverride>,
}

impl Config {
    /// Create a config with the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override for a collection.
    pub fn with_type(
        mut self,
        collection: impl Into<CollectionName>,
        layer: SettingsOverride,
    ) -> Self {
        self.types.insert(collection.into(), layer);
        self
    }

    /// Resolve the effective settings for a collection and an optional record override.
    pub fn resolve(&self, collection: &str, record: Option<&SettingsOverride>) -> Settings {
        let mut settings = self.defaults.clone();
        if let Some(layer) = self.types.get(collection) {
            settings = settings.merged(layer);
        }
        if let Some(layer) = record {
            settings = settings.merged(layer);
        }
        settings
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load global defaults from environment variables.
    ///
    /// Recognised keys: `AUTOSORT_ORDER_COLUMN`, `AUTOSORT_SORT_WHEN_CREATING`,
    /// `AUTOSORT_SORT_WHEN_UPDATING`, `AUTOSORT_SORT_WHEN_DELETING`,
    /// `AUTOSORT_GROUPS` (comma separated) and `AUTOSORT_START_ORDER`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut defaults = Settings::default();

        if let Some(column) = lookup("AUTOSORT_ORDER_COLUMN") {
            defaults.order_column_name = column;
        }
        if let Some(raw) = lookup("AUTOSORT_SORT_WHEN_CREATING") {
            defaults.sort_when_creating = parse_flag("AUTOSORT_SORT_WHEN_CREATING", &raw)?;
        }
        if let Some(raw) = lookup("AUTOSORT_SORT_WHEN_UPDATING") {
            defaults.sort_when_updating = parse_flag("AUTOSORT_SORT_WHEN_UPDATING", &raw)?;
        }
        if let Some(raw) = lookup("AUTOSORT_SORT_WHEN_DELETING") {
            defaults.sort_when_deleting = parse_flag("AUTOSORT_SORT_WHEN_DELETING", &raw)?;
        }
        if let Some(raw) = lookup("AUTOSORT_GROUPS") {
            defaults.groups = raw
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup("AUTOSORT_START_ORDER") {
            defaults.start_order = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("AUTOSORT_START_ORDER is not an integer: {raw}"))
            })?;
        }

        let config = Self {
            defaults,
            types: HashMap::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the defaults and every collection once resolved.
    pub fn validate(&self) -> Result<()> {
        self.defaults.validate()?;
        for collection in self.types.keys() {
            self.resolve(collection, None).validate()?;
        }
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfig(format!("{key} is not a boolean: {raw}"))),
    }
}
