//! The [`Sorter`] binds one collection to its sorting configuration.
//!
//! The engine is split by concern across modules, each adding an `impl Sorter`
//! block:
//!
//! - [`crate::group`]: which records are siblings
//! - [`crate::column`]: reading and writing the order column
//! - [`crate::renumber`]: bulk assignment, repair, splice and swap
//! - [`crate::lifecycle`]: create/update/delete hooks
//! - [`crate::position`]: move up/down/start/end and edge checks

use crate::{
    config::{Config, Settings},
    error::Result,
    record::DEFAULT_KEY_NAME,
    CollectionName, Sortable,
};

/// Ordering engine for one collection.
#[derive(Debug, Clone)]
pub struct Sorter {
    collection: CollectionName,
    config: Config,
    key_name: String,
}

impl Sorter {
    /// Create a sorter for a collection. The config is used as given; see [`Sorter::try_new`].
    pub fn new(collection: impl Into<CollectionName>, config: Config) -> Self {
        Self {
            collection: collection.into(),
            config,
            key_name: DEFAULT_KEY_NAME.to_string(),
        }
    }

    /// Create a sorter after checking every layer of the config resolves to
    /// valid settings.
    pub fn try_new(collection: impl Into<CollectionName>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(collection, config))
    }

    /// Use a custom primary key column for operations that take bare identifiers.
    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    /// The collection this sorter orders.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The configuration this sorter resolves settings from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The primary key column used by [`Sorter::set_new_order`].
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Settings for the collection, ignoring any record override.
    pub fn settings(&self) -> Settings {
        self.config.resolve(&self.collection, None)
    }

    /// Settings for one record: record override, then collection, then defaults.
    pub fn settings_for<R: Sortable>(&self, record: &R) -> Settings {
        self.config.resolve(&self.collection, record.overrides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Record, SettingsOverride};

    #[test]
    fn settings_resolution() {
        let config = Config::new().with_type("tasks", SettingsOverride::groups(["board_id"]));
        let sorter = Sorter::new("tasks", config);

        assert_eq!(sorter.collection(), "tasks");
        assert_eq!(sorter.key_name(), "id");
        assert_eq!(sorter.settings().groups, vec!["board_id".to_string()]);

        let record = Record::new(1).with_overrides(SettingsOverride::order_column("rank"));
        let settings = sorter.settings_for(&record);
        assert_eq!(settings.order_column_name, "rank");
        assert_eq!(settings.groups, vec!["board_id".to_string()]);
    }

    #[test]
    fn try_new_validates_config() {
        let config = Config::new().with_type("tasks", SettingsOverride::groups(["order_column"]));
        assert!(matches!(
            Sorter::try_new("tasks", config),
            Err(Error::InvalidConfig(_))
        ));

        let config = Config::new().with_type("tasks", SettingsOverride::order_column(" "));
        assert!(matches!(
            Sorter::try_new("tasks", config),
            Err(Error::InvalidConfig(_))
        ));

        let sorter = Sorter::try_new("tasks", Config::new()).unwrap();
        assert_eq!(sorter.settings(), Settings::default());
    }

    #[test]
    fn custom_key_name() {
        let sorter = Sorter::new("tasks", Config::new()).with_key_name("uuid");
        assert_eq!(sorter.key_name(), "uuid");
    }
}
