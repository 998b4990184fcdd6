//! Order column access.

use crate::{store::as_order, Sorter, Sortable};
use serde_json::Value;

impl Sorter {
    /// Effective order column for a record.
    pub fn order_column_name<R: Sortable>(&self, record: &R) -> String {
        self.settings_for(record).order_column_name
    }

    /// Current order value, `None` when unset or not an integer.
    pub fn order_value<R: Sortable>(&self, record: &R) -> Option<i64> {
        record
            .attribute(&self.order_column_name(record))
            .as_ref()
            .and_then(as_order)
    }

    /// Order value as last loaded from the store.
    pub fn original_order_value<R: Sortable>(&self, record: &R) -> Option<i64> {
        record
            .original(&self.order_column_name(record))
            .as_ref()
            .and_then(as_order)
    }

    pub fn set_order_value<R: Sortable>(&self, record: &mut R, value: i64) {
        let column = self.order_column_name(record);
        record.set_attribute(&column, Value::from(value));
    }

    pub fn has_changed_order_column<R: Sortable>(&self, record: &R) -> bool {
        record.is_dirty(&self.order_column_name(record))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, Record, SettingsOverride, Sortable, Sorter};
    use serde_json::json;

    #[test]
    fn default_column() {
        let sorter = Sorter::new("tasks", Config::new());
        let mut record = Record::new(1).with("order_column", 3).loaded();

        assert_eq!(sorter.order_column_name(&record), "order_column");
        assert_eq!(sorter.order_value(&record), Some(3));
        assert!(!sorter.has_changed_order_column(&record));

        sorter.set_order_value(&mut record, 5);
        assert_eq!(sorter.order_value(&record), Some(5));
        assert_eq!(sorter.original_order_value(&record), Some(3));
        assert!(sorter.has_changed_order_column(&record));
    }

    #[test]
    fn column_precedence() {
        let config = Config::new().with_type("tasks", SettingsOverride::order_column("position"));
        let sorter = Sorter::new("tasks", config);

        let record = Record::new(1).with("position", 2);
        assert_eq!(sorter.order_column_name(&record), "position");
        assert_eq!(sorter.order_value(&record), Some(2));

        let record = Record::new(2)
            .with("rank", 7)
            .with_overrides(SettingsOverride::order_column("rank"));
        assert_eq!(sorter.order_column_name(&record), "rank");
        assert_eq!(sorter.order_value(&record), Some(7));
    }

    #[test]
    fn non_integer_order_value() {
        let sorter = Sorter::new("tasks", Config::new());
        let record = Record::new(1).with("order_column", "n/a");
        assert_eq!(sorter.order_value(&record), None);

        let record = Record::new(1).with("order_column", json!(null));
        assert_eq!(sorter.order_value(&record), None);
        assert_eq!(record.attribute("order_column"), Some(json!(null)));
    }
}
