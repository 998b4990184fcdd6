//! Group resolution: which records share an ordering with a given record.

use crate::{Query, Sorter, Sortable};
use serde_json::Value;

impl Sorter {
    /// Every record of the collection, soft-deleted ones included.
    ///
    /// Trashed records keep their order values, so renumbering must see them
    /// to avoid handing out a number a restored record already holds.
    pub fn build_base_sort_query(&self) -> Query {
        Query::new(self.collection()).with_trashed()
    }

    /// The record's group: the base query filtered on every group attribute.
    ///
    /// With `original` set, the group is computed from the values the record
    /// was loaded with; a record that was never loaded falls back to its
    /// current values. No group attributes means the whole collection.
    pub fn build_sort_query<R: Sortable>(&self, record: &R, original: bool) -> Query {
        let settings = self.settings_for(record);
        settings
            .groups
            .iter()
            .fold(self.build_base_sort_query(), |query, attribute| {
                let value = if original {
                    record
                        .original(attribute)
                        .or_else(|| record.attribute(attribute))
                } else {
                    record.attribute(attribute)
                };
                query.filter_eq(attribute, value.unwrap_or(Value::Null))
            })
    }

    /// Group attributes changed since the record was loaded, in configured order.
    pub fn changed_group_attributes<R: Sortable>(&self, record: &R) -> Vec<String> {
        let dirty = record.dirty_attributes();
        self.settings_for(record)
            .groups
            .into_iter()
            .filter(|group| dirty.contains(group))
            .collect()
    }

    pub fn has_changed_group_attributes<R: Sortable>(&self, record: &R) -> bool {
        !self.changed_group_attributes(record).is_empty()
    }
}
