//! Renumbering: the algorithms that write order values.
//!
//! Every renumbering pass reduces to [`Sorter::set_new_order`]-style bulk
//! assignment: one keyed update per identifier, in sequence order. Passes are
//! multi-statement; a store failure midway leaves the group partially
//! renumbered and is returned to the caller untouched.

use crate::{error::Result, Direction, Error, RecordStore, Sorter, Sortable};
use serde_json::Value;

impl Sorter {
    /// Assign `start_order`, `start_order + 1`, ... to the given keys in order.
    ///
    /// Keys are matched against [`Sorter::key_name`], so records with a custom
    /// primary key column need a sorter built with [`Sorter::with_key_name`].
    /// A key that matches no record fails with [`Error::RecordNotFound`]; the
    /// keys before it have already been written.
    pub fn set_new_order<S, I, K>(&self, store: &mut S, ids: I, start_order: i64) -> Result<()>
    where
        S: RecordStore,
        I: IntoIterator<Item = K>,
        K: Into<Value>,
    {
        let column = self.settings().order_column_name;
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        self.assign_order(store, self.key_name(), &column, &ids, start_order)
    }

    /// Like [`Sorter::set_new_order`], matching identifiers against another column.
    pub fn set_new_order_by_custom_column<S, I, K>(
        &self,
        store: &mut S,
        key_column: &str,
        ids: I,
        start_order: i64,
    ) -> Result<()>
    where
        S: RecordStore,
        I: IntoIterator<Item = K>,
        K: Into<Value>,
    {
        let column = self.settings().order_column_name;
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        self.assign_order(store, key_column, &column, &ids, start_order)
    }

    /// Bulk assignment from an untyped payload, e.g. a request body.
    ///
    /// Fails with [`Error::InvalidInput`] unless `ids` is a JSON array.
    pub fn set_new_order_json<S: RecordStore>(
        &self,
        store: &mut S,
        ids: &Value,
        start_order: i64,
    ) -> Result<()> {
        let Value::Array(ids) = ids else {
            return Err(Error::InvalidInput(format!(
                "ids must be an array, got {ids}"
            )));
        };
        let column = self.settings().order_column_name;
        self.assign_order(store, self.key_name(), &column, ids, start_order)
    }

    pub(crate) fn assign_order<S: RecordStore>(
        &self,
        store: &mut S,
        key_column: &str,
        order_column: &str,
        ids: &[Value],
        start_order: i64,
    ) -> Result<()> {
        // Reject bad input before the first write
        if start_order < 0 {
            return Err(Error::InvalidInput(format!(
                "start order must not be negative, got {start_order}"
            )));
        }
        if let Some(index) = ids.iter().position(|id| !is_scalar(id)) {
            return Err(Error::InvalidInput(format!(
                "identifier at index {index} is not a scalar: {}",
                ids[index]
            )));
        }
        if i64::try_from(ids.len())
            .ok()
            .and_then(|len| start_order.checked_add(len))
            .is_none()
        {
            return Err(Error::InvalidInput(format!(
                "{} identifiers starting at {start_order} overflow the order column",
                ids.len()
            )));
        }

        tracing::debug!(
            collection = self.collection(),
            count = ids.len(),
            start_order,
            "assigning order"
        );

        let base = self.build_base_sort_query();
        for (offset, id) in ids.iter().enumerate() {
            let order = start_order + offset as i64;
            let query = base.clone().filter_eq(key_column, id.clone());
            tracing::trace!(id = %id, order, "assign");
            let values = [(order_column.to_string(), Value::from(order))];
            let touched = store.update(&query, &values)?;
            if touched == 0 {
                tracing::warn!(
                    collection = self.collection(),
                    key_column,
                    id = %id,
                    "no record to assign an order to"
                );
                return Err(Error::RecordNotFound(id.to_string()));
            }
        }
        Ok(())
    }

    /// Keys of the group matching `query`, in ascending order-column order.
    fn ordered_keys<S: RecordStore>(
        &self,
        store: &S,
        query: crate::Query,
        record: &S::Record,
    ) -> Result<Vec<Value>> {
        let column = self.order_column_name(record);
        let records = store.fetch(&query.order_by(&column, Direction::Asc))?;
        Ok(records.iter().map(|r| r.key()).collect())
    }

    /// Re-densify the record's old and/or new group.
    ///
    /// `original` renumbers the group the record was loaded in, without the
    /// record. `dirty` renumbers the group given by the record's current
    /// values and appends the record at the end; the in-memory order value
    /// is updated to the slot it received.
    pub fn repair_order<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
        original: bool,
        dirty: bool,
    ) -> Result<()> {
        let settings = self.settings_for(record);
        let key = record.key();

        if original {
            let query = self
                .build_sort_query(record, true)
                .filter_ne(record.key_name(), key.clone());
            let ids = self.ordered_keys(store, query, record)?;
            tracing::debug!(
                collection = self.collection(),
                count = ids.len(),
                "repairing original group"
            );
            self.assign_order(
                store,
                record.key_name(),
                &settings.order_column_name,
                &ids,
                settings.start_order,
            )?;
        }

        if dirty {
            let query = self.build_sort_query(record, false);
            let mut ids = self.ordered_keys(store, query, record)?;
            ids.push(key);
            tracing::debug!(
                collection = self.collection(),
                count = ids.len(),
                "repairing current group"
            );
            self.assign_order(
                store,
                record.key_name(),
                &settings.order_column_name,
                &ids,
                settings.start_order,
            )?;
            self.set_order_value(record, settings.start_order + ids.len() as i64 - 1);
        }

        Ok(())
    }

    /// Move the record to `position` within its current group and renumber the group.
    ///
    /// Positions below `start_order` clamp to the front; positions past the
    /// end clamp to the back. The in-memory order value is set to the slot
    /// the record actually took.
    pub fn move_to_position<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
        position: i64,
    ) -> Result<()> {
        let settings = self.settings_for(record);
        let key = record.key();

        let query = self.build_sort_query(record, false);
        let mut ids = self.ordered_keys(store, query, record)?;

        // In a dense group this is the slot `original order - start_order`
        if let Some(current) = ids.iter().position(|id| *id == key) {
            ids.remove(current);
        }

        let index = position
            .saturating_sub(settings.start_order)
            .clamp(0, ids.len() as i64) as usize;
        ids.insert(index, key);

        tracing::debug!(
            collection = self.collection(),
            position,
            index,
            "moving to position"
        );
        self.assign_order(
            store,
            record.key_name(),
            &settings.order_column_name,
            &ids,
            settings.start_order,
        )?;
        self.set_order_value(record, settings.start_order + index as i64);
        Ok(())
    }

    /// Exchange the order values of two records and save both quietly.
    pub fn swap_order_with_model<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
        other: &mut S::Record,
    ) -> Result<()> {
        let column = self.order_column_name(record);
        let mine = record.attribute(&column).unwrap_or(Value::Null);
        let theirs = other.attribute(&column).unwrap_or(Value::Null);

        other.set_attribute(&column, mine);
        store.save_quietly(self.collection(), other)?;

        record.set_attribute(&column, theirs);
        store.save_quietly(self.collection(), record)?;
        Ok(())
    }

    /// Same as [`Sorter::swap_order_with_model`].
    pub fn swap_order<S: RecordStore>(
        &self,
        store: &mut S,
        a: &mut S::Record,
        b: &mut S::Record,
    ) -> Result<()> {
        self.swap_order_with_model(store, a, b)
    }

    /// Highest order value in the record's group, 0 when the group is empty.
    pub fn highest_order_number<S: RecordStore>(
        &self,
        store: &S,
        record: &S::Record,
    ) -> Result<i64> {
        let query = self.build_sort_query(record, false);
        Ok(store.max(&query, &self.order_column_name(record))?.unwrap_or(0))
    }

    /// Lowest order value in the record's group, 0 when the group is empty.
    pub fn lowest_order_number<S: RecordStore>(
        &self,
        store: &S,
        record: &S::Record,
    ) -> Result<i64> {
        let query = self.build_sort_query(record, false);
        Ok(store.min(&query, &self.order_column_name(record))?.unwrap_or(0))
    }

    /// Give the record the slot after the current highest of its group.
    pub fn set_highest_order_number<S: RecordStore>(
        &self,
        store: &S,
        record: &mut S::Record,
    ) -> Result<()> {
        let query = self.build_sort_query(record, false);
        let next = self.next_order_number(store, &query, record)?;
        self.set_order_value(record, next);
        Ok(())
    }

    /// One past the highest order value matched by `query`, `start_order` when nothing matches.
    pub(crate) fn next_order_number<S: RecordStore>(
        &self,
        store: &S,
        query: &crate::Query,
        record: &S::Record,
    ) -> Result<i64> {
        let settings = self.settings_for(record);
        match store.max(query, &settings.order_column_name)? {
            Some(highest) => highest.checked_add(1).ok_or_else(|| {
                Error::InvalidInput(format!("no order value left after {highest}"))
            }),
            None => Ok(settings.start_order),
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Number(_) | Value::String(_) | Value::Bool(_))
}
