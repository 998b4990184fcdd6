//! Positional operations for callers reordering records on demand.
//!
//! Operations that find nothing to do (no neighbour, already first or last)
//! return `Ok(false)` and leave every order value untouched.

use crate::{error::Result, Direction, Query, RecordStore, Sorter, Sortable};

impl Sorter {
    /// Every live record of the collection sorted by the order column.
    pub fn ordered(&self, direction: Direction) -> Query {
        let column = self.settings().order_column_name;
        Query::new(self.collection()).order_by(&column, direction)
    }

    /// The record's group sorted by the order column, trashed records included.
    pub fn group_ordered<R: Sortable>(&self, record: &R, direction: Direction) -> Query {
        let column = self.order_column_name(record);
        self.build_sort_query(record, false).order_by(&column, direction)
    }

    /// Swap with the neighbour holding the next higher order value.
    pub fn move_order_up<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
    ) -> Result<bool> {
        self.swap_with_neighbour(store, record, Direction::Asc)
    }

    /// Swap with the neighbour holding the next lower order value.
    pub fn move_order_down<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
    ) -> Result<bool> {
        self.swap_with_neighbour(store, record, Direction::Desc)
    }

    fn swap_with_neighbour<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
        direction: Direction,
    ) -> Result<bool> {
        let column = self.order_column_name(record);
        let current = self.order_value(record).unwrap_or(0);

        let query = self.group_ordered(record, direction).limit(1);
        let query = match direction {
            Direction::Asc => query.filter_gt(&column, current),
            Direction::Desc => query.filter_lt(&column, current),
        };

        let Some(mut neighbour) = store.first(&query)? else {
            tracing::debug!(
                collection = self.collection(),
                ?direction,
                "no neighbour to swap with"
            );
            return Ok(false);
        };

        self.swap_order_with_model(store, record, &mut neighbour)?;
        Ok(true)
    }

    /// Take the first slot of the group, shifting the records before it back by one.
    pub fn move_to_start<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
    ) -> Result<bool> {
        let Some(first) = store.first(&self.group_ordered(record, Direction::Asc))? else {
            return Ok(false);
        };
        if first.key() == record.key() {
            tracing::debug!(collection = self.collection(), "already first");
            return Ok(false);
        }

        let column = self.order_column_name(record);
        let old = self.order_value(record).unwrap_or(i64::MAX);
        let first_order = self.order_value(&first).unwrap_or(0);

        self.set_order_value(record, first_order);
        store.save_quietly(self.collection(), record)?;

        let rest = self
            .build_sort_query(record, false)
            .filter_ne(record.key_name(), record.key())
            .filter_lt(&column, old);
        store.increment(&rest, &column, 1)?;
        Ok(true)
    }

    /// Take the last slot of the group, shifting the records after it forward by one.
    pub fn move_to_end<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
    ) -> Result<bool> {
        let max = self.highest_order_number(store, record)?;
        let Some(old) = self.order_value(record) else {
            return Ok(false);
        };
        if old == max {
            tracing::debug!(collection = self.collection(), "already last");
            return Ok(false);
        }

        let column = self.order_column_name(record);
        self.set_order_value(record, max);
        store.save_quietly(self.collection(), record)?;

        let rest = self
            .build_sort_query(record, false)
            .filter_ne(record.key_name(), record.key())
            .filter_gt(&column, old);
        store.decrement(&rest, &column, 1)?;
        Ok(true)
    }

    /// Splice the record to the slot named by its current order value.
    pub fn move_to_new_position<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
    ) -> Result<()> {
        let position = self
            .order_value(record)
            .unwrap_or(self.settings_for(record).start_order);
        self.move_to_position(store, record, position)
    }

    pub fn is_first_in_order<S: RecordStore>(
        &self,
        store: &S,
        record: &S::Record,
    ) -> Result<bool> {
        Ok(self.order_value(record) == Some(self.lowest_order_number(store, record)?))
    }

    pub fn is_last_in_order<S: RecordStore>(
        &self,
        store: &S,
        record: &S::Record,
    ) -> Result<bool> {
        Ok(self.order_value(record) == Some(self.highest_order_number(store, record)?))
    }
}
