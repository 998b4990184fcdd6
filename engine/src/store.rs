//! Record store adapters.
//!
//! The engine never talks to a database directly. It describes reads and bulk
//! writes as [`Query`] values and hands them to a [`RecordStore`]. The
//! [`MemoryStore`] is the reference adapter: it keeps every collection in
//! insertion order, which doubles as the tie-break for equal sort keys.

use crate::{
    error::Result, query::compare_values, CollectionName, Error, Query, Record, Sortable,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Read an order value as an integer, truncating floats and parsing numeric strings.
pub fn as_order(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// CRUD plus filtered, ordered reads over collections of one record type.
///
/// Writes made through `update`, `increment` and `save_quietly` never run
/// lifecycle hooks; hooks are explicit calls on [`crate::Sorter`].
pub trait RecordStore {
    type Record: Sortable;

    /// All records matching the query, sorted and limited as requested.
    fn fetch(&self, query: &Query) -> Result<Vec<Self::Record>>;

    /// Set `values` on every record matching the query. Returns the number of records touched.
    fn update(&mut self, query: &Query, values: &[(String, Value)]) -> Result<usize>;

    /// Add `amount` to an integer column on every record matching the query.
    fn increment(&mut self, query: &Query, column: &str, amount: i64) -> Result<usize>;

    /// Persist a new record.
    fn insert(&mut self, collection: &str, record: &mut Self::Record) -> Result<()>;

    /// Persist the dirty attributes of a record without running lifecycle hooks.
    fn save_quietly(&mut self, collection: &str, record: &mut Self::Record) -> Result<()>;

    /// Remove a record, softly if the collection uses soft deletes.
    fn delete(&mut self, collection: &str, record: &Self::Record) -> Result<()>;

    /// The first record matching the query.
    fn first(&self, query: &Query) -> Result<Option<Self::Record>> {
        Ok(self.fetch(&query.clone().limit(1))?.into_iter().next())
    }

    /// Highest integer value of `column`, `None` when nothing matches.
    fn max(&self, query: &Query, column: &str) -> Result<Option<i64>> {
        Ok(self
            .fetch(query)?
            .iter()
            .filter_map(|r| r.attribute(column).as_ref().and_then(as_order))
            .max())
    }

    /// Lowest integer value of `column`, `None` when nothing matches.
    fn min(&self, query: &Query, column: &str) -> Result<Option<i64>> {
        Ok(self
            .fetch(query)?
            .iter()
            .filter_map(|r| r.attribute(column).as_ref().and_then(as_order))
            .min())
    }

    fn decrement(&mut self, query: &Query, column: &str, amount: i64) -> Result<usize> {
        let amount = amount
            .checked_neg()
            .ok_or_else(|| Error::InvalidInput(format!("cannot decrement by {amount}")))?;
        self.increment(query, column, amount)
    }
}

#[derive(Debug, Clone)]
struct Row<R> {
    record: R,
    deleted: bool,
}

/// A collection of records in insertion order.
#[derive(Debug, Clone)]
pub struct Collection<R = Record> {
    rows: Vec<Row<R>>,
    soft_deletes: bool,
}

impl<R: Sortable> Collection<R> {
    /// Create an empty collection.
    pub fn new(soft_deletes: bool) -> Self {
        Self {
            rows: Vec::new(),
            soft_deletes,
        }
    }

    /// Whether deleting a record only marks it as trashed.
    pub fn soft_deletes(&self) -> bool {
        self.soft_deletes
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| compare_values(&row.record.key(), key) == Ordering::Equal)
    }

    /// Get a live record by key.
    pub fn get(&self, key: &Value) -> Option<&R> {
        self.position(key)
            .map(|i| &self.rows[i])
            .filter(|row| !row.deleted)
            .map(|row| &row.record)
    }

    /// Get a record by key, including trashed ones.
    pub fn get_including_trashed(&self, key: &Value) -> Option<&R> {
        self.position(key).map(|i| &self.rows[i].record)
    }

    /// Whether the record with this key is soft-deleted.
    pub fn is_trashed(&self, key: &Value) -> bool {
        self.position(key).is_some_and(|i| self.rows[i].deleted)
    }

    /// Records in insertion order, each paired with its trashed flag.
    pub fn rows(&self) -> impl Iterator<Item = (&R, bool)> {
        self.rows.iter().map(|row| (&row.record, row.deleted))
    }

    /// Count of live records.
    pub fn len(&self) -> usize {
        self.rows.iter().filter(|row| !row.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory record store.
#[derive(Debug, Clone)]
pub struct MemoryStore<R = Record> {
    collections: HashMap<CollectionName, Collection<R>>,
}

impl<R: Sortable> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sortable> MemoryStore<R> {
    /// Create a store with no collections.
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }

    /// Add a collection that deletes records for good.
    pub fn with_collection(mut self, name: impl Into<CollectionName>) -> Self {
        self.collections.insert(name.into(), Collection::new(false));
        self
    }

    /// Add a collection that only marks deleted records as trashed.
    pub fn with_soft_deletes(mut self, name: impl Into<CollectionName>) -> Self {
        self.collections.insert(name.into(), Collection::new(true));
        self
    }

    /// Get a collection by name.
    pub fn collection(&self, name: &str) -> Option<&Collection<R>> {
        self.collections.get(name)
    }

    /// Names of all collections.
    pub fn collection_names(&self) -> impl Iterator<Item = &CollectionName> {
        self.collections.keys()
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection<R>> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Get a live record by key.
    pub fn get(&self, collection: &str, key: &Value) -> Option<&R> {
        self.collections.get(collection)?.get(key)
    }

    /// Get a record by key, including trashed ones.
    pub fn get_including_trashed(&self, collection: &str, key: &Value) -> Option<&R> {
        self.collections.get(collection)?.get_including_trashed(key)
    }

    /// Bring a soft-deleted record back.
    pub fn restore(&mut self, collection: &str, key: &Value) -> Result<()> {
        let collection = self.collection_mut(collection)?;
        let index = collection
            .position(key)
            .ok_or_else(|| Error::RecordNotFound(key.to_string()))?;
        collection.rows[index].deleted = false;
        Ok(())
    }

    /// Put a record into a collection as-is, marked clean. Used to seed fixtures.
    pub(crate) fn load(&mut self, collection: &str, mut record: R, deleted: bool) -> Result<()> {
        let collection = self.collection_mut(collection)?;
        if collection.position(&record.key()).is_some() {
            return Err(Error::Store(format!("duplicate key: {}", record.key())));
        }
        record.sync_original();
        collection.rows.push(Row { record, deleted });
        Ok(())
    }

    fn matching_rows<'a>(
        collection: &'a mut Collection<R>,
        query: &'a Query,
    ) -> impl Iterator<Item = &'a mut Row<R>> + 'a {
        collection
            .rows
            .iter_mut()
            .filter(move |row| (query.with_trashed || !row.deleted) && query.matches(&row.record))
    }
}

impl<R: Sortable> RecordStore for MemoryStore<R> {
    type Record = R;

    fn fetch(&self, query: &Query) -> Result<Vec<R>> {
        let collection = self
            .collections
            .get(&query.collection)
            .ok_or_else(|| Error::CollectionNotFound(query.collection.clone()))?;

        let mut records: Vec<R> = collection
            .rows
            .iter()
            .filter(|row| (query.with_trashed || !row.deleted) && query.matches(&row.record))
            .map(|row| row.record.clone())
            .collect();

        // Stable: insertion order breaks ties
        records.sort_by(|a, b| query.compare(a, b));

        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    fn update(&mut self, query: &Query, values: &[(String, Value)]) -> Result<usize> {
        let collection = self.collection_mut(&query.collection)?;
        let mut touched = 0;
        for row in Self::matching_rows(collection, query) {
            for (column, value) in values {
                row.record.set_attribute(column, value.clone());
            }
            row.record.sync_original();
            touched += 1;
        }
        Ok(touched)
    }

    fn increment(&mut self, query: &Query, column: &str, amount: i64) -> Result<usize> {
        let collection = self.collection_mut(&query.collection)?;

        // Compute every new value first so an overflow writes nothing
        let rows = Self::matching_rows(collection, query)
            .map(|row| {
                let current = row
                    .record
                    .attribute(column)
                    .as_ref()
                    .and_then(as_order)
                    .unwrap_or(0);
                let next = current.checked_add(amount).ok_or_else(|| {
                    Error::InvalidInput(format!("{column} overflows: {current} + {amount}"))
                })?;
                Ok((row, next))
            })
            .collect::<Result<Vec<_>>>()?;

        let touched = rows.len();
        for (row, next) in rows {
            row.record.set_attribute(column, Value::from(next));
            row.record.sync_original();
        }
        Ok(touched)
    }

    fn insert(&mut self, collection: &str, record: &mut R) -> Result<()> {
        if record.key().is_null() {
            return Err(Error::InvalidInput("record has no primary key".into()));
        }
        self.load(collection, record.clone(), false)?;
        record.sync_original();
        Ok(())
    }

    fn save_quietly(&mut self, collection: &str, record: &mut R) -> Result<()> {
        let key = record.key();
        let target = self.collection_mut(collection)?;
        let Some(index) = target.position(&key) else {
            return self.insert(collection, record);
        };

        // Only dirty attributes are written, like a partial UPDATE
        let stored = &mut target.rows[index].record;
        for name in record.dirty_attributes() {
            if let Some(value) = record.attribute(&name) {
                stored.set_attribute(&name, value);
            }
        }
        stored.sync_original();
        record.sync_original();
        Ok(())
    }

    fn delete(&mut self, collection: &str, record: &R) -> Result<()> {
        let key = record.key();
        let target = self.collection_mut(collection)?;
        let index = target
            .position(&key)
            .ok_or_else(|| Error::RecordNotFound(key.to_string()))?;

        if target.soft_deletes {
            target.rows[index].deleted = true;
        } else {
            target.rows.remove(index);
        }
        Ok(())
    }
}
