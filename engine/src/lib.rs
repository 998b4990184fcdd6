//! # Autosort Engine
//!
//! Dense, gapless sort order for records kept in any data store.
//!
//! Records carry an integer order column. Records sharing the same values
//! for a configured set of group attributes form a group, and within each
//! group the order values always read `start_order, start_order + 1, ...`
//! with no gaps and no duplicates.
//!
//! ## Design Principles
//!
//! - **Store agnostic**: the engine speaks to persistence only through the
//!   [`RecordStore`] trait and plain [`Query`] values
//! - **Explicit hooks**: create/update/delete sorting runs when the
//!   application calls the hooks, never behind its back
//! - **Explicit config**: settings come from a [`Config`] value, resolved per
//!   call as record override, then collection override, then defaults
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! Anything implementing [`Sortable`]: a primary key, readable and writable
//! attributes, and dirty/original tracking. [`Record`] is a ready-made
//! schemaless implementation.
//!
//! ### Groups
//!
//! [`Sorter::build_sort_query`] filters the collection on the record's group
//! attributes, using either its current or its original values. Soft-deleted
//! records are always part of the group.
//!
//! ### Renumbering
//!
//! - [`Sorter::set_new_order`] - Assign consecutive values to a list of keys
//! - [`Sorter::repair_order`] - Close the gap in the old group, append to the new one
//! - [`Sorter::move_to_position`] - Splice a record into a new slot
//! - [`Sorter::swap_order_with_model`] - Exchange two order values
//!
//! ### Lifecycle
//!
//! [`Sorter::creating`], [`Sorter::updating`] and [`Sorter::deleting`] keep
//! groups dense as records are created, moved between groups and deleted.
//!
//! ## Quick Start
//!
//! ```rust
//! use autosort_engine::{Config, Direction, MemoryStore, Record, RecordStore, Sorter};
//! use serde_json::json;
//!
//! // 1. Configure and create a sorter
//! let sorter = Sorter::new("tasks", Config::new());
//! let mut store: MemoryStore = MemoryStore::new().with_collection("tasks");
//!
//! // 2. Create records; each gets the next order value
//! for id in ["a", "b", "c"] {
//!     sorter.create(&mut store, &mut Record::new(id)).unwrap();
//! }
//!
//! // 3. Move "c" to the front
//! let mut c = store.get("tasks", &json!("c")).unwrap().clone();
//! sorter.move_to_position(&mut store, &mut c, 1).unwrap();
//!
//! // 4. Read back in order
//! let keys: Vec<_> = store
//!     .fetch(&sorter.ordered(Direction::Asc))
//!     .unwrap()
//!     .into_iter()
//!     .map(|r| r.attributes()["id"].clone())
//!     .collect();
//! assert_eq!(keys, vec![json!("c"), json!("a"), json!("b")]);
//! ```
//!
//! ## Concurrency
//!
//! Renumbering is a sequence of reads and keyed writes with no locking of its
//! own. Run it inside a store transaction when other processes may touch the
//! same group.

pub mod column;
pub mod config;
pub mod error;
pub mod group;
pub mod lifecycle;
pub mod position;
pub mod query;
pub mod record;
pub mod renumber;
pub mod snapshot;
pub mod sorter;
pub mod store;

// Re-export main types at crate root
pub use config::{Config, Settings, SettingsOverride, DEFAULT_ORDER_COLUMN};
pub use error::Error;
pub use lifecycle::UpdateAction;
pub use query::{compare_values, Comparison, Condition, Direction, Query};
pub use record::{Record, Sortable, DEFAULT_KEY_NAME};
pub use snapshot::{CollectionSnapshot, SnapshotRow, StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use sorter::Sorter;
pub use store::{as_order, Collection, MemoryStore, RecordStore};

/// Type aliases for clarity
pub type CollectionName = String;
