//! Custom record types and store adapters.

use autosort_engine::error::Result;
use autosort_engine::{
    Config, Direction, Error, MemoryStore, Query, Record, RecordStore, SettingsOverride, Sortable,
    Sorter,
};
use serde_json::{json, Value};

// ============================================================================
// Typed record
// ============================================================================

/// A kanban card with typed fields instead of a JSON attribute map.
#[derive(Debug, Clone, PartialEq)]
struct Card {
    id: u32,
    lane: String,
    position: i64,
    loaded: Option<(String, i64)>,
}

impl Card {
    fn new(id: u32, lane: &str) -> Self {
        Self {
            id,
            lane: lane.to_string(),
            position: 0,
            loaded: None,
        }
    }
}

impl Sortable for Card {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(json!(self.id)),
            "lane" => Some(json!(self.lane)),
            "position" => Some(json!(self.position)),
            _ => None,
        }
    }

    fn original(&self, name: &str) -> Option<Value> {
        let (lane, position) = self.loaded.as_ref()?;
        match name {
            "id" => Some(json!(self.id)),
            "lane" => Some(json!(lane)),
            "position" => Some(json!(position)),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        match name {
            "lane" => {
                if let Some(lane) = value.as_str() {
                    self.lane = lane.to_string();
                }
            }
            "position" => {
                if let Some(position) = value.as_i64() {
                    self.position = position;
                }
            }
            _ => {}
        }
    }

    fn dirty_attributes(&self) -> Vec<String> {
        match &self.loaded {
            None => vec!["id".into(), "lane".into(), "position".into()],
            Some((lane, position)) => {
                let mut dirty = Vec::new();
                if *lane != self.lane {
                    dirty.push("lane".into());
                }
                if *position != self.position {
                    dirty.push("position".into());
                }
                dirty
            }
        }
    }

    fn sync_original(&mut self) {
        self.loaded = Some((self.lane.clone(), self.position));
    }
}

fn card_sorter() -> Sorter {
    let layer = SettingsOverride {
        order_column_name: Some("position".into()),
        groups: Some(vec!["lane".into()]),
        ..Default::default()
    };
    Sorter::new("cards", Config::new().with_type("cards", layer))
}

fn lane(store: &MemoryStore<Card>, name: &str) -> Vec<(u32, i64)> {
    let query = Query::new("cards")
        .filter_eq("lane", name)
        .order_by("position", Direction::Asc);
    store
        .fetch(&query)
        .unwrap()
        .into_iter()
        .map(|c| (c.id, c.position))
        .collect()
}

#[test]
fn typed_records_are_sorted_per_lane() {
    let sorter = card_sorter();
    let mut store: MemoryStore<Card> = MemoryStore::new().with_collection("cards");

    for (id, name) in [(1, "todo"), (2, "todo"), (3, "done"), (4, "todo")] {
        sorter.create(&mut store, &mut Card::new(id, name)).unwrap();
    }
    assert_eq!(lane(&store, "todo"), vec![(1, 1), (2, 2), (4, 3)]);
    assert_eq!(lane(&store, "done"), vec![(3, 1)]);

    // Drag card 2 into "done" at the top
    let mut card = store.get("cards", &json!(2)).unwrap().clone();
    card.lane = "done".into();
    card.position = 1;
    sorter.save(&mut store, &mut card).unwrap();

    assert_eq!(lane(&store, "todo"), vec![(1, 1), (4, 2)]);
    assert_eq!(lane(&store, "done"), vec![(2, 1), (3, 2)]);
}

// ============================================================================
// Failing store
// ============================================================================

/// Wraps a memory store and fails every write after a budget is spent.
struct FlakyStore {
    inner: MemoryStore,
    writes_left: usize,
}

impl FlakyStore {
    fn spend(&mut self) -> Result<()> {
        if self.writes_left == 0 {
            return Err(Error::store("connection lost"));
        }
        self.writes_left -= 1;
        Ok(())
    }
}

impl RecordStore for FlakyStore {
    type Record = Record;

    fn fetch(&self, query: &Query) -> Result<Vec<Record>> {
        self.inner.fetch(query)
    }

    fn update(&mut self, query: &Query, values: &[(String, Value)]) -> Result<usize> {
        self.spend()?;
        self.inner.update(query, values)
    }

    fn increment(&mut self, query: &Query, column: &str, amount: i64) -> Result<usize> {
        self.spend()?;
        self.inner.increment(query, column, amount)
    }

    fn insert(&mut self, collection: &str, record: &mut Record) -> Result<()> {
        self.inner.insert(collection, record)
    }

    fn save_quietly(&mut self, collection: &str, record: &mut Record) -> Result<()> {
        self.spend()?;
        self.inner.save_quietly(collection, record)
    }

    fn delete(&mut self, collection: &str, record: &Record) -> Result<()> {
        self.inner.delete(collection, record)
    }
}

fn flaky(ids: &[&str], writes_left: usize) -> FlakyStore {
    let sorter = Sorter::new("tasks", Config::new());
    let mut inner: MemoryStore = MemoryStore::new().with_collection("tasks");
    for id in ids {
        sorter.create(&mut inner, &mut Record::new(*id)).unwrap();
    }
    FlakyStore { inner, writes_left }
}

#[test]
fn store_failure_propagates_mid_renumber() {
    let sorter = Sorter::new("tasks", Config::new());
    let mut store = flaky(&["a", "b", "c", "d"], 2);

    let result = sorter.set_new_order(&mut store, ["d", "c", "b", "a"], 1);
    assert!(matches!(result, Err(Error::Store(_))));

    // The first two writes landed; the group is left for the caller to repair
    let order = |id: &str| {
        store
            .inner
            .get("tasks", &json!(id))
            .unwrap()
            .get_i64("order_column")
    };
    assert_eq!(order("d"), Some(1));
    assert_eq!(order("c"), Some(2));
    assert_eq!(order("b"), Some(2));
    assert_eq!(order("a"), Some(1));
}

#[test]
fn repair_after_failure_restores_density() {
    let sorter = Sorter::new("tasks", Config::new());
    let mut store = flaky(&["a", "b", "c"], 0);

    let mut a = store.inner.get("tasks", &json!("a")).unwrap().clone();
    assert!(sorter.move_to_end(&mut store, &mut a).is_err());

    store.writes_left = usize::MAX;
    sorter.set_new_order(&mut store, ["b", "c", "a"], 1).unwrap();

    let keys: Vec<_> = store
        .fetch(&sorter.ordered(Direction::Asc))
        .unwrap()
        .iter()
        .map(|r| r.key())
        .collect();
    assert_eq!(keys, vec![json!("b"), json!("c"), json!("a")]);
}

#[test]
fn swap_failure_surfaces() {
    let sorter = Sorter::new("tasks", Config::new());
    let mut store = flaky(&["a", "b"], 1);

    let mut a = store.inner.get("tasks", &json!("a")).unwrap().clone();
    let mut b = store.inner.get("tasks", &json!("b")).unwrap().clone();

    let result = sorter.swap_order(&mut store, &mut a, &mut b);
    assert_eq!(result, Err(Error::Store("connection lost".into())));
}
