//! Lifecycle hooks.
//!
//! The host application calls [`Sorter::creating`], [`Sorter::updating`] and
//! [`Sorter::deleting`] right before it persists the matching mutation, or
//! uses [`Sorter::create`], [`Sorter::save`] and [`Sorter::delete`] which run
//! the hook and then write through the store.

use crate::{error::Result, RecordStore, Sorter, Sortable};
use serde::{Deserialize, Serialize};

/// What an update does to the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateAction {
    /// Nothing relevant changed, or update sorting is off
    None,
    /// Only the order column changed: splice within the group
    Move,
    /// Only group attributes changed: close the old gap, append to the new group
    Regroup,
    /// Both changed: splice into the new group, then close the old gap
    MoveAndRegroup,
}

impl Sorter {
    /// Decide how an update of this record affects ordering.
    pub fn decide_update<R: Sortable>(&self, record: &R) -> UpdateAction {
        if !self.settings_for(record).sort_when_updating {
            return UpdateAction::None;
        }
        match (
            self.has_changed_order_column(record),
            self.has_changed_group_attributes(record),
        ) {
            (true, true) => UpdateAction::MoveAndRegroup,
            (true, false) => UpdateAction::Move,
            (false, true) => UpdateAction::Regroup,
            (false, false) => UpdateAction::None,
        }
    }

    /// Hook for a record about to be inserted.
    pub fn creating<S: RecordStore>(&self, store: &S, record: &mut S::Record) -> Result<()> {
        if self.settings_for(record).sort_when_creating {
            self.set_highest_order_number(store, record)?;
            tracing::debug!(
                collection = self.collection(),
                order = ?self.order_value(record),
                "sorted on create"
            );
        }
        Ok(())
    }

    /// Hook for a loaded record about to be saved with changes.
    pub fn updating<S: RecordStore>(
        &self,
        store: &mut S,
        record: &mut S::Record,
    ) -> Result<UpdateAction> {
        let action = self.decide_update(record);
        tracing::debug!(collection = self.collection(), ?action, "sorting on update");

        match action {
            UpdateAction::MoveAndRegroup => {
                self.move_to_new_position(store, record)?;
                self.repair_order(store, record, true, false)?;
            }
            UpdateAction::Move => self.move_to_new_position(store, record)?,
            UpdateAction::Regroup => self.repair_order(store, record, true, true)?,
            UpdateAction::None => {}
        }
        Ok(action)
    }

    /// Hook for a record about to be deleted: the rest of its group is renumbered
    /// without it, closing the gap it leaves.
    ///
    /// The record itself then takes the slot after its former siblings. A
    /// soft-deleted row stays in every group query, so it must not share a
    /// number with a live one, and restoring it appends it to the group.
    pub fn deleting<S: RecordStore>(&self, store: &mut S, record: &mut S::Record) -> Result<()> {
        let settings = self.settings_for(record);
        if !settings.sort_when_deleting {
            return Ok(());
        }

        tracing::debug!(collection = self.collection(), "sorting on delete");
        self.repair_order(store, record, true, false)?;

        let siblings = self
            .build_sort_query(record, true)
            .filter_ne(record.key_name(), record.key());
        let parked = self.next_order_number(store, &siblings, record)?;
        self.assign_order(
            store,
            record.key_name(),
            &settings.order_column_name,
            &[record.key()],
            parked,
        )?;
        self.set_order_value(record, parked);
        Ok(())
    }

    /// Run the create hook, then insert.
    pub fn create<S: RecordStore>(&self, store: &mut S, record: &mut S::Record) -> Result<()> {
        self.creating(store, record)?;
        store.insert(self.collection(), record)
    }

    /// Run the update hook, then save. Records that were never loaded are created.
    pub fn save<S: RecordStore>(&self, store: &mut S, record: &mut S::Record) -> Result<()> {
        if record.original(record.key_name()).is_none() {
            return self.create(store, record);
        }
        self.updating(store, record)?;
        store.save_quietly(self.collection(), record)
    }

    /// Run the delete hook, then delete.
    pub fn delete<S: RecordStore>(&self, store: &mut S, record: &mut S::Record) -> Result<()> {
        self.deleting(store, record)?;
        store.delete(self.collection(), record)
    }
}
