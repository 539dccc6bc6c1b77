//! The correspondence table of a lock group.
//!
//! All reshaping operations consume the table and return a new one, so a
//! failed operation leaves the caller's table untouched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::info::{HandleLockInfo, LockPolicy, is_blank};
use crate::error::{LockError, LockResult};
use crate::state::{HandleState, RavelState};

/// Ordered lock rows, each with one name slot per ravel of the group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockTable {
    rows: Vec<HandleLockInfo>,
}

impl LockTable {
    /// Create an empty table (every handle locked).
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing rows without validating them.
    pub fn from_rows(rows: Vec<HandleLockInfo>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[HandleLockInfo] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut HandleLockInfo> {
        self.rows.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Build a table from scratch: one row per requested handle, with each
    /// ravel's slot filled iff that ravel has a handle of that name.
    ///
    /// `peer_handles` holds the handle names of each slot; dead ravels pass
    /// an empty list.
    pub fn from_lock_handles<S: AsRef<str>>(
        handles: &[S],
        peer_handles: &[Vec<String>],
        policy: LockPolicy,
    ) -> Self {
        let peer_sets: Vec<HashSet<&str>> = peer_handles
            .iter()
            .map(|names| names.iter().map(String::as_str).collect())
            .collect();

        let rows = handles
            .iter()
            .map(|h| {
                let h = h.as_ref();
                let names = peer_sets
                    .iter()
                    .map(|set| if set.contains(h) { h.to_string() } else { String::new() });
                HandleLockInfo::from_names(names, policy)
            })
            .collect();
        Self { rows }
    }

    /// Append a slot for a new ravel and map its handles.
    ///
    /// `slot` is the new ravel's index (the previous ravel count). A handle
    /// whose name already appears in a row joins that row; each row takes at
    /// most one of the new ravel's handles. Unmatched handles get fresh rows
    /// using `policy`.
    pub fn with_slot(mut self, slot: usize, names: &[String], policy: LockPolicy) -> LockResult<Self> {
        let mut candidates: HashSet<&str> = HashSet::new();
        for name in names {
            if !candidates.insert(name.as_str()) {
                return Err(LockError::AmbiguousHandles(name.clone()));
            }
        }
        candidates.retain(|n| !is_blank(n));

        for row in &mut self.rows {
            row.handle_names.resize(slot + 1, String::new());
            let claimed = row.handle_names[..slot]
                .iter()
                .find(|n| !is_blank(n) && candidates.contains(n.as_str()))
                .cloned();
            if let Some(name) = claimed {
                candidates.remove(name.as_str());
                row.handle_names[slot] = name;
            }
        }

        for name in names.iter().filter(|n| candidates.contains(n.as_str())) {
            let mut row = HandleLockInfo::new(slot + 1, policy);
            row.handle_names[slot] = name.clone();
            self.rows.push(row);
        }
        Ok(self)
    }

    /// Drop the slot of a departing ravel, shifting later slots down.
    pub fn without_slot(mut self, slot: usize) -> Self {
        for row in &mut self.rows {
            if slot < row.handle_names.len() {
                row.handle_names.remove(slot);
            }
        }
        self
    }

    /// Check the table against a group of `slots` ravels.
    pub fn validate(&self, slots: usize) -> LockResult<()> {
        let mut columns: Vec<HashSet<&str>> = vec![HashSet::new(); slots];
        for (line, row) in self.rows.iter().enumerate() {
            if row.handle_names.len() != slots {
                return Err(LockError::InsufficientData {
                    line: line + 1,
                    expected: slots,
                    found: row.handle_names.len(),
                });
            }
            for (column, name) in columns.iter_mut().zip(&row.handle_names) {
                if is_blank(name) {
                    continue;
                }
                if !column.insert(name.as_str()) {
                    return Err(LockError::DuplicateHandle(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Resolve, row by row, the handle states of the ravel at `slot`.
    ///
    /// Rows whose name is blank or missing from `state` resolve to `None`.
    /// Two rows resolving to the same handle is an error.
    pub fn resolve<'a>(
        &self,
        slot: usize,
        state: &'a RavelState,
    ) -> LockResult<Vec<Option<&'a HandleState>>> {
        let mut seen: HashSet<&'a str> = HashSet::new();
        self.rows
            .iter()
            .map(|row| match row.name(slot).and_then(|n| state.handle(n)) {
                Some(hs) if !seen.insert(hs.description.as_str()) => {
                    Err(LockError::MultipleLocks(hs.description.clone()))
                }
                found => Ok(found),
            })
            .collect()
    }
}
