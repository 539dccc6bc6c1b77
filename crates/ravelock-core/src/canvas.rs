//! Canvas document: the ravels on a canvas and the lock groups linking them.
//!
//! The document owns both the registry of live ravels and the table of lock
//! groups. Groups refer to ravels by id and ravels to groups by id; a group
//! stays in the table only while some ravel claims membership of it.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LockError, LockResult};
use crate::lock::{GroupId, HandleLockInfo, LockPeer, LockPolicy, LockTable, RavelLockGroup};
use crate::ravel::{Ravel, RavelId};
use crate::state_lock::{StateLock, StateLockId};

/// A canvas document containing ravels, lock groups and state locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All ravels in the document, keyed by ID.
    pub ravels: HashMap<RavelId, Ravel>,
    /// Z-order of ravels (back to front).
    pub z_order: Vec<RavelId>,
    /// Lock groups, keyed by ID.
    #[serde(default)]
    pub lock_groups: HashMap<GroupId, RavelLockGroup>,
    #[serde(default)]
    pub state_locks: HashMap<StateLockId, StateLock>,
    /// Policy for lock rows created in new groups.
    #[serde(default)]
    pub default_policy: LockPolicy,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            ravels: HashMap::new(),
            z_order: Vec::new(),
            lock_groups: HashMap::new(),
            state_locks: HashMap::new(),
            default_policy: LockPolicy::default(),
        }
    }

    /// Add a ravel to the document.
    pub fn add_ravel(&mut self, ravel: Ravel) -> RavelId {
        let id = ravel.id();
        self.z_order.push(id);
        self.ravels.insert(id, ravel);
        id
    }

    /// Remove a ravel, taking it out of its lock group first.
    pub fn remove_ravel(&mut self, id: RavelId) -> Option<Ravel> {
        self.leave_lock_group(id);
        self.z_order.retain(|&ravel_id| ravel_id != id);
        self.ravels.remove(&id)
    }

    /// Get a ravel by ID.
    pub fn ravel(&self, id: RavelId) -> Option<&Ravel> {
        self.ravels.get(&id)
    }

    /// Ravels in z-order (back to front).
    pub fn ravels_ordered(&self) -> impl Iterator<Item = &Ravel> {
        self.z_order.iter().filter_map(|id| self.ravels.get(id))
    }

    /// Get a lock group by ID.
    pub fn lock_group(&self, id: GroupId) -> Option<&RavelLockGroup> {
        self.lock_groups.get(&id)
    }

    /// The group a ravel belongs to.
    pub fn lock_group_of(&self, ravel: RavelId) -> Option<&RavelLockGroup> {
        self.ravels
            .get(&ravel)
            .and_then(|r| r.lock_group())
            .and_then(|g| self.lock_groups.get(&g))
    }

    fn group_mut(&mut self, id: GroupId) -> LockResult<&mut RavelLockGroup> {
        self.lock_groups.get_mut(&id).ok_or(LockError::UnknownGroup(id))
    }

    /// Link ravels into a new lock group.
    ///
    /// Each ravel leaves any group it was in. Handles are matched by name,
    /// and the first ravel's state is then broadcast to the others.
    pub fn lock_ravels(&mut self, ids: &[RavelId]) -> LockResult<GroupId> {
        let mut members: Vec<RavelId> = Vec::new();
        for &id in ids {
            if self.ravels.contains_key(&id) && !members.contains(&id) {
                members.push(id);
            }
        }
        if members.len() < 2 {
            return Err(LockError::TooFewRavels);
        }

        // check every ravel can be mapped before touching existing groups
        let mut table = LockTable::new();
        for (slot, id) in members.iter().enumerate() {
            let names = self.ravels[id].handle_names();
            table = table.with_slot(slot, &names, self.default_policy)?;
        }

        for &id in &members {
            self.leave_lock_group(id);
        }
        let mut group = RavelLockGroup::with_policy(self.default_policy);
        for &id in &members {
            group.add_ravel(&mut self.ravels, id)?;
        }
        let group_id = group.id();
        group.initial_broadcast(&mut self.ravels)?;
        self.lock_groups.insert(group_id, group);
        debug!("locked {} ravels into group {}", members.len(), group_id);
        Ok(group_id)
    }

    /// Add one ravel to an existing group.
    pub fn join_lock_group(&mut self, group: GroupId, ravel: RavelId) -> LockResult<()> {
        if !self.lock_groups.contains_key(&group) {
            return Err(LockError::UnknownGroup(group));
        }
        let current = self
            .ravels
            .get(&ravel)
            .ok_or(LockError::UnknownRavel(ravel))?
            .lock_group();
        if current == Some(group) {
            return Ok(());
        }

        // fail on ambiguous names before leaving the current group
        LockTable::new().with_slot(0, &self.ravels[&ravel].handle_names(), self.default_policy)?;
        self.leave_lock_group(ravel);
        let lock_group = self.lock_groups.get_mut(&group).ok_or(LockError::UnknownGroup(group))?;
        lock_group.add_ravel(&mut self.ravels, ravel)
    }

    /// Take a ravel out of its lock group. Returns false if it was not in
    /// one.
    pub fn leave_lock_group(&mut self, ravel: RavelId) -> bool {
        let Some(group_id) = self.ravels.get(&ravel).and_then(|r| r.lock_group()) else {
            return false;
        };
        if let Some(group) = self.lock_groups.get_mut(&group_id) {
            group.remove_from_group(&mut self.ravels, ravel);
        }
        if let Some(r) = self.ravels.get_mut(&ravel) {
            r.set_lock_group(None);
        }
        self.prune_lock_group(group_id);
        true
    }

    /// Drop a group nobody claims membership of any more.
    fn prune_lock_group(&mut self, group: GroupId) {
        let claimed = self.ravels.values().any(|r| r.lock_group() == Some(group));
        if !claimed && self.lock_groups.remove(&group).is_some() {
            debug!("dropped lock group {}", group);
        }
    }

    /// Propagate a ravel's state to the rest of its lock group.
    ///
    /// A ravel outside any group, or pointing at a group that no longer
    /// exists, is left alone.
    pub fn broadcast_state_to_lock_group(&mut self, ravel: RavelId) -> LockResult<()> {
        let Some(group_id) = self.ravels.get(&ravel).and_then(|r| r.lock_group()) else {
            return Ok(());
        };
        match self.lock_groups.get(&group_id) {
            Some(group) => group.broadcast(&mut self.ravels, ravel),
            None => {
                debug!("ravel {} refers to missing lock group {}", ravel, group_id);
                Ok(())
            }
        }
    }

    /// Edit a ravel locally and then broadcast its new state.
    pub fn edit_ravel<T>(
        &mut self,
        id: RavelId,
        edit: impl FnOnce(&mut Ravel) -> LockResult<T>,
    ) -> LockResult<T> {
        let ravel = self.ravels.get_mut(&id).ok_or(LockError::UnknownRavel(id))?;
        let result = edit(ravel)?;
        self.broadcast_state_to_lock_group(id)?;
        Ok(result)
    }

    /// Step a ravel's slicer and broadcast.
    pub fn adjust_slicer(&mut self, id: RavelId, handle: &str, n: i64) -> LockResult<()> {
        self.edit_ravel(id, |r| r.adjust_slicer(handle, n))
    }

    /// Sorted union of the handle names in a group.
    pub fn all_lock_handles(&self, group: GroupId) -> LockResult<Vec<String>> {
        let group = self.lock_group(group).ok_or(LockError::UnknownGroup(group))?;
        Ok(group.all_lock_handles(&self.ravels))
    }

    /// Display labels of a group's ravels.
    pub fn ravel_names(&self, group: GroupId) -> LockResult<Vec<String>> {
        let group = self.lock_group(group).ok_or(LockError::UnknownGroup(group))?;
        Ok(group.ravel_names(&self.ravels))
    }

    /// Rebuild a group's lock rows from a list of handle names.
    pub fn set_lock_handles<S: AsRef<str>>(&mut self, group: GroupId, handles: &[S]) -> LockResult<()> {
        let group = self.lock_groups.get_mut(&group).ok_or(LockError::UnknownGroup(group))?;
        group.set_lock_handles(&self.ravels, handles);
        Ok(())
    }

    /// Install edited lock rows on a group.
    pub fn set_lock_info(&mut self, group: GroupId, rows: Vec<HandleLockInfo>) -> LockResult<()> {
        self.group_mut(group)?.set_lock_info(rows)
    }

    /// Change which fields one of a group's rows propagates.
    pub fn set_row_policy(&mut self, group: GroupId, row: usize, policy: LockPolicy) -> LockResult<()> {
        self.group_mut(group)?.set_row_policy(row, policy)
    }

    /// Change the policy given to rows a group creates from now on.
    pub fn set_group_policy(&mut self, group: GroupId, policy: LockPolicy) -> LockResult<()> {
        self.group_mut(group)?.set_default_policy(policy);
        Ok(())
    }

    /// Add a state lock, optionally wired to a ravel.
    pub fn add_state_lock(&mut self, ravel: Option<RavelId>) -> StateLockId {
        let lock = StateLock::new(ravel);
        let id = lock.id();
        self.state_locks.insert(id, lock);
        id
    }

    /// Toggle a state lock. Returns whether it is now locked.
    pub fn toggle_state_lock(&mut self, id: StateLockId) -> LockResult<bool> {
        let lock = self.state_locks.get_mut(&id).ok_or(LockError::Unconnected)?;
        lock.toggle_locked(&self.ravels)
    }

    /// Reapply a state lock's snapshot to its ravel and broadcast it.
    pub fn restore_state_lock(&mut self, id: StateLockId) -> LockResult<bool> {
        let lock = self.state_locks.get(&id).ok_or(LockError::Unconnected)?;
        let target = lock.ravel;
        if !lock.restore(&mut self.ravels)? {
            return Ok(false);
        }
        if let Some(ravel) = target {
            self.broadcast_state_to_lock_group(ravel)?;
        }
        Ok(true)
    }

    /// Check every group's lock rows.
    pub fn validate(&self) -> LockResult<()> {
        self.lock_groups
            .values()
            .try_for_each(RavelLockGroup::validate_lock_handle_info)
    }

    /// Check if the document has no ravels.
    pub fn is_empty(&self) -> bool {
        self.ravels.is_empty()
    }

    /// Get the number of ravels.
    pub fn len(&self) -> usize {
        self.ravels.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    ///
    /// Inconsistent lock rows are reported but kept, so they can be repaired
    /// through [`CanvasDocument::set_lock_info`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: Self = serde_json::from_str(json)?;
        for group in doc.lock_groups.values() {
            if let Err(e) = group.validate_lock_handle_info() {
                warn!("lock group {} in document {}: {}", group.id(), doc.id, e);
            }
        }
        Ok(doc)
    }
}
