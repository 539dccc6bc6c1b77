//! Lock groups: linked ravels sharing handle state.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::info::{HandleLockInfo, LockPolicy};
use super::palette::palette_colour;
use super::peer::{LockPeer, RavelRegistry};
use super::table::LockTable;
use crate::error::{LockError, LockResult};
use crate::ravel::RavelId;
use crate::state::{HandleState, RavelState};

/// Unique identifier for a lock group.
pub type GroupId = Uuid;

/// Colour index handed to the next group, shared by all groups.
static NEXT_COLOUR: AtomicUsize = AtomicUsize::new(1);

/// What [`RavelLockGroup::remove_from_group`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The ravel was not a live member; nothing changed.
    NotMember,
    /// The ravel's slot was removed.
    Removed,
    /// The ravel was removed and at most one member is left, which has been
    /// detached from the group.
    Dissolved,
}

/// A set of ravels whose handles are kept in step.
///
/// The group refers to its ravels by id only and looks them up in a
/// [`RavelRegistry`] for every operation, so ravels deleted behind its back
/// are simply skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RavelLockGroup {
    id: GroupId,
    /// Member ravels; slot `i` of every lock row belongs to `ravels[i]`.
    ravels: Vec<RavelId>,
    #[serde(default)]
    lock_info: LockTable,
    /// Policy given to rows created by adding ravels or setting handles.
    #[serde(default)]
    default_policy: LockPolicy,
    colour: usize,
}

impl Default for RavelLockGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl RavelLockGroup {
    /// Create an empty group that locks every field of new rows.
    pub fn new() -> Self {
        Self::with_policy(LockPolicy::default())
    }

    /// Create an empty group whose new rows use `policy`.
    pub fn with_policy(policy: LockPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            ravels: Vec::new(),
            lock_info: LockTable::new(),
            default_policy: policy,
            colour: NEXT_COLOUR.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Colour index of this group.
    pub fn colour(&self) -> usize {
        self.colour
    }

    /// Border colour of this group's ravels.
    pub fn palette_colour(&self) -> Color {
        palette_colour(self.colour)
    }

    /// Member ravels in slot order, live or not.
    pub fn ravels(&self) -> &[RavelId] {
        &self.ravels
    }

    pub fn lock_info(&self) -> &LockTable {
        &self.lock_info
    }

    pub fn default_policy(&self) -> LockPolicy {
        self.default_policy
    }

    pub fn set_default_policy(&mut self, policy: LockPolicy) {
        self.default_policy = policy;
    }

    pub fn len(&self) -> usize {
        self.ravels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ravels.is_empty()
    }

    /// Slot of a live member.
    fn live_slot<R: RavelRegistry>(&self, registry: &R, id: RavelId) -> Option<usize> {
        self.ravels
            .iter()
            .position(|&r| r == id && registry.is_live(r))
    }

    /// Add a ravel, mapping its handles onto existing rows by name and
    /// creating rows for the rest.
    ///
    /// On success the ravel is marked as a member of this group. Fails
    /// without changing anything if the ravel's handle names are ambiguous.
    pub fn add_ravel<R: RavelRegistry>(&mut self, registry: &mut R, id: RavelId) -> LockResult<()> {
        if self.ravels.contains(&id) {
            return Ok(());
        }
        let names = registry
            .peer(id)
            .map(|p| p.handle_names())
            .unwrap_or_default();
        let slot = self.ravels.len();
        self.lock_info = self
            .lock_info
            .clone()
            .with_slot(slot, &names, self.default_policy)?;
        self.ravels.push(id);

        if let Some(peer) = registry.peer_mut(id) {
            peer.set_lock_group(Some(self.id));
        }
        debug!(
            "ravel {} joined lock group {} ({} ravels, {} rows)",
            id,
            self.id,
            self.ravels.len(),
            self.lock_info.len()
        );
        Ok(())
    }

    /// Remove a live member and its column from every row.
    ///
    /// When one ravel is left its membership is cleared, leaving the group
    /// with no claimants.
    pub fn remove_from_group<R: RavelRegistry>(&mut self, registry: &mut R, id: RavelId) -> Removal {
        let Some(slot) = self.live_slot(registry, id) else {
            debug!("ravel {} is not a live member of lock group {}", id, self.id);
            return Removal::NotMember;
        };

        self.lock_info = std::mem::take(&mut self.lock_info).without_slot(slot);
        self.ravels.remove(slot);
        if let Some(peer) = registry.peer_mut(id) {
            if peer.lock_group() == Some(self.id) {
                peer.set_lock_group(None);
            }
        }

        if self.ravels.len() > 1 {
            return Removal::Removed;
        }
        if let Some(peer) = self.ravels.first().and_then(|&last| registry.peer_mut(last)) {
            if peer.lock_group() == Some(self.id) {
                peer.set_lock_group(None);
            }
        }
        debug!("lock group {} dissolved", self.id);
        Removal::Dissolved
    }

    /// Propagate the state of `source` to every other live member.
    ///
    /// With no rows every other member receives the source state verbatim.
    /// Otherwise each row copies the fields its policy selects onto the
    /// corresponding handle of each member; members lacking that handle are
    /// skipped. Each member's state is applied once.
    pub fn broadcast<R: RavelRegistry>(&self, registry: &mut R, source: RavelId) -> LockResult<()> {
        let Some(source_slot) = self.live_slot(registry, source) else {
            debug!("broadcast from {} ignored: not a live member of {}", source, self.id);
            return Ok(());
        };
        let Some(source_state) = registry.peer(source).map(|p| p.state().clone()) else {
            return Ok(());
        };

        if self.lock_info.is_empty() {
            for &id in self.ravels.iter().filter(|&&id| id != source) {
                if let Some(peer) = registry.peer_mut(id) {
                    peer.apply_state(source_state.clone());
                }
            }
            return Ok(());
        }

        let sources = self.lock_info.resolve(source_slot, &source_state)?;
        let mut updated = 0;
        for (slot, &id) in self.ravels.iter().enumerate() {
            if id == source {
                continue;
            }
            let Some(peer) = registry.peer_mut(id) else {
                continue;
            };

            let mut state = peer.state().clone();
            for (row, source_handle) in self.lock_info.rows().iter().zip(&sources) {
                let (Some(source_handle), Some(name)) = (source_handle, row.name(slot)) else {
                    continue;
                };
                let output = source_state.is_output_handle(&source_handle.description);
                if !copy_locked_fields(&mut state, name, source_handle, output, row) {
                    trace!("ravel {} has no handle {}; skipped", id, name);
                }
            }
            peer.apply_state(state);
            updated += 1;
        }
        debug!("broadcast from {} updated {} ravels", source, updated);
        Ok(())
    }

    /// Broadcast from the first live member, bringing a new group into step.
    pub fn initial_broadcast<R: RavelRegistry>(&self, registry: &mut R) -> LockResult<()> {
        match self.ravels.iter().copied().find(|&id| registry.is_live(id)) {
            Some(first) => self.broadcast(registry, first),
            None => Ok(()),
        }
    }

    /// Check that every row has one slot per member and that no member's
    /// handle is claimed twice.
    pub fn validate_lock_handle_info(&self) -> LockResult<()> {
        self.lock_info.validate(self.ravels.len())
    }

    /// Sorted union of the handle names of all live members.
    pub fn all_lock_handles<R: RavelRegistry>(&self, registry: &R) -> Vec<String> {
        let handles: BTreeSet<String> = self
            .ravels
            .iter()
            .filter_map(|&id| registry.peer(id))
            .flat_map(|p| p.handle_names())
            .collect();
        handles.into_iter().collect()
    }

    /// Display labels of the members: the tooltip if set, otherwise an
    /// ordinal counting unlabelled members; dead members show `<invalid>`.
    pub fn ravel_names<R: RavelRegistry>(&self, registry: &R) -> Vec<String> {
        let mut ordinal = 0;
        self.ravels
            .iter()
            .map(|&id| match registry.peer(id) {
                Some(peer) if !peer.label().is_empty() => peer.label().to_string(),
                Some(_) => {
                    ordinal += 1;
                    (ordinal - 1).to_string()
                }
                None => "<invalid>".to_string(),
            })
            .collect()
    }

    /// Handle names of the member in `slot`; empty for dead members.
    pub fn handle_names<R: RavelRegistry>(&self, registry: &R, slot: usize) -> Vec<String> {
        self.ravels
            .get(slot)
            .and_then(|&id| registry.peer(id))
            .map(|p| p.handle_names())
            .unwrap_or_default()
    }

    /// Rebuild the rows: one per requested handle, mapped on each live
    /// member that has a handle of exactly that name.
    pub fn set_lock_handles<R: RavelRegistry, S: AsRef<str>>(&mut self, registry: &R, handles: &[S]) {
        let peer_handles: Vec<Vec<String>> = self
            .ravels
            .iter()
            .map(|&id| registry.peer(id).map(|p| p.handle_names()).unwrap_or_default())
            .collect();
        self.lock_info = LockTable::from_lock_handles(handles, &peer_handles, self.default_policy);
    }

    /// Install user-edited rows after validating them.
    pub fn set_lock_info(&mut self, rows: Vec<HandleLockInfo>) -> LockResult<()> {
        let table = LockTable::from_rows(rows);
        table.validate(self.ravels.len())?;
        self.lock_info = table;
        Ok(())
    }

    /// Change which fields one row propagates.
    pub fn set_row_policy(&mut self, row: usize, policy: LockPolicy) -> LockResult<()> {
        let info = self.lock_info.row_mut(row).ok_or(LockError::UnknownRow(row))?;
        info.policy = policy;
        Ok(())
    }
}

/// Copy the fields `row` locks from `source` onto handle `name` of `state`.
/// Returns false if `state` has no such handle.
fn copy_locked_fields(
    state: &mut RavelState,
    name: &str,
    source: &HandleState,
    source_is_output: bool,
    row: &HandleLockInfo,
) -> bool {
    let Some(hs) = state.handle_mut(name) else {
        return false;
    };
    let policy = row.policy;
    if policy.slicer {
        hs.slice_label = source.slice_label.clone();
    }
    if policy.orientation {
        hs.x = source.x;
        hs.y = source.y;
        hs.collapsed = source.collapsed;
        hs.reduction_op = source.reduction_op;
    }
    if policy.calipers {
        hs.display_filter_caliper = source.display_filter_caliper;
        hs.min_label = source.min_label.clone();
        hs.max_label = source.max_label.clone();
    }
    if policy.order {
        hs.order = source.order;
        hs.custom_order = source.custom_order.clone();
    }
    if policy.slicer {
        state.set_output_handle(name, source_is_output);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ravel::Ravel;
    use crate::state::{ReductionOp, SortOrder};
    use std::collections::HashMap;

    type Registry = HashMap<RavelId, Ravel>;

    fn ravel(handles: &[&str]) -> Ravel {
        let mut ravel = Ravel::new();
        for h in handles {
            ravel.add_handle(h, ["a", "b", "c", "d"]).unwrap();
        }
        ravel
    }

    /// Register ravels and link them into one group, in order.
    fn linked(ravels: Vec<Ravel>) -> (Registry, RavelLockGroup, Vec<RavelId>) {
        let mut registry = Registry::new();
        let mut group = RavelLockGroup::new();
        let ids: Vec<RavelId> = ravels.iter().map(|r| r.id()).collect();
        for r in ravels {
            registry.insert(r.id(), r);
        }
        for &id in &ids {
            group.add_ravel(&mut registry, id).unwrap();
        }
        (registry, group, ids)
    }

    fn handle<'a>(registry: &'a Registry, id: RavelId, name: &str) -> &'a HandleState {
        registry[&id].handle_state(name).unwrap()
    }

    #[test]
    fn test_add_ravel_grows_rows() {
        let (registry, mut group, ids) = linked(vec![ravel(&["time", "sales"]), ravel(&["time", "cost"])]);
        assert_eq!(group.len(), 2);
        assert!(group.lock_info().rows().iter().all(|r| r.handle_names.len() == 2));

        let mut registry = registry;
        let third = ravel(&["cost"]);
        let third_id = third.id();
        registry.insert(third_id, third);
        group.add_ravel(&mut registry, third_id).unwrap();

        assert!(group.lock_info().rows().iter().all(|r| r.handle_names.len() == 3));
        assert_eq!(registry[&third_id].lock_group(), Some(group.id()));
        assert_eq!(registry[&ids[0]].lock_group(), Some(group.id()));
        assert!(group.validate_lock_handle_info().is_ok());
    }

    #[test]
    fn test_add_ambiguous_ravel_fails() {
        let (mut registry, mut group, _) = linked(vec![ravel(&["time"]), ravel(&["time"])]);
        let mut odd = ravel(&["time"]);
        let mut state = odd.state().clone();
        state.handle_states.push(HandleState::new("time"));
        odd.apply_state(state);
        let odd_id = odd.id();
        registry.insert(odd_id, odd);

        let rows_before = group.lock_info().clone();
        assert_eq!(
            group.add_ravel(&mut registry, odd_id),
            Err(LockError::AmbiguousHandles("time".to_string()))
        );
        assert_eq!(group.len(), 2);
        assert_eq!(group.lock_info(), &rows_before);
        assert_eq!(registry[&odd_id].lock_group(), None);
    }

    #[test]
    fn test_empty_lock_info_locks_everything() {
        let (mut registry, mut group, ids) =
            linked(vec![ravel(&["time", "sales"]), ravel(&["time", "cost"]), ravel(&[])]);
        group.set_lock_info(Vec::new()).unwrap();

        let source = registry.get_mut(&ids[0]).unwrap();
        source.adjust_slicer("time", 2).unwrap();
        source.rescale(42.0);
        let expected = source.state().clone();

        group.broadcast(&mut registry, ids[0]).unwrap();
        assert_eq!(registry[&ids[1]].state(), &expected);
        assert_eq!(registry[&ids[2]].state(), &expected);
    }

    #[test]
    fn test_broadcast_from_non_member_is_noop() {
        let (mut registry, group, ids) = linked(vec![ravel(&["time"]), ravel(&["time"])]);
        let stranger = ravel(&["time"]);
        let stranger_id = stranger.id();
        registry.insert(stranger_id, stranger);
        registry.get_mut(&stranger_id).unwrap().adjust_slicer("time", 1).unwrap();

        group.broadcast(&mut registry, stranger_id).unwrap();
        assert_eq!(handle(&registry, ids[0], "time").slice_label, "a");

        // a member that has been deleted is not live either
        registry.remove(&ids[1]);
        group.broadcast(&mut registry, ids[1]).unwrap();
    }

    #[test]
    fn test_scenario_time_sales_cost() {
        let a = ravel(&["time", "sales"]);
        let b = ravel(&["time", "cost"]);
        let (a_id, b_id) = (a.id(), b.id());
        let (mut registry, mut group, _) = linked(vec![a, b]);

        group.set_lock_handles(&registry, &["time"]);
        assert_eq!(group.lock_info().len(), 1);
        assert_eq!(group.lock_info().rows()[0].handle_names, vec!["time", "time"]);
        assert_eq!(group.lock_info().rows()[0].policy, LockPolicy::ALL);

        let a = registry.get_mut(&a_id).unwrap();
        a.adjust_slicer("time", 1).unwrap();
        a.adjust_slicer("sales", 3).unwrap();
        group.broadcast(&mut registry, a_id).unwrap();

        assert_eq!(handle(&registry, b_id, "time").slice_label, "b");
        assert_eq!(handle(&registry, b_id, "cost").slice_label, "a");
        assert_eq!(handle(&registry, a_id, "sales").slice_label, "d");
    }

    #[test]
    fn test_policy_isolation_calipers_only() {
        let (mut registry, mut group, ids) = linked(vec![ravel(&["time"]), ravel(&["time"])]);
        group
            .set_lock_info(vec![HandleLockInfo::from_names(
                ["time", "time"],
                LockPolicy::NONE.with_calipers(true),
            )])
            .unwrap();
        let target_before = handle(&registry, ids[1], "time").clone();

        let source = registry.get_mut(&ids[0]).unwrap();
        source.set_caliper_range("time", "b", "c").unwrap();
        source.set_display_filter_caliper("time", true).unwrap();
        source.set_orientation("time", -5.0, 7.0).unwrap();
        source.collapse("time", true, ReductionOp::Max).unwrap();
        source.set_sort_order("time", SortOrder::Reverse).unwrap();
        source.adjust_slicer("time", 2).unwrap();
        group.broadcast(&mut registry, ids[0]).unwrap();

        let target = handle(&registry, ids[1], "time");
        assert_eq!(target.min_label, "b");
        assert_eq!(target.max_label, "c");
        assert!(target.display_filter_caliper);
        assert_eq!((target.x, target.y), (target_before.x, target_before.y));
        assert!(!target.collapsed);
        assert_eq!(target.reduction_op, target_before.reduction_op);
        assert_eq!(target.order, SortOrder::None);
        assert_eq!(target.slice_label, target_before.slice_label);
    }

    #[test]
    fn test_orientation_and_order_travel_together() {
        let (mut registry, mut group, ids) = linked(vec![ravel(&["time"]), ravel(&["time"])]);
        group
            .set_lock_info(vec![HandleLockInfo::from_names(
                ["time", "time"],
                LockPolicy::NONE.with_orientation(true).with_order(true),
            )])
            .unwrap();

        let source = registry.get_mut(&ids[0]).unwrap();
        source.set_orientation("time", 3.0, 4.0).unwrap();
        source.collapse("time", true, ReductionOp::Prod).unwrap();
        source.pick_slice_labels("time", &["d", "b"]).unwrap();
        group.broadcast(&mut registry, ids[0]).unwrap();

        let target = handle(&registry, ids[1], "time");
        assert_eq!((target.x, target.y), (3.0, 4.0));
        assert!(target.collapsed);
        assert_eq!(target.reduction_op, ReductionOp::Prod);
        assert_eq!(target.order, SortOrder::Custom);
        assert_eq!(target.custom_order, vec![3, 1]);
        assert_eq!(target.min_label, "a");
    }

    #[test]
    fn test_output_handles_follow_slicer_both_ways() {
        let (mut registry, mut group, ids) =
            linked(vec![ravel(&["time", "region"]), ravel(&["region", "time"])]);
        group.set_lock_handles(&registry, &["time", "region"]);
        registry.get_mut(&ids[1]).unwrap().set_rank(1); // target outputs "region"

        // source outputs "time" only
        registry.get_mut(&ids[0]).unwrap().set_rank(1);
        group.broadcast(&mut registry, ids[0]).unwrap();
        let target = registry[&ids[1]].state();
        assert!(target.is_output_handle("time"));
        assert!(!target.is_output_handle("region"));

        // without the slicer flag output status stays put
        group.set_row_policy(0, LockPolicy::ALL.with_slicer(false)).unwrap();
        registry.get_mut(&ids[0]).unwrap().set_rank(0);
        group.broadcast(&mut registry, ids[0]).unwrap();
        assert!(registry[&ids[1]].state().is_output_handle("time"));

        group.set_row_policy(0, LockPolicy::ALL).unwrap();
        group.broadcast(&mut registry, ids[0]).unwrap();
        assert!(!registry[&ids[1]].state().is_output_handle("time"));
    }

    #[test]
    fn test_broadcast_is_idempotent() {
        let (mut registry, mut group, ids) =
            linked(vec![ravel(&["time", "x"]), ravel(&["time", "y"]), ravel(&["x", "time"])]);
        let all = group.all_lock_handles(&registry);
        group.set_lock_handles(&registry, all.as_slice());
        let source = registry.get_mut(&ids[0]).unwrap();
        source.adjust_slicer("time", 3).unwrap();
        source.set_rank(2);

        group.broadcast(&mut registry, ids[0]).unwrap();
        let once: Vec<RavelState> = ids.iter().map(|id| registry[id].state().clone()).collect();
        group.broadcast(&mut registry, ids[0]).unwrap();
        let twice: Vec<RavelState> = ids.iter().map(|id| registry[id].state().clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_lock_handles_round_trip() {
        let (mut registry, mut group, ids) =
            linked(vec![ravel(&["time", "sales"]), ravel(&["time", "cost"])]);
        let all = group.all_lock_handles(&registry);
        assert_eq!(all, vec!["cost", "sales", "time"]);
        group.set_lock_handles(&registry, all.as_slice());
        assert_eq!(group.lock_info().len(), 3);

        let source = registry.get_mut(&ids[0]).unwrap();
        source.adjust_slicer("time", 1).unwrap();
        source.adjust_slicer("sales", 1).unwrap();
        group.broadcast(&mut registry, ids[0]).unwrap();

        // only the handle both ravels have propagates
        assert_eq!(handle(&registry, ids[1], "time").slice_label, "b");
        assert_eq!(handle(&registry, ids[1], "cost").slice_label, "a");
        assert!(registry[&ids[1]].handle_state("sales").is_none());
    }

    #[test]
    fn test_drifted_handle_is_skipped() {
        let (mut registry, mut group, ids) = linked(vec![ravel(&["time"]), ravel(&["date"])]);
        group
            .set_lock_info(vec![HandleLockInfo::from_names(["time", "epoch"], LockPolicy::ALL)])
            .unwrap();
        registry.get_mut(&ids[0]).unwrap().adjust_slicer("time", 1).unwrap();
        group.broadcast(&mut registry, ids[0]).unwrap();
        assert_eq!(handle(&registry, ids[1], "date").slice_label, "a");
    }

    #[test]
    fn test_multiple_locks_on_source_handle() {
        let (mut registry, mut group, ids) = linked(vec![ravel(&["time"]), ravel(&["time", "t"])]);
        // bypass validation, as a hand-edited table could
        group.lock_info = LockTable::from_rows(vec![
            HandleLockInfo::from_names(["time", "time"], LockPolicy::ALL),
            HandleLockInfo::from_names(["time", "t"], LockPolicy::ALL),
        ]);
        let err = group.broadcast(&mut registry, ids[0]).unwrap_err();
        assert_eq!(err.to_string(), "multiple locks found on handle time");
    }

    #[test]
    fn test_remove_middle_ravel_shifts_slots() {
        let (mut registry, mut group, ids) = linked(vec![
            ravel(&["time", "p0"]),
            ravel(&["time", "p1"]),
            ravel(&["time", "p2"]),
        ]);
        assert_eq!(group.remove_from_group(&mut registry, ids[1]), Removal::Removed);

        assert_eq!(group.ravels(), &[ids[0], ids[2]]);
        assert!(group.lock_info().rows().iter().all(|r| r.handle_names.len() == 2));
        for row in group.lock_info().rows() {
            assert!(row.name(0).is_none_or(|n| registry[&ids[0]].handle_state(n).is_some()));
            assert!(row.name(1).is_none_or(|n| registry[&ids[2]].handle_state(n).is_some()));
        }
        let p2_row = group
            .lock_info()
            .rows()
            .iter()
            .find(|r| r.name(1) == Some("p2"))
            .unwrap();
        assert_eq!(p2_row.name(0), None);
        assert_eq!(registry[&ids[1]].lock_group(), None);
        assert!(group.validate_lock_handle_info().is_ok());
    }

    #[test]
    fn test_remove_dissolves_pair() {
        let (mut registry, mut group, ids) = linked(vec![ravel(&["time"]), ravel(&["time"])]);
        assert_eq!(group.remove_from_group(&mut registry, ids[0]), Removal::Dissolved);
        assert_eq!(registry[&ids[1]].lock_group(), None);
    }

    #[test]
    fn test_remove_dead_or_stranger_is_noop() {
        let (mut registry, mut group, ids) =
            linked(vec![ravel(&["time"]), ravel(&["time"]), ravel(&["time"])]);
        let stranger = Ravel::new();
        assert_eq!(group.remove_from_group(&mut registry, stranger.id()), Removal::NotMember);

        registry.remove(&ids[2]);
        assert_eq!(group.remove_from_group(&mut registry, ids[2]), Removal::NotMember);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_ravel_names() {
        let (mut registry, group, ids) = linked(vec![
            ravel(&[]).with_tooltip("prices"),
            ravel(&[]),
            ravel(&[]),
            ravel(&[]),
        ]);
        registry.remove(&ids[3]);
        assert_eq!(group.ravel_names(&registry), vec!["prices", "0", "1", "<invalid>"]);
        assert!(group.handle_names(&registry, 3).is_empty());
    }

    #[test]
    fn test_validate_after_edit() {
        let (_, mut group, _) = linked(vec![ravel(&["time"]), ravel(&["time"])]);
        let err = group
            .set_lock_info(vec![
                HandleLockInfo::from_names(["time", "time"], LockPolicy::ALL),
                HandleLockInfo::from_names(["time", ""], LockPolicy::ALL),
            ])
            .unwrap_err();
        assert_eq!(err, LockError::DuplicateHandle("time".to_string()));

        let err = group
            .set_lock_info(vec![HandleLockInfo::from_names(["time"], LockPolicy::ALL)])
            .unwrap_err();
        assert!(matches!(err, LockError::InsufficientData { line: 1, .. }));
        assert_eq!(group.set_row_policy(7, LockPolicy::NONE), Err(LockError::UnknownRow(7)));
    }

    #[test]
    fn test_colours_are_distinct() {
        let a = RavelLockGroup::new();
        let b = RavelLockGroup::new();
        assert_ne!(a.colour(), b.colour());
        assert!(a.colour() >= 1);
    }
}
