//! The seam between lock groups and the ravels they synchronize.

use std::collections::HashMap;

use super::GroupId;
use crate::ravel::RavelId;
use crate::state::RavelState;

/// A ravel as seen by its lock group.
pub trait LockPeer {
    /// Current state snapshot.
    fn state(&self) -> &RavelState;

    /// Replace the whole state.
    fn apply_state(&mut self, state: RavelState);

    /// Local handle names in display order.
    fn handle_names(&self) -> Vec<String> {
        self.state().handle_names()
    }

    /// User-visible label; empty when unset.
    fn label(&self) -> &str;

    /// The group this peer claims membership of.
    fn lock_group(&self) -> Option<GroupId>;

    fn set_lock_group(&mut self, group: Option<GroupId>);
}

/// Lookup of live ravels by id.
///
/// Groups hold ids only; a ravel that is no longer in the registry is dead
/// and is skipped by every group operation.
pub trait RavelRegistry {
    type Peer: LockPeer;

    fn peer(&self, id: RavelId) -> Option<&Self::Peer>;

    fn peer_mut(&mut self, id: RavelId) -> Option<&mut Self::Peer>;

    fn is_live(&self, id: RavelId) -> bool {
        self.peer(id).is_some()
    }
}

impl<P: LockPeer> RavelRegistry for HashMap<RavelId, P> {
    type Peer = P;

    fn peer(&self, id: RavelId) -> Option<&P> {
        self.get(&id)
    }

    fn peer_mut(&mut self, id: RavelId) -> Option<&mut P> {
        self.get_mut(&id)
    }
}
