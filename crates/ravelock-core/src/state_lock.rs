//! State locks: canvas items that freeze a ravel's state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LockError, LockResult};
use crate::lock::{LockPeer, RavelRegistry};
use crate::ravel::RavelId;
use crate::state::RavelState;

/// Unique identifier for a state lock.
pub type StateLockId = Uuid;

/// A lock wired to one ravel, holding a snapshot of its state while locked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateLock {
    id: StateLockId,
    /// Ravel feeding this lock, if wired.
    pub ravel: Option<RavelId>,
    #[serde(default)]
    locked_state: RavelState,
}

impl StateLock {
    /// Create an unlocked lock.
    pub fn new(ravel: Option<RavelId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ravel,
            locked_state: RavelState::default(),
        }
    }

    pub fn id(&self) -> StateLockId {
        self.id
    }

    /// A lock holding an empty snapshot counts as unlocked.
    pub fn locked(&self) -> bool {
        !self.locked_state.is_empty()
    }

    pub fn locked_state(&self) -> &RavelState {
        &self.locked_state
    }

    /// The wired ravel, if it is still live.
    pub fn ravel_input<'a, R: RavelRegistry>(&self, registry: &'a R) -> Option<&'a R::Peer> {
        self.ravel.and_then(|id| registry.peer(id))
    }

    /// Release the snapshot if locked, otherwise capture the wired ravel's
    /// state. Returns whether the lock is now locked.
    pub fn toggle_locked<R: RavelRegistry>(&mut self, registry: &R) -> LockResult<bool> {
        if self.locked() {
            self.locked_state = RavelState::default();
            return Ok(false);
        }
        let peer = self.ravel_input(registry).ok_or(LockError::Unconnected)?;
        self.locked_state = peer.state().clone();
        Ok(self.locked())
    }

    /// Put the snapshot back onto the wired ravel. Returns false if there
    /// is no snapshot.
    pub fn restore<R: RavelRegistry>(&self, registry: &mut R) -> LockResult<bool> {
        if !self.locked() {
            return Ok(false);
        }
        let peer = self
            .ravel
            .and_then(|id| registry.peer_mut(id))
            .ok_or(LockError::Unconnected)?;
        peer.apply_state(self.locked_state.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ravel::Ravel;
    use std::collections::HashMap;

    #[test]
    fn test_toggle_captures_and_releases() {
        let ravel = Ravel::new().with_handle("year", ["2020", "2021"]).unwrap();
        let id = ravel.id();
        let mut registry = HashMap::from([(id, ravel)]);

        let mut lock = StateLock::new(Some(id));
        assert!(!lock.locked());
        assert!(lock.toggle_locked(&registry).unwrap());
        assert_eq!(lock.locked_state().handle("year").unwrap().slice_label, "2020");

        registry.get_mut(&id).unwrap().adjust_slicer("year", 1).unwrap();
        assert!(lock.restore(&mut registry).unwrap());
        assert_eq!(registry[&id].handle_state("year").unwrap().slice_label, "2020");

        assert!(!lock.toggle_locked(&registry).unwrap());
        assert!(!lock.restore(&mut registry).unwrap());
    }

    #[test]
    fn test_unconnected_lock() {
        let registry: HashMap<RavelId, Ravel> = HashMap::new();
        let mut lock = StateLock::new(None);
        assert_eq!(lock.toggle_locked(&registry), Err(LockError::Unconnected));

        let mut lock = StateLock::new(Some(Uuid::new_v4()));
        assert_eq!(lock.toggle_locked(&registry), Err(LockError::Unconnected));
    }

    #[test]
    fn test_empty_ravel_does_not_lock() {
        let ravel = Ravel::new();
        let id = ravel.id();
        let registry = HashMap::from([(id, ravel)]);
        let mut lock = StateLock::new(Some(id));
        assert!(!lock.toggle_locked(&registry).unwrap());
    }
}
