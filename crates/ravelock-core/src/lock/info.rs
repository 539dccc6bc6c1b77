//! Lock rows: cross-ravel handle correspondence plus propagation policy.

use serde::{Deserialize, Serialize};

/// Which parts of a handle's state travel along a lock row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPolicy {
    /// Slice label and output-handle status.
    pub slicer: bool,
    /// Position, collapsed flag and reduction operator.
    pub orientation: bool,
    /// Caliper labels and the display filter flag.
    pub calipers: bool,
    /// Sort order and custom permutation.
    pub order: bool,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self::ALL
    }
}

impl LockPolicy {
    /// Every field propagates.
    pub const ALL: Self = Self {
        slicer: true,
        orientation: true,
        calipers: true,
        order: true,
    };

    /// Nothing propagates; the row only records correspondence.
    pub const NONE: Self = Self {
        slicer: false,
        orientation: false,
        calipers: false,
        order: false,
    };

    pub fn with_slicer(mut self, on: bool) -> Self {
        self.slicer = on;
        self
    }

    pub fn with_orientation(mut self, on: bool) -> Self {
        self.orientation = on;
        self
    }

    pub fn with_calipers(mut self, on: bool) -> Self {
        self.calipers = on;
        self
    }

    pub fn with_order(mut self, on: bool) -> Self {
        self.order = on;
        self
    }
}

/// One logical handle locked across the ravels of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleLockInfo {
    /// Local handle name per ravel slot; blank means "no handle here".
    pub handle_names: Vec<String>,
    #[serde(flatten)]
    pub policy: LockPolicy,
}

impl HandleLockInfo {
    /// Create a row with `slots` blank names.
    pub fn new(slots: usize, policy: LockPolicy) -> Self {
        Self {
            handle_names: vec![String::new(); slots],
            policy,
        }
    }

    /// Create a row from explicit names.
    pub fn from_names<I, S>(names: I, policy: LockPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            handle_names: names.into_iter().map(Into::into).collect(),
            policy,
        }
    }

    /// The handle name mapped at `slot`, or `None` if the slot is blank or
    /// out of range.
    pub fn name(&self, slot: usize) -> Option<&str> {
        self.handle_names
            .get(slot)
            .map(String::as_str)
            .filter(|n| !is_blank(n))
    }

    /// The first mapped name, used as the row's display label.
    pub fn logical_name(&self) -> Option<&str> {
        self.handle_names
            .iter()
            .map(String::as_str)
            .find(|n| !is_blank(n))
    }
}

/// Whitespace-only names (including U+00A0) count as unmapped.
pub fn is_blank(name: &str) -> bool {
    name.chars().all(|c| c.is_whitespace() || c == '\u{a0}')
}
