//! Ravel widgets placed on the canvas.
//!
//! A [`Ravel`] wraps a [`RavelState`] together with the slice labels of each
//! handle and its placement on the canvas. Local edits only touch the ravel
//! itself; propagating them to linked ravels is the job of the canvas and
//! the lock group.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LockError, LockResult};
use crate::lock::{GroupId, LockPeer};
use crate::state::{HandleState, RavelState, ReductionOp, SortOrder};

/// Unique identifier for a ravel.
pub type RavelId = Uuid;

/// Ratio between the drawn frame and the ravel radius.
const FRAME_SCALE: f64 = 1.1;

/// One ravel widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ravel {
    id: RavelId,
    /// User-visible label; the lock group shows an ordinal when empty.
    #[serde(default)]
    pub tooltip: String,
    position: Point,
    state: RavelState,
    /// Slice labels of each handle, keyed by handle description.
    #[serde(default)]
    labels: HashMap<String, Vec<String>>,
    /// Sort order to return to when a custom pick is undone.
    #[serde(default)]
    previous_order: SortOrder,
    #[serde(default)]
    lock_group: Option<GroupId>,
    bounds: Rect,
}

impl Default for Ravel {
    fn default() -> Self {
        Self::new()
    }
}

impl Ravel {
    /// Create an empty ravel at the origin.
    pub fn new() -> Self {
        let mut ravel = Self {
            id: Uuid::new_v4(),
            tooltip: String::new(),
            position: Point::ZERO,
            state: RavelState::default(),
            labels: HashMap::new(),
            previous_order: SortOrder::None,
            lock_group: None,
            bounds: Rect::ZERO,
        };
        ravel.update_bounding_box();
        ravel
    }

    /// Set the tooltip.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    /// Add a handle, builder style.
    pub fn with_handle<I, S>(mut self, description: &str, labels: I) -> LockResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_handle(description, labels)?;
        Ok(self)
    }

    pub fn id(&self) -> RavelId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Bounding box of the drawn frame, in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn radius(&self) -> f64 {
        self.state.radius
    }

    /// Slice labels of a handle in load order.
    pub fn slice_labels(&self, handle: &str) -> Option<&[String]> {
        self.labels.get(handle).map(Vec::as_slice)
    }

    pub fn handle_state(&self, handle: &str) -> Option<&HandleState> {
        self.state.handle(handle)
    }

    fn handle_mut(&mut self, handle: &str) -> LockResult<&mut HandleState> {
        self.state
            .handle_mut(handle)
            .ok_or_else(|| LockError::unknown_handle(handle))
    }

    /// Slice labels of a handle this ravel loaded itself. A handle adopted
    /// from another ravel's state has none and cannot be sliced here.
    fn loaded_labels(&self, handle: &str) -> LockResult<Vec<String>> {
        match (self.state.handle(handle), self.labels.get(handle)) {
            (Some(_), Some(labels)) => Ok(labels.clone()),
            _ => Err(LockError::unknown_handle(handle)),
        }
    }

    /// Add a handle with its slice labels.
    ///
    /// The slicer starts on the first label and the calipers span all labels.
    pub fn add_handle<I, S>(&mut self, description: &str, labels: I) -> LockResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.state.handle(description).is_some() {
            return Err(LockError::AmbiguousHandles(description.to_string()));
        }
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        // spread handles around the centre, first along x, second along y
        let angle = self.state.handle_states.len() as f64 * 2.0 * FRAC_PI_4;
        let r = self.state.radius;
        let mut hs = HandleState::new(description).with_orientation(r * angle.cos(), r * angle.sin());
        if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
            hs.slice_label = first.clone();
            hs.min_label = first.clone();
            hs.max_label = last.clone();
        }

        self.state.handle_states.push(hs);
        self.labels.insert(description.to_string(), labels);
        Ok(())
    }

    /// Make the first `rank` handles the output handles.
    pub fn set_rank(&mut self, rank: usize) {
        self.state.output_handles = self
            .state
            .handle_states
            .iter()
            .take(rank)
            .map(|hs| hs.description.clone())
            .collect();
    }

    /// Number of output handles.
    pub fn rank(&self) -> usize {
        self.state.output_handles.len()
    }

    /// Select a slice by label.
    pub fn set_slice_label(&mut self, handle: &str, label: &str) -> LockResult<()> {
        self.handle_mut(handle)?.slice_label = label.to_string();
        Ok(())
    }

    /// Step the slicer `n` labels forward (negative for backward), stopping
    /// at either end of the label list.
    pub fn adjust_slicer(&mut self, handle: &str, n: i64) -> LockResult<()> {
        let labels = self.loaded_labels(handle)?;
        let hs = self.handle_mut(handle)?;
        if labels.is_empty() {
            return Ok(());
        }
        let current = labels
            .iter()
            .position(|l| *l == hs.slice_label)
            .unwrap_or(0) as i64;
        let last = labels.len() as i64 - 1;
        let next = current.saturating_add(n).clamp(0, last) as usize;
        hs.slice_label = labels[next].clone();
        Ok(())
    }

    pub fn set_display_filter_caliper(&mut self, handle: &str, on: bool) -> LockResult<()> {
        self.handle_mut(handle)?.display_filter_caliper = on;
        Ok(())
    }

    /// Move both calipers.
    pub fn set_caliper_range(&mut self, handle: &str, min: &str, max: &str) -> LockResult<()> {
        let hs = self.handle_mut(handle)?;
        hs.min_label = min.to_string();
        hs.max_label = max.to_string();
        Ok(())
    }

    /// Set the sort order; any order other than custom drops the custom
    /// permutation.
    pub fn set_sort_order(&mut self, handle: &str, order: SortOrder) -> LockResult<()> {
        let hs = self.handle_mut(handle)?;
        hs.order = order;
        if order != SortOrder::Custom {
            hs.custom_order.clear();
        }
        Ok(())
    }

    /// Show only the picked labels, in the order given.
    ///
    /// Picking every label reverts to the order in force before the first
    /// custom pick. Unknown labels are ignored.
    pub fn pick_slice_labels<S: AsRef<str>>(&mut self, handle: &str, pick: &[S]) -> LockResult<()> {
        let labels = self.loaded_labels(handle)?;
        let hs = self
            .state
            .handle_mut(handle)
            .ok_or_else(|| LockError::unknown_handle(handle))?;
        if hs.order != SortOrder::Custom {
            self.previous_order = hs.order;
        }

        if pick.len() >= labels.len() {
            hs.order = self.previous_order;
            hs.custom_order.clear();
            return Ok(());
        }

        let custom: Vec<usize> = pick
            .iter()
            .filter_map(|p| labels.iter().position(|l| l == p.as_ref()))
            .collect();
        if custom.is_empty() {
            return Ok(());
        }
        hs.order = SortOrder::Custom;
        hs.custom_order = custom;
        Ok(())
    }

    /// Rename a handle, keeping its labels and output status.
    ///
    /// Lock rows still naming the old description no longer match this
    /// ravel and are skipped by broadcasts until the rows are rebuilt.
    pub fn set_handle_description(&mut self, old: &str, new: &str) -> LockResult<()> {
        if old == new {
            return self.handle_mut(old).map(|_| ());
        }
        if self.state.handle(new).is_some() {
            return Err(LockError::AmbiguousHandles(new.to_string()));
        }
        self.handle_mut(old)?.description = new.to_string();
        if let Some(labels) = self.labels.remove(old) {
            self.labels.insert(new.to_string(), labels);
        }
        for output in self.state.output_handles.iter_mut().filter(|h| h.as_str() == old) {
            *output = new.to_string();
        }
        Ok(())
    }

    /// Place a handle.
    pub fn set_orientation(&mut self, handle: &str, x: f64, y: f64) -> LockResult<()> {
        let hs = self.handle_mut(handle)?;
        hs.x = x;
        hs.y = y;
        Ok(())
    }

    /// Collapse (or expand) a handle, reducing along it with `op`.
    pub fn collapse(&mut self, handle: &str, collapsed: bool, op: ReductionOp) -> LockResult<()> {
        let hs = self.handle_mut(handle)?;
        hs.collapsed = collapsed;
        hs.reduction_op = op;
        Ok(())
    }

    /// Change the radius.
    pub fn rescale(&mut self, radius: f64) {
        self.state.radius = radius;
        self.update_bounding_box();
    }

    /// Move the ravel centre.
    pub fn move_to(&mut self, position: Point) {
        self.position = position;
        self.update_bounding_box();
    }

    fn update_bounding_box(&mut self) {
        let r = FRAME_SCALE * self.state.radius;
        self.bounds = Rect::new(
            self.position.x - r,
            self.position.y - r,
            self.position.x + r,
            self.position.y + r,
        );
    }
}

impl LockPeer for Ravel {
    fn state(&self) -> &RavelState {
        &self.state
    }

    fn apply_state(&mut self, state: RavelState) {
        let radius_changed = state.radius != self.state.radius;
        self.state = state;
        if radius_changed {
            self.update_bounding_box();
        }
    }

    fn label(&self) -> &str {
        &self.tooltip
    }

    fn lock_group(&self) -> Option<GroupId> {
        self.lock_group
    }

    fn set_lock_group(&mut self, group: Option<GroupId>) {
        self.lock_group = group;
    }
}
