//! Ravel state snapshots.
//!
//! A [`RavelState`] is the unit of exchange between ravels: the lock group
//! reads it from one ravel, edits selected fields and hands it back to
//! another. Handles are identified by their description, never by position.

use serde::{Deserialize, Serialize};

/// Reduction applied along a collapsed handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionOp {
    #[default]
    Sum,
    Prod,
    Av,
    Stddev,
    Min,
    Max,
}

/// Sort order of a handle's slice labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Labels in their natural (load) order.
    #[default]
    None,
    Forward,
    Reverse,
    /// Labels follow `HandleState::custom_order`.
    Custom,
}

/// Presentation state of a single handle (axis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleState {
    /// Handle name, unique within one ravel.
    pub description: String,
    /// Currently selected slice.
    pub slice_label: String,
    /// Lower caliper label.
    pub min_label: String,
    /// Upper caliper label.
    pub max_label: String,
    /// Whether the calipers filter the displayed labels.
    pub display_filter_caliper: bool,
    /// Handle orientation, relative to the ravel centre.
    pub x: f64,
    pub y: f64,
    pub collapsed: bool,
    pub reduction_op: ReductionOp,
    pub order: SortOrder,
    /// Label indices, used when `order` is [`SortOrder::Custom`].
    #[serde(default)]
    pub custom_order: Vec<usize>,
}

impl HandleState {
    /// Create a handle state with default presentation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            slice_label: String::new(),
            min_label: String::new(),
            max_label: String::new(),
            display_filter_caliper: false,
            x: 0.0,
            y: 0.0,
            collapsed: false,
            reduction_op: ReductionOp::default(),
            order: SortOrder::default(),
            custom_order: Vec::new(),
        }
    }

    /// Set the selected slice.
    pub fn with_slice(mut self, label: impl Into<String>) -> Self {
        self.slice_label = label.into();
        self
    }

    /// Set the orientation.
    pub fn with_orientation(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// Snapshot of a whole ravel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RavelState {
    /// Handle states in display order.
    pub handle_states: Vec<HandleState>,
    /// Descriptions of the handles exposed as output axes.
    pub output_handles: Vec<String>,
    pub radius: f64,
}

impl Default for RavelState {
    fn default() -> Self {
        Self {
            handle_states: Vec::new(),
            output_handles: Vec::new(),
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

impl RavelState {
    /// Radius of a freshly created ravel.
    pub const DEFAULT_RADIUS: f64 = 100.0;

    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state with no handles carries no information.
    pub fn is_empty(&self) -> bool {
        self.handle_states.is_empty()
    }

    /// Look up a handle by description.
    pub fn handle(&self, description: &str) -> Option<&HandleState> {
        self.handle_states
            .iter()
            .find(|hs| hs.description == description)
    }

    /// Look up a handle by description for modification.
    pub fn handle_mut(&mut self, description: &str) -> Option<&mut HandleState> {
        self.handle_states
            .iter_mut()
            .find(|hs| hs.description == description)
    }

    /// Handle descriptions in display order.
    pub fn handle_names(&self) -> Vec<String> {
        self.handle_states
            .iter()
            .map(|hs| hs.description.clone())
            .collect()
    }

    /// Check whether a handle is an output handle.
    pub fn is_output_handle(&self, description: &str) -> bool {
        self.output_handles.iter().any(|h| h == description)
    }

    /// Add or remove a handle from the output handles.
    ///
    /// Adding keeps the existing order and appends; adding an existing
    /// output handle is a no-op.
    pub fn set_output_handle(&mut self, description: &str, output: bool) {
        if output {
            if !self.is_output_handle(description) {
                self.output_handles.push(description.to_string());
            }
        } else {
            self.output_handles.retain(|h| h != description);
        }
    }
}
