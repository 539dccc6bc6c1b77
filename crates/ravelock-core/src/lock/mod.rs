//! Lock groups for linked ravels.
//!
//! This module keeps several ravels in step:
//! - Lock rows name the same logical handle on each ravel, by local name
//! - Each row carries a policy saying which handle fields propagate
//! - A group broadcasts one ravel's changes to the others under that policy
//!
//! Groups never own ravels. They are handed a [`RavelRegistry`] for each
//! operation and skip ravels it no longer holds.

mod group;
mod info;
mod palette;
mod peer;
mod table;

pub use group::{GroupId, RavelLockGroup, Removal};
pub use info::{HandleLockInfo, LockPolicy, is_blank};
pub use palette::{PALETTE, border_shade, palette_colour};
pub use peer::{LockPeer, RavelRegistry};
pub use table::LockTable;
