//! Ravelock Core Library
//!
//! Lock groups for Ravel widgets: linked pivot controls whose handle state is
//! kept in step, together with the canvas document that holds them and its
//! persistence.

pub mod canvas;
pub mod error;
pub mod lock;
pub mod ravel;
pub mod state;
pub mod state_lock;
pub mod storage;

pub use canvas::CanvasDocument;
pub use error::{LockError, LockResult};
pub use lock::{GroupId, HandleLockInfo, LockPeer, LockPolicy, LockTable, RavelLockGroup, RavelRegistry, Removal};
pub use ravel::{Ravel, RavelId};
pub use state::{HandleState, RavelState, ReductionOp, SortOrder};
pub use state_lock::{StateLock, StateLockId};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
