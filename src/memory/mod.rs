//! Layered conversation memory.
//!
//! - [`entry`]: the [`MemoryEntry`] record and tier routing
//! - [`store`]: the three-tier [`MemoryStore`]
//! - [`storage`]: durable backings behind the [`MemoryLog`] trait

pub mod entry;
pub mod storage;
pub mod store;

pub use entry::{MemoryEntry, MemoryRole, Tier};
pub use storage::{InMemoryLog, JsonlMemoryLog, MemoryLog};
pub use store::MemoryStore;
