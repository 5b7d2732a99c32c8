//! Storage backends for the memory log.

pub mod in_memory;
pub mod interface;
pub mod jsonl_storage;

pub use in_memory::InMemoryLog;
pub use interface::MemoryLog;
pub use jsonl_storage::{JsonlMemoryLog, MEMORY_FILE_NAME};
