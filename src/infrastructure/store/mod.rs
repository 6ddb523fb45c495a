//! Tree store implementations

pub mod memory;
pub mod seed;
pub mod sqlite;

pub use memory::MemoryTreeStore;
pub use seed::{seed_if_empty, seed_names, seed_nodes};
pub use sqlite::SqliteTreeStore;
