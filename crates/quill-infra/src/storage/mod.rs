//! Object storage implementations - local filesystem and in-memory fallback.

mod local;
mod memory;

pub use local::LocalObjectStorage;
pub use memory::InMemoryObjectStorage;
