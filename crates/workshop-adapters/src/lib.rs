//! Storage adapters for the workshop engine

mod local;
mod memory;
mod watcher;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use watcher::{WatchEvent, Watcher};
