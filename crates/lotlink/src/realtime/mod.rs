//! Change feed implementations.

mod memory;

pub use memory::{MemoryChangeFeed, DEFAULT_CHANNEL_CAPACITY};
