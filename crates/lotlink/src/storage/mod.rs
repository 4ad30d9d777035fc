//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `lotlink_core::storage`, plus the decorators that publish change events
//! for every write.

pub mod inmemory;
pub mod publishing;

pub use inmemory::InMemoryRepository;
pub use publishing::{PublishingDeliveryRepository, PublishingMessageRepository};
