//! In-memory storage backend.
//!
//! Stores every row in HashMaps wrapped in `Arc<RwLock<_>>`. This backs the
//! service in development and in tests; nothing survives a restart.
//!
//! # Example
//!
//! ```rust,ignore
//! use lotlink::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! repo.create_dealer(&Dealer::new("Main Street Motors")).await?;
//! ```

mod repository;

pub use repository::InMemoryRepository;
