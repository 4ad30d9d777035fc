//! lotlink_core - domain types, backend contract and unread tracking.
//!
//! Following the Functional Core pattern, the `marketplace` module is pure
//! data and validation. The `storage` and `realtime` modules define the
//! backend contract as traits so that any implementation (in-process or
//! remote) can be injected into the `unread` counter.

pub mod marketplace;
pub mod realtime;
pub mod serde;
pub mod storage;
pub mod unread;
