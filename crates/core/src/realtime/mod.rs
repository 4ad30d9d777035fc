mod error;
mod subscription;
mod traits;
mod types;

pub use error::{FeedError, Result};
pub use subscription::Subscription;
pub use traits::{ChangeFeed, ChangePublisher};
pub use types::{ChangeEvent, ChangeFilter, ChangeKind, Record, Table};
