//! lotlink_client - HTTP/SSE client and CLI for the lotlink API.

pub mod cli;
pub mod client;
pub mod error;
pub mod output;
pub mod remote;
pub mod sse;

pub use client::LotlinkClient;
pub use error::{ClientError, Result};
pub use remote::RemoteBackend;
