//! # remsync - Continuous One-Way Remote Directory Synchroniser
//!
//! remsync keeps one or more local directory trees continuously
//! mirrored to a remote machine over a private TCP protocol. The local
//! agent detects changes by content hash and pushes only changed files;
//! the remote agent diffs against its own snapshot and persists what it
//! is told to receive.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use remsync::{client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig {
//!         host: "mirror.example.com".into(),
//!         roots: vec!["./project".into()],
//!         ..Default::default()
//!     };
//!     client::run(config).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod crawl;
pub mod diff;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod proto;
pub mod server;
pub mod snapshot;
pub mod util;
pub mod writer;

// Re-export commonly used types
pub use config::{ClientConfig, ServerConfig};
pub use error::{CrawlError, ProtocolError, SyncError};
pub use snapshot::{FileRecord, RootFiles, Snapshot};

// vim: ts=4
