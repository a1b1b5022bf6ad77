//! Configuration for the two run modes
//!
//! Defaults live here as constants; CLI flags are the outermost layer and
//! override them. Roots themselves are validated when the crawlers are
//! constructed, not here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Listen/connect port when none is given
pub const DEFAULT_PORT: u16 = 8082;

/// Seconds between background crawls of the monitored roots
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 5;

/// Seconds the client sleeps between upload cycles
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 5;

/// Server drops a connection after this many seconds without a byte
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

/// Client-side connect deadline
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client-side deadline for each response read
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Delay before the client attempts to reconnect
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Configuration for the receiving side (`remsync remote`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
	/// TCP port to listen on
	pub port: u16,

	/// Ordered list of root directories; index correspondence with the
	/// client list is positional
	pub roots: Vec<PathBuf>,

	/// Prefix-anchored regular expressions excluding relative paths
	pub exclude_patterns: Vec<String>,

	pub scan_interval_secs: u64,
	pub idle_timeout_secs: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		ServerConfig {
			port: DEFAULT_PORT,
			roots: vec![],
			exclude_patterns: vec![],
			scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
			idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
		}
	}
}

impl ServerConfig {
	pub fn scan_interval(&self) -> Duration {
		Duration::from_secs(self.scan_interval_secs)
	}

	pub fn idle_timeout(&self) -> Duration {
		Duration::from_secs(self.idle_timeout_secs)
	}
}

/// Configuration for the sending side (`remsync local`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
	/// Remote host to push to
	pub host: String,

	/// Remote port
	pub port: u16,

	/// Ordered list of root directories, positionally matching the server's
	pub roots: Vec<PathBuf>,

	/// Prefix-anchored regular expressions excluding relative paths
	pub exclude_patterns: Vec<String>,

	pub scan_interval_secs: u64,
	pub cycle_interval_secs: u64,
	pub connect_timeout_secs: u64,
	pub read_timeout_secs: u64,
	pub reconnect_delay_secs: u64,
}

impl Default for ClientConfig {
	fn default() -> Self {
		ClientConfig {
			host: "127.0.0.1".to_string(),
			port: DEFAULT_PORT,
			roots: vec![],
			exclude_patterns: vec![],
			scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
			cycle_interval_secs: DEFAULT_CYCLE_INTERVAL_SECS,
			connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
			read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
			reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
		}
	}
}

impl ClientConfig {
	pub fn scan_interval(&self) -> Duration {
		Duration::from_secs(self.scan_interval_secs)
	}

	pub fn cycle_interval(&self) -> Duration {
		Duration::from_secs(self.cycle_interval_secs)
	}

	pub fn connect_timeout(&self) -> Duration {
		Duration::from_secs(self.connect_timeout_secs)
	}

	pub fn read_timeout(&self) -> Duration {
		Duration::from_secs(self.read_timeout_secs)
	}

	pub fn reconnect_delay(&self) -> Duration {
		Duration::from_secs(self.reconnect_delay_secs)
	}
}


// vim: ts=4
