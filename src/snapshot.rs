//! Directory snapshot types
//!
//! A `Snapshot` is the unit the monitor publishes and the peers compare:
//! one mapping per root, keyed by `/`-separated relative path. It is
//! rebuilt wholesale on every monitoring tick and never patched in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-file crawl result: modification time and content digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
	/// Modification time, whole seconds since the Unix epoch
	#[serde(rename = "mt")]
	pub mtime: u64,

	/// Hex content digest
	#[serde(rename = "dg")]
	pub digest: String,
}

/// All records under one root, keyed by relative path.
/// BTreeMap keeps iteration deterministic for diffing and tests.
pub type RootFiles = BTreeMap<String, FileRecord>;

/// Ordered per-root mappings; index correspondence with the peer's root
/// list is positional, never validated by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
	pub roots: Vec<RootFiles>,
}

impl Snapshot {
	/// Snapshot with `root_count` empty mappings. Published before the
	/// first crawl completes so readers always see the right arity.
	pub fn empty(root_count: usize) -> Self {
		Snapshot { roots: vec![RootFiles::new(); root_count] }
	}

	pub fn root_count(&self) -> usize {
		self.roots.len()
	}

	/// Total number of files across all roots
	pub fn file_count(&self) -> usize {
		self.roots.iter().map(|r| r.len()).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_snapshot_arity() {
		let snapshot = Snapshot::empty(3);
		assert_eq!(snapshot.root_count(), 3);
		assert_eq!(snapshot.file_count(), 0);
	}

	#[test]
	fn test_snapshot_round_trip() {
		let mut root = RootFiles::new();
		root.insert(
			"src/main.txt".to_string(),
			FileRecord { mtime: 1700000000, digest: "ab12".to_string() },
		);
		let snapshot = Snapshot { roots: vec![root] };

		let json = serde_json::to_string(&snapshot).unwrap();
		let back: Snapshot = serde_json::from_str(&json).unwrap();
		assert_eq!(snapshot, back);
	}
}

// vim: ts=4
