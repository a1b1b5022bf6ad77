//! Snapshot diffing
//!
//! One-way comparison: the result only ever names paths the sender holds.
//! Paths present only on the receiver are left alone (sync never deletes).

use crate::error::SyncError;
use crate::snapshot::Snapshot;

/// Per-root lists of relative paths the receiver is missing or holds
/// under a different digest. Both snapshots must describe the same
/// ordered root list; a length mismatch is a configuration error, never
/// a silent truncation.
pub fn diff(sender: &Snapshot, receiver: &Snapshot) -> Result<Vec<Vec<String>>, SyncError> {
	if sender.root_count() != receiver.root_count() {
		return Err(SyncError::RootCountMismatch {
			sender: sender.root_count(),
			receiver: receiver.root_count(),
		});
	}

	let result = sender
		.roots
		.iter()
		.zip(&receiver.roots)
		.map(|(src, dst)| {
			src.iter()
				.filter(|(path, record)| {
					dst.get(*path).map_or(true, |theirs| theirs.digest != record.digest)
				})
				.map(|(path, _)| path.clone())
				.collect()
		})
		.collect();

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::snapshot::{FileRecord, RootFiles};

	fn record(mtime: u64, digest: &str) -> FileRecord {
		FileRecord { mtime, digest: digest.to_string() }
	}

	fn snapshot(roots: Vec<Vec<(&str, FileRecord)>>) -> Snapshot {
		Snapshot {
			roots: roots
				.into_iter()
				.map(|files| {
					files.into_iter().map(|(p, r)| (p.to_string(), r)).collect::<RootFiles>()
				})
				.collect(),
		}
	}

	#[test]
	fn test_diff_identity_is_empty() {
		let s = snapshot(vec![
			vec![("a.txt", record(10, "d1")), ("b/c.txt", record(20, "d2"))],
			vec![("x.bin", record(30, "d3"))],
		]);
		let result = diff(&s, &s).unwrap();
		assert_eq!(result, vec![Vec::<String>::new(), Vec::new()]);
	}

	#[test]
	fn test_diff_flags_missing_and_stale() {
		let src = snapshot(vec![vec![
			("missing.txt", record(10, "d1")),
			("stale.txt", record(20, "d2")),
			("same.txt", record(30, "d3")),
		]]);
		let dst = snapshot(vec![vec![
			("stale.txt", record(20, "OTHER")),
			("same.txt", record(99, "d3")),
		]]);

		let result = diff(&src, &dst).unwrap();
		assert_eq!(result, vec![vec!["missing.txt".to_string(), "stale.txt".to_string()]]);
	}

	#[test]
	fn test_diff_never_flags_receiver_extras() {
		let src = snapshot(vec![vec![]]);
		let dst = snapshot(vec![vec![("extra.txt", record(10, "d1"))]]);

		let result = diff(&src, &dst).unwrap();
		assert_eq!(result, vec![Vec::<String>::new()]);
	}

	#[test]
	fn test_diff_same_digest_different_mtime_not_flagged() {
		let src = snapshot(vec![vec![("a.txt", record(10, "d1"))]]);
		let dst = snapshot(vec![vec![("a.txt", record(999, "d1"))]]);
		assert_eq!(diff(&src, &dst).unwrap(), vec![Vec::<String>::new()]);
	}

	#[test]
	fn test_diff_root_arity_mismatch_is_fatal() {
		let src = snapshot(vec![vec![], vec![]]);
		let dst = snapshot(vec![vec![]]);
		let err = diff(&src, &dst).unwrap_err();
		assert!(matches!(err, SyncError::RootCountMismatch { sender: 2, receiver: 1 }));
	}
}

// vim: ts=4
