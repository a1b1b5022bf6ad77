//! Digest and path helpers shared by the crawler and the session layers

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Read buffer for streamed hashing. Tuning constant, not a correctness
/// parameter.
pub const HASH_BUF_SIZE: usize = 65536;

/// Hash a byte slice to a lowercase hex digest.
pub fn hash_bytes(buf: &[u8]) -> String {
	blake3::hash(buf).to_hex().to_string()
}

/// Hash a file's content, streamed in fixed-size chunks.
pub fn hash_file(path: &Path) -> io::Result<String> {
	let mut file = fs::File::open(path)?;
	let mut hasher = blake3::Hasher::new();
	let mut buf = vec![0u8; HASH_BUF_SIZE];

	loop {
		let n = file.read(&mut buf)?;
		if n == 0 {
			break;
		}
		hasher.update(&buf[..n]);
	}

	Ok(hasher.finalize().to_hex().to_string())
}

/// Modification time of a file as whole seconds since the Unix epoch.
/// Pre-epoch timestamps clamp to zero.
pub fn unix_mtime(meta: &fs::Metadata) -> u64 {
	meta.modified()
		.ok()
		.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Render a root-relative path with `/` separators regardless of platform.
pub fn rel_path_string(rel: &Path) -> String {
	let parts: Vec<String> =
		rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
	parts.join("/")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_bytes_stable() {
		let a = hash_bytes(b"hello");
		let b = hash_bytes(b"hello");
		assert_eq!(a, b);
		assert_eq!(a.len(), 64);
		assert_ne!(a, hash_bytes(b"world"));
	}

	#[test]
	fn test_rel_path_string_joins_components() {
		assert_eq!(rel_path_string(Path::new("a/b/c.txt")), "a/b/c.txt");
		assert_eq!(rel_path_string(Path::new("top.txt")), "top.txt");
	}
}

// vim: ts=4
