//! Recursive directory crawling and content hashing
//!
//! A `Crawler` is bound to one root at construction time, which is also
//! where configuration problems (missing root, bad pattern) surface.
//! Digests are recomputed only when a file's modification time has
//! advanced past the previously recorded value; a rewrite that keeps the
//! same second reuses a stale digest. That trade-off comes with the
//! mtime cache and is deliberate.

use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CrawlError;
use crate::logging::*;
use crate::snapshot::{FileRecord, RootFiles};
use crate::util;

#[derive(Debug)]
pub struct Crawler {
	root: PathBuf,
	exclude: Vec<Regex>,
}

impl Crawler {
	/// Bind a crawler to `root`. Fails fast if the root does not exist,
	/// is not a directory, or any pattern does not compile.
	///
	/// Patterns are regular expressions matched against the start of the
	/// `/`-separated relative path, in list order, first match wins.
	pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self, CrawlError> {
		let root = root.into();

		let meta = fs::metadata(&root)
			.map_err(|_| CrawlError::RootMissing { path: root.display().to_string() })?;
		if !meta.is_dir() {
			return Err(CrawlError::NotADirectory { path: root.display().to_string() });
		}

		let mut exclude = Vec::with_capacity(patterns.len());
		for pattern in patterns {
			let re = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
				CrawlError::InvalidPattern { pattern: pattern.clone(), message: e.to_string() }
			})?;
			exclude.push(re);
		}

		Ok(Crawler { root, exclude })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn excluded(&self, rel: &str) -> bool {
		self.exclude.iter().any(|re| re.is_match(rel))
	}

	/// Relative paths of all regular files under the root, exclusions
	/// applied to files and directories alike (a matching directory is
	/// pruned without descending).
	pub fn crawl(&self) -> Result<BTreeSet<String>, CrawlError> {
		let mut files = BTreeSet::new();
		let entries = fs::read_dir(&self.root)?;
		self.walk(entries, &mut files);
		Ok(files)
	}

	fn walk(&self, entries: fs::ReadDir, files: &mut BTreeSet<String>) {
		for entry in entries {
			let entry = match entry {
				Ok(e) => e,
				Err(err) => {
					warn!("Cannot read directory entry: {}", err);
					continue;
				}
			};

			let path = entry.path();
			let file_type = match entry.file_type() {
				Ok(t) => t,
				Err(err) => {
					warn!("Cannot stat {}: {}", path.display(), err);
					continue;
				}
			};

			let rel = match path.strip_prefix(&self.root) {
				Ok(r) => util::rel_path_string(r),
				Err(_) => continue,
			};

			if self.excluded(&rel) {
				trace!("Excluded: {}", rel);
				continue;
			}

			if file_type.is_dir() {
				match fs::read_dir(&path) {
					Ok(sub) => self.walk(sub, files),
					Err(err) => warn!("Cannot read {}: {}", path.display(), err),
				}
			} else if file_type.is_file() {
				files.insert(rel);
			}
			// Symlinks and special files are not synchronised
		}
	}

	/// Crawl and produce the root's records, reusing digests from
	/// `previous` for files whose mtime has not advanced.
	///
	/// Files that vanish between listing and hashing are logged and
	/// skipped; they will be picked up again on the next tick if they
	/// reappear.
	pub fn crawl_and_hash(&self, previous: &RootFiles) -> Result<RootFiles, CrawlError> {
		let mut records = RootFiles::new();

		for rel in self.crawl()? {
			let full = self.root.join(&rel);

			let meta = match fs::metadata(&full) {
				Ok(m) => m,
				Err(err) => {
					warn!("File vanished during crawl {}: {}", full.display(), err);
					continue;
				}
			};
			let mtime = util::unix_mtime(&meta);

			let digest = match previous.get(&rel) {
				Some(prev) if prev.mtime >= mtime => prev.digest.clone(),
				_ => match util::hash_file(&full) {
					Ok(d) => d,
					Err(err) => {
						warn!("Cannot hash {}: {}", full.display(), err);
						continue;
					}
				},
			};

			records.insert(rel, FileRecord { mtime, digest });
		}

		Ok(records)
	}
}

/// One crawler per configured root, in list order. Any failure here is a
/// configuration error and aborts startup.
pub fn build_crawlers(
	roots: &[PathBuf],
	patterns: &[String],
) -> Result<Vec<Crawler>, CrawlError> {
	roots.iter().map(|root| Crawler::new(root, patterns)).collect()
}


// vim: ts=4
