//! Materialising received file payloads
//!
//! Files are written to a temporary name in the target directory and
//! renamed into place, so a crash mid-write never leaves a half-written
//! file under its final name. Existing files are overwritten
//! unconditionally; one-way sync has no conflict concept.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::error::Error;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::SyncError;
use crate::logging::*;
use crate::proto::{UploadPayload, WriteReport};

/// Suffix for in-flight temporary files, unlikely to collide with real
/// names
const TMP_SUFFIX: &str = ".ReMsYnC-TmP";

/// Write an upload batch under the configured roots, by index.
///
/// A payload whose root count differs from the configuration is a fatal
/// configuration error. A failure on one file is logged, counted, and
/// never stops the rest of the batch.
pub async fn write_files(
	roots: &[PathBuf],
	payload: &UploadPayload,
) -> Result<WriteReport, SyncError> {
	if payload.len() != roots.len() {
		return Err(SyncError::RootCountMismatch {
			sender: payload.len(),
			receiver: roots.len(),
		});
	}

	let mut report = WriteReport::default();

	for (root, files) in roots.iter().zip(payload) {
		for (rel, encoded) in files {
			match write_one(root, rel, encoded).await {
				Ok(written) => {
					debug!("Wrote {} ({} bytes)", root.join(rel).display(), written);
					report.files += 1;
					report.bytes += written as u64;
				}
				Err(err) => {
					warn!("Failed to write {} under {}: {}", rel, root.display(), err);
					report.failed += 1;
				}
			}
		}
	}

	Ok(report)
}

async fn write_one(
	root: &Path,
	rel: &str,
	encoded: &str,
) -> Result<usize, Box<dyn Error + Send + Sync>> {
	let rel_path = Path::new(rel);

	// A payload path must stay inside its root
	if rel_path.is_absolute() {
		return Err(format!("absolute path in payload: {}", rel).into());
	}
	if rel_path.components().any(|c| matches!(c, Component::ParentDir)) {
		return Err(format!("parent directory reference in payload: {}", rel).into());
	}

	let data = BASE64.decode(encoded)?;
	let target = root.join(rel_path);

	if let Some(parent) = target.parent() {
		fs::create_dir_all(parent).await?;
	}

	let file_name = target
		.file_name()
		.ok_or_else(|| format!("payload path has no file name: {}", rel))?;
	let tmp = target
		.with_file_name(format!(".{}{}", file_name.to_string_lossy(), TMP_SUFFIX));

	fs::write(&tmp, &data).await?;
	if let Err(err) = fs::rename(&tmp, &target).await {
		let _ = fs::remove_file(&tmp).await;
		return Err(err.into());
	}

	Ok(data.len())
}

// vim: ts=4
