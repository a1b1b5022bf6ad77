//! Background snapshot monitoring
//!
//! One task per process re-crawls every root on a fixed interval and
//! publishes the result wholesale through a watch channel. Readers grab
//! whatever `Arc<Snapshot>` is currently published and never wait on a
//! crawl in progress. Stopping is signal-and-forget: an in-flight crawl
//! is allowed to finish and may publish one more snapshot, which is
//! harmless under whole-value replacement.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::crawl::Crawler;
use crate::logging::*;
use crate::snapshot::{RootFiles, Snapshot};

pub struct Monitor {
	snapshot_rx: watch::Receiver<Arc<Snapshot>>,
	stop_tx: watch::Sender<bool>,
}

impl Monitor {
	/// Spawn the monitoring task. The initial published value is an empty
	/// snapshot of the right arity; the first crawl starts immediately.
	pub fn start(crawlers: Vec<Crawler>, interval: Duration) -> Monitor {
		let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::empty(crawlers.len())));
		let (stop_tx, mut stop_rx) = watch::channel(false);

		tokio::spawn(async move {
			let crawlers = Arc::new(crawlers);

			loop {
				if *stop_rx.borrow() {
					break;
				}

				let previous = snapshot_tx.borrow().clone();
				let workers = crawlers.clone();

				// Crawls can take arbitrarily long; keep them off the
				// async workers.
				match tokio::task::spawn_blocking(move || rebuild(&workers, &previous)).await {
					Ok(snapshot) => {
						debug!(
							"Crawl tick complete: {} files across {} roots",
							snapshot.file_count(),
							snapshot.root_count()
						);
						let _ = snapshot_tx.send(Arc::new(snapshot));
					}
					Err(err) => warn!("Crawl task panicked: {}", err),
				}

				tokio::select! {
					_ = tokio::time::sleep(interval) => {}
					res = stop_rx.changed() => {
						// A closed channel means the owning Monitor is
						// gone; treat it like a stop signal.
						if res.is_err() || *stop_rx.borrow() {
							break;
						}
					}
				}
			}

			debug!("Monitor task stopped");
		});

		Monitor { snapshot_rx, stop_tx }
	}

	/// The currently published snapshot, always a consistent whole
	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snapshot_rx.borrow().clone()
	}

	/// Change-notified handle; `changed()` resolves after the next publish
	pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
		self.snapshot_rx.clone()
	}

	/// Signal the task to stop after its current tick. Never joins.
	pub fn stop(&self) {
		let _ = self.stop_tx.send(true);
	}
}

/// Rebuild every root's records, reusing digests from the previous
/// snapshot. A root whose crawl fails keeps its previous records so one
/// bad tick never erases a published tree.
fn rebuild(crawlers: &[Crawler], previous: &Snapshot) -> Snapshot {
	let empty = RootFiles::new();
	let roots = crawlers
		.iter()
		.enumerate()
		.map(|(index, crawler)| {
			let cache = previous.roots.get(index).unwrap_or(&empty);
			match crawler.crawl_and_hash(cache) {
				Ok(records) => records,
				Err(err) => {
					warn!("Crawl failed for {}: {}", crawler.root().display(), err);
					cache.clone()
				}
			}
		})
		.collect();

	Snapshot { roots }
}

// vim: ts=4
