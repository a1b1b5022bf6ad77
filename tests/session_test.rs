//! Client/server session tests over an in-memory duplex stream

use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use remsync::client::upload_cycle;
use remsync::crawl::{build_crawlers, Crawler};
use remsync::monitor::Monitor;
use remsync::server::handle_connection;
use remsync::snapshot::{RootFiles, Snapshot};
use remsync::{ServerConfig, SyncError};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

fn server_config(root: &TempDir) -> ServerConfig {
	ServerConfig {
		roots: vec![root.path().to_path_buf()],
		scan_interval_secs: 1,
		idle_timeout_secs: 5,
		..Default::default()
	}
}

/// Monitor for the server side, with the first crawl already published
async fn started_monitor(config: &ServerConfig) -> Arc<Monitor> {
	let crawlers = build_crawlers(&config.roots, &config.exclude_patterns).unwrap();
	let monitor = Arc::new(Monitor::start(crawlers, config.scan_interval()));

	let mut rx = monitor.subscribe();
	tokio::time::timeout(Duration::from_secs(5), rx.changed()).await.unwrap().unwrap();
	monitor
}

fn local_snapshot(root: &TempDir) -> Snapshot {
	let crawler = Crawler::new(root.path(), &[]).unwrap();
	Snapshot { roots: vec![crawler.crawl_and_hash(&RootFiles::new()).unwrap()] }
}

#[tokio::test]
async fn test_upload_cycle_fills_empty_receiver() {
	let src = TempDir::new().unwrap();
	let dst = TempDir::new().unwrap();
	fs::write(src.path().join("a.txt"), b"hello").unwrap();

	let config = server_config(&dst);
	let monitor = started_monitor(&config).await;

	let (mut client_side, server_side) = tokio::io::duplex(64 * 1024);
	let server = {
		let monitor = monitor.clone();
		let config = config.clone();
		tokio::spawn(async move { handle_connection(server_side, &monitor, &config).await })
	};

	let snapshot = local_snapshot(&src);
	let mut buf = Vec::new();
	let roots = vec![src.path().to_path_buf()];

	let report =
		upload_cycle(&mut client_side, &mut buf, &snapshot, &roots, READ_TIMEOUT).await.unwrap();

	assert_eq!(report.files, 1);
	assert_eq!(report.bytes, 5);
	assert_eq!(report.failed, 0);
	assert_eq!(fs::read(dst.path().join("a.txt")).unwrap(), b"hello");

	monitor.stop();
	drop(client_side);
	assert!(server.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_identical_trees_produce_no_upload() {
	let src = TempDir::new().unwrap();
	let dst = TempDir::new().unwrap();
	fs::write(src.path().join("a.txt"), b"hello").unwrap();
	fs::write(dst.path().join("a.txt"), b"hello").unwrap();

	let config = server_config(&dst);
	let monitor = started_monitor(&config).await;

	let (mut client_side, server_side) = tokio::io::duplex(64 * 1024);
	let server = {
		let monitor = monitor.clone();
		let config = config.clone();
		tokio::spawn(async move { handle_connection(server_side, &monitor, &config).await })
	};

	let snapshot = local_snapshot(&src);
	let mut buf = Vec::new();
	let roots = vec![src.path().to_path_buf()];

	let report =
		upload_cycle(&mut client_side, &mut buf, &snapshot, &roots, READ_TIMEOUT).await.unwrap();

	// Identical digests: nothing flagged, no upload message sent
	assert_eq!(report.files, 0);
	assert_eq!(report.bytes, 0);

	monitor.stop();
	drop(client_side);
	assert!(server.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_second_cycle_after_edit_transfers_only_change() {
	let src = TempDir::new().unwrap();
	let dst = TempDir::new().unwrap();
	fs::write(src.path().join("a.txt"), b"hello").unwrap();
	fs::write(src.path().join("b.txt"), b"stays").unwrap();
	fs::write(dst.path().join("a.txt"), b"hello").unwrap();
	fs::write(dst.path().join("b.txt"), b"stays").unwrap();

	let config = server_config(&dst);
	let monitor = started_monitor(&config).await;

	let (mut client_side, server_side) = tokio::io::duplex(64 * 1024);
	let server = {
		let monitor = monitor.clone();
		let config = config.clone();
		tokio::spawn(async move { handle_connection(server_side, &monitor, &config).await })
	};

	fs::write(src.path().join("a.txt"), b"hello v2").unwrap();
	let snapshot = local_snapshot(&src);
	let mut buf = Vec::new();
	let roots = vec![src.path().to_path_buf()];

	let report =
		upload_cycle(&mut client_side, &mut buf, &snapshot, &roots, READ_TIMEOUT).await.unwrap();

	assert_eq!(report.files, 1);
	assert_eq!(fs::read(dst.path().join("a.txt")).unwrap(), b"hello v2");
	assert_eq!(fs::read(dst.path().join("b.txt")).unwrap(), b"stays");

	monitor.stop();
	drop(client_side);
	assert!(server.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_root_arity_mismatch_kills_connection() {
	let dst = TempDir::new().unwrap();
	let config = server_config(&dst);
	let monitor = started_monitor(&config).await;

	let (mut client_side, server_side) = tokio::io::duplex(64 * 1024);
	let server = {
		let monitor = monitor.clone();
		let config = config.clone();
		tokio::spawn(async move { handle_connection(server_side, &monitor, &config).await })
	};

	// Two roots against a server configured with one
	let snapshot = Snapshot::empty(2);
	let mut buf = Vec::new();
	let roots = vec![dst.path().to_path_buf(), dst.path().to_path_buf()];

	let result = upload_cycle(&mut client_side, &mut buf, &snapshot, &roots, READ_TIMEOUT).await;
	assert!(result.is_err());

	let server_result = server.await.unwrap();
	assert!(matches!(server_result, Err(SyncError::RootCountMismatch { .. })));

	monitor.stop();
}

#[tokio::test]
async fn test_idle_connection_times_out() {
	let dst = TempDir::new().unwrap();
	let mut config = server_config(&dst);
	config.idle_timeout_secs = 1;
	let monitor = started_monitor(&config).await;

	let (client_side, server_side) = tokio::io::duplex(64 * 1024);
	let result = handle_connection(server_side, &monitor, &config).await;

	assert!(matches!(result, Err(SyncError::Timeout)));
	monitor.stop();
	drop(client_side);
}

// vim: ts=4
