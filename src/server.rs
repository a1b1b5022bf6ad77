//! Receiving side: accept-and-dispatch session loop
//!
//! One connection is served at a time; whatever ends it (peer close,
//! idle timeout, protocol violation, root-arity mismatch) closes only
//! that connection and returns the loop to listening. The process never
//! exits for a per-connection failure.

use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::crawl::build_crawlers;
use crate::diff;
use crate::error::SyncError;
use crate::logging::*;
use crate::monitor::Monitor;
use crate::proto::{decode_frame, encode_response, Request, Response};
use crate::writer;

/// Socket read chunk size
const READ_BUF_SIZE: usize = 8192;

/// Validate the roots, start the monitor, and serve forever.
/// Only startup configuration problems (bad root, failed bind) return.
pub async fn serve(config: ServerConfig) -> Result<(), SyncError> {
	let crawlers = build_crawlers(&config.roots, &config.exclude_patterns)?;
	let monitor = Monitor::start(crawlers, config.scan_interval());

	let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
	info!("Listening on port {} for {} root(s)", config.port, config.roots.len());

	loop {
		let (stream, peer) = match listener.accept().await {
			Ok(pair) => pair,
			Err(err) => {
				warn!("Accept failed: {}", err);
				continue;
			}
		};

		info!("Accepted connection from {}", peer);
		match handle_connection(stream, &monitor, &config).await {
			Ok(()) => info!("Peer {} closed the connection", peer),
			Err(err) => warn!("Connection from {} ended: {}", peer, err),
		}
	}
}

/// Per-connection RECEIVE -> DISPATCH -> RESPOND loop.
///
/// Generic over the byte stream so sessions can run over an in-memory
/// duplex in tests exactly as they run over TCP.
pub async fn handle_connection<S>(
	mut stream: S,
	monitor: &Monitor,
	config: &ServerConfig,
) -> Result<(), SyncError>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let mut buf: Vec<u8> = Vec::new();
	let mut chunk = [0u8; READ_BUF_SIZE];

	loop {
		while let Some(frame) = decode_frame(&mut buf)? {
			let request = Request::from_frame(frame)?;
			let response = dispatch(request, monitor, &config.roots).await?;
			let bytes = encode_response(&response)?;
			stream.write_all(&bytes).await?;
			stream.flush().await?;
		}

		let n = match timeout(config.idle_timeout(), stream.read(&mut chunk)).await {
			Ok(Ok(n)) => n,
			Ok(Err(err)) => return Err(err.into()),
			Err(_) => return Err(SyncError::Timeout),
		};

		if n == 0 {
			// Orderly shutdown by the peer
			return Ok(());
		}
		buf.extend_from_slice(&chunk[..n]);
	}
}

async fn dispatch(
	request: Request,
	monitor: &Monitor,
	roots: &[PathBuf],
) -> Result<Response, SyncError> {
	match request {
		Request::Ping => Ok(Response::PingAck),

		Request::Diff(sender) => {
			let ours = monitor.snapshot();
			let needed = diff::diff(&sender, &ours)?;
			let flagged: usize = needed.iter().map(Vec::len).sum();
			info!("Diff: sender holds {} file(s), {} needed here", sender.file_count(), flagged);
			Ok(Response::DiffResult(needed))
		}

		Request::Upload(payload) => {
			let report = writer::write_files(roots, &payload).await?;
			info!(
				"Upload materialised: {} file(s), {} bytes, {} failed",
				report.files, report.bytes, report.failed
			);
			Ok(Response::UploadAck(report))
		}
	}
}

// vim: ts=4
