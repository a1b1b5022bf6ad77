//! Sending side: connect-retry loop and upload-cycle driver
//!
//! The connection lifecycle is an explicit state machine
//! (Disconnected -> Connected -> cycles -> Disconnected) with the
//! reconnect delay as a transition, so the retry-forever contract is
//! visible in the control flow instead of buried in error handlers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use crate::config::ClientConfig;
use crate::crawl::build_crawlers;
use crate::error::{ProtocolError, SyncError};
use crate::logging::*;
use crate::monitor::Monitor;
use crate::proto::{decode_frame, encode_request, Request, Response, UploadPayload, WriteReport};
use crate::snapshot::Snapshot;

const READ_BUF_SIZE: usize = 8192;

enum State {
	Disconnected,
	Connected(TcpStream),
}

/// Validate the roots, start the monitor, and push forever. The client
/// never gives up on the remote; every connection failure is a delay
/// and a retry. Only startup configuration problems return.
pub async fn run(config: ClientConfig) -> Result<(), SyncError> {
	let crawlers = build_crawlers(&config.roots, &config.exclude_patterns)?;
	let monitor = Monitor::start(crawlers, config.scan_interval());

	let mut state = State::Disconnected;
	loop {
		state = match state {
			State::Disconnected => match connect(&config).await {
				Ok(stream) => {
					info!("Connected to {}:{}", config.host, config.port);
					State::Connected(stream)
				}
				Err(err) => {
					warn!("Connect to {}:{} failed: {}", config.host, config.port, err);
					sleep(config.reconnect_delay()).await;
					State::Disconnected
				}
			},

			State::Connected(mut stream) => {
				match session(&mut stream, &monitor, &config).await {
					Ok(()) => info!("Server closed the connection"),
					Err(err) => warn!("Session ended: {}", err),
				}
				sleep(config.reconnect_delay()).await;
				State::Disconnected
			}
		};
	}
}

async fn connect(config: &ClientConfig) -> Result<TcpStream, SyncError> {
	match timeout(
		config.connect_timeout(),
		TcpStream::connect((config.host.as_str(), config.port)),
	)
	.await
	{
		Ok(Ok(stream)) => Ok(stream),
		Ok(Err(err)) => Err(err.into()),
		Err(_) => Err(SyncError::Timeout),
	}
}

/// Drive upload cycles until the connection dies. Starts with a ping
/// exchange as a liveness handshake, then alternates diff/upload and
/// sleeps the cycle interval.
async fn session<S>(
	stream: &mut S,
	monitor: &Monitor,
	config: &ClientConfig,
) -> Result<(), SyncError>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let mut buf: Vec<u8> = Vec::new();

	match exchange(stream, &mut buf, &Request::Ping, config.read_timeout()).await? {
		Response::PingAck => debug!("Server answered ping"),
		other => return Err(ProtocolError::UnexpectedResponse { tag: other.tag() }.into()),
	}

	loop {
		let snapshot = monitor.snapshot();
		upload_cycle(stream, &mut buf, &snapshot, &config.roots, config.read_timeout()).await?;
		sleep(config.cycle_interval()).await;
	}
}

/// One diff -> upload -> ack pass over an established connection.
/// Returns the receiver's write report, or an all-zero report when the
/// diff flagged nothing and no upload was sent.
pub async fn upload_cycle<S>(
	stream: &mut S,
	buf: &mut Vec<u8>,
	snapshot: &Snapshot,
	roots: &[PathBuf],
	read_timeout: Duration,
) -> Result<WriteReport, SyncError>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let request = Request::Diff(snapshot.clone());
	let needed = match exchange(stream, buf, &request, read_timeout).await? {
		Response::DiffResult(needed) => needed,
		other => return Err(ProtocolError::UnexpectedResponse { tag: other.tag() }.into()),
	};

	if needed.len() != roots.len() {
		return Err(SyncError::RootCountMismatch {
			sender: roots.len(),
			receiver: needed.len(),
		});
	}

	let flagged: usize = needed.iter().map(Vec::len).sum();
	if flagged == 0 {
		debug!("Nothing to transfer");
		return Ok(WriteReport::default());
	}

	let payload = read_payload(roots, &needed).await;
	let encoded_files: usize = payload.iter().map(|m| m.len()).sum();
	info!("Uploading {} of {} flagged file(s)", encoded_files, flagged);

	match exchange(stream, buf, &Request::Upload(payload), read_timeout).await? {
		Response::UploadAck(report) => {
			info!(
				"Upload acknowledged: {} file(s), {} bytes, {} failed",
				report.files, report.bytes, report.failed
			);
			Ok(report)
		}
		other => Err(ProtocolError::UnexpectedResponse { tag: other.tag() }.into()),
	}
}

/// Read and encode the flagged files. A file that vanished since the
/// crawl is logged and dropped from the batch; the next cycle's snapshot
/// will no longer name it.
async fn read_payload(roots: &[PathBuf], needed: &[Vec<String>]) -> UploadPayload {
	let mut payload = UploadPayload::with_capacity(roots.len());

	for (root, paths) in roots.iter().zip(needed) {
		let mut files = BTreeMap::new();
		for rel in paths {
			match tokio::fs::read(root.join(rel)).await {
				Ok(data) => {
					files.insert(rel.clone(), BASE64.encode(&data));
				}
				Err(err) => {
					warn!("Cannot read {} under {}: {}", rel, root.display(), err);
				}
			}
		}
		payload.push(files);
	}

	payload
}

/// Send one request and read frames until its response arrives.
async fn exchange<S>(
	stream: &mut S,
	buf: &mut Vec<u8>,
	request: &Request,
	read_timeout: Duration,
) -> Result<Response, SyncError>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let bytes = encode_request(request)?;
	stream.write_all(&bytes).await?;
	stream.flush().await?;

	let mut chunk = [0u8; READ_BUF_SIZE];
	loop {
		if let Some(frame) = decode_frame(buf)? {
			return Response::from_frame(frame).map_err(Into::into);
		}

		let n = match timeout(read_timeout, stream.read(&mut chunk)).await {
			Ok(Ok(n)) => n,
			Ok(Err(err)) => return Err(err.into()),
			Err(_) => return Err(SyncError::Timeout),
		};

		if n == 0 {
			return Err(SyncError::Disconnected);
		}
		buf.extend_from_slice(&chunk[..n]);
	}
}

// vim: ts=4
