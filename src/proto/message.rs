//! Typed request/response messages
//!
//! The closed enums below map to the wire tags at the codec boundary.
//! Even tags are requests, odd tags are responses, and each response tag
//! is its request tag plus one; the enums make that hold by construction
//! instead of by runtime assertion on every dispatch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::frame::{self, Frame};
use crate::error::ProtocolError;
use crate::snapshot::Snapshot;

pub const TAG_PING: i32 = 0;
pub const TAG_PING_ACK: i32 = 1;
pub const TAG_DIFF: i32 = 2;
pub const TAG_DIFF_RESULT: i32 = 3;
pub const TAG_UPLOAD: i32 = 4;
pub const TAG_UPLOAD_ACK: i32 = 5;

/// Per-root mapping of relative path to base64-encoded file content
pub type UploadPayload = Vec<BTreeMap<String, String>>;

/// What the receiver did with an upload batch. Observability only: the
/// sender logs it and never branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
	/// Files written successfully
	pub files: u64,

	/// Total decoded bytes written
	pub bytes: u64,

	/// Files skipped after a per-file failure
	pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DiffResultBody {
	roots: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UploadBody {
	roots: UploadPayload,
}

/// Client-to-server messages
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
	/// Liveness probe, empty body
	Ping,

	/// Sender's current snapshot; the server answers with what it needs
	Diff(Snapshot),

	/// Encoded content for the paths the server asked for
	Upload(UploadPayload),
}

/// Server-to-client messages
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
	PingAck,

	/// Per-root relative paths the server is missing or holds stale
	DiffResult(Vec<Vec<String>>),

	/// Write report for the upload batch just materialised
	UploadAck(WriteReport),
}

fn malformed(e: impl std::fmt::Display) -> ProtocolError {
	ProtocolError::MalformedBody { message: e.to_string() }
}

impl Request {
	pub const fn tag(&self) -> i32 {
		match self {
			Request::Ping => TAG_PING,
			Request::Diff(_) => TAG_DIFF,
			Request::Upload(_) => TAG_UPLOAD,
		}
	}

	pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
		let body = match self {
			Request::Ping => serde_json::json!({}),
			Request::Diff(snapshot) => serde_json::to_value(snapshot).map_err(malformed)?,
			Request::Upload(payload) => {
				serde_json::to_value(UploadBody { roots: payload.clone() }).map_err(malformed)?
			}
		};
		Ok(Frame { tag: self.tag(), body })
	}

	pub fn from_frame(frame: Frame) -> Result<Self, ProtocolError> {
		match frame.tag {
			TAG_PING => Ok(Request::Ping),
			TAG_DIFF => {
				let snapshot: Snapshot = serde_json::from_value(frame.body).map_err(malformed)?;
				Ok(Request::Diff(snapshot))
			}
			TAG_UPLOAD => {
				let body: UploadBody = serde_json::from_value(frame.body).map_err(malformed)?;
				Ok(Request::Upload(body.roots))
			}
			tag => Err(ProtocolError::UnknownTag { tag }),
		}
	}
}

impl Response {
	pub const fn tag(&self) -> i32 {
		match self {
			Response::PingAck => TAG_PING_ACK,
			Response::DiffResult(_) => TAG_DIFF_RESULT,
			Response::UploadAck(_) => TAG_UPLOAD_ACK,
		}
	}

	pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
		let body = match self {
			Response::PingAck => serde_json::json!({}),
			Response::DiffResult(roots) => {
				serde_json::to_value(DiffResultBody { roots: roots.clone() }).map_err(malformed)?
			}
			Response::UploadAck(report) => serde_json::to_value(report).map_err(malformed)?,
		};
		Ok(Frame { tag: self.tag(), body })
	}

	pub fn from_frame(frame: Frame) -> Result<Self, ProtocolError> {
		match frame.tag {
			TAG_PING_ACK => Ok(Response::PingAck),
			TAG_DIFF_RESULT => {
				let body: DiffResultBody =
					serde_json::from_value(frame.body).map_err(malformed)?;
				Ok(Response::DiffResult(body.roots))
			}
			TAG_UPLOAD_ACK => {
				let report: WriteReport = serde_json::from_value(frame.body).map_err(malformed)?;
				Ok(Response::UploadAck(report))
			}
			tag => Err(ProtocolError::UnknownTag { tag }),
		}
	}
}

/// Encode a request into wire bytes
pub fn encode_request(request: &Request) -> Result<Vec<u8>, ProtocolError> {
	frame::encode_frame(&request.to_frame()?)
}

/// Encode a response into wire bytes
pub fn encode_response(response: &Response) -> Result<Vec<u8>, ProtocolError> {
	let frame = response.to_frame()?;
	// Self-check against programmer error, not input validation
	debug_assert!(frame.tag % 2 == 1, "response tags must be odd");
	frame::encode_frame(&frame)
}


// vim: ts=4
