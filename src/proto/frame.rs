//! Message framing
//!
//! A frame is an 8-byte header (type tag: i32 big-endian, body length:
//! u32 big-endian) followed by exactly `body length` bytes of JSON.
//! Only the header is binary-exact; the body just has to round-trip the
//! structured types in use (strings, integers, floats, lists, maps,
//! booleans).

use serde_json::Value;

use crate::error::ProtocolError;

/// Size of the fixed frame header in bytes
pub const HEADER_LEN: usize = 8;

/// Upper bound on a declared body length. Anything larger is a corrupted
/// or hostile stream, fatal for the connection.
pub const MAX_BODY_LEN: u32 = 256 * 1024 * 1024;

/// A decoded wire frame: raw tag plus structured body
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
	pub tag: i32,
	pub body: Value,
}

/// Serialise a frame to header + body bytes. Never emits a partial frame.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, ProtocolError> {
	let body = serde_json::to_vec(&frame.body)
		.map_err(|e| ProtocolError::MalformedBody { message: e.to_string() })?;

	if body.len() > MAX_BODY_LEN as usize {
		return Err(ProtocolError::BodyTooLarge { declared: body.len() as u32, max: MAX_BODY_LEN });
	}

	let mut out = Vec::with_capacity(HEADER_LEN + body.len());
	out.extend_from_slice(&frame.tag.to_be_bytes());
	out.extend_from_slice(&(body.len() as u32).to_be_bytes());
	out.extend_from_slice(&body);
	Ok(out)
}

/// Streaming decoder over an accumulation buffer.
///
/// Returns `Ok(None)` and leaves the buffer untouched while it holds
/// less than a whole frame; the caller appends more bytes and retries.
/// This is how framing tolerates partial TCP reads. On success the
/// consumed frame is drained from the front of the buffer.
pub fn decode_frame(buf: &mut Vec<u8>) -> Result<Option<Frame>, ProtocolError> {
	if buf.len() < HEADER_LEN {
		return Ok(None);
	}

	let tag = i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
	let body_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);

	if body_len > MAX_BODY_LEN {
		return Err(ProtocolError::BodyTooLarge { declared: body_len, max: MAX_BODY_LEN });
	}

	let total = HEADER_LEN + body_len as usize;
	if buf.len() < total {
		return Ok(None);
	}

	let body: Value = serde_json::from_slice(&buf[HEADER_LEN..total])
		.map_err(|e| ProtocolError::MalformedBody { message: e.to_string() })?;

	buf.drain(..total);
	Ok(Some(Frame { tag, body }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_round_trip_nested_body() {
		let frame = Frame {
			tag: 42,
			body: json!({
				"name": "rui",
				"count": 7,
				"ratio": 0.5,
				"flags": [true, false],
				"nested": {"list": ["will", "it", "work", "?"]},
			}),
		};

		let mut buf = encode_frame(&frame).unwrap();
		let decoded = decode_frame(&mut buf).unwrap().unwrap();

		assert_eq!(decoded, frame);
		assert!(buf.is_empty());
	}

	#[test]
	fn test_round_trip_negative_tag_and_empty_body() {
		let frame = Frame { tag: -3, body: json!({}) };
		let mut buf = encode_frame(&frame).unwrap();
		let decoded = decode_frame(&mut buf).unwrap().unwrap();
		assert_eq!(decoded, frame);
		assert!(buf.is_empty());
	}

	#[test]
	fn test_partial_frames_byte_at_a_time() {
		let frame = Frame { tag: 2, body: json!({"key": "value"}) };
		let encoded = encode_frame(&frame).unwrap();

		let mut buf = Vec::new();
		for (i, byte) in encoded.iter().enumerate() {
			buf.push(*byte);
			let result = decode_frame(&mut buf).unwrap();
			if i + 1 < encoded.len() {
				assert!(result.is_none(), "decoded early at byte {}", i);
				assert_eq!(buf.len(), i + 1, "buffer consumed early at byte {}", i);
			} else {
				assert_eq!(result.unwrap(), frame);
				assert!(buf.is_empty());
			}
		}
	}

	#[test]
	fn test_trailing_bytes_stay_in_buffer() {
		let first = Frame { tag: 0, body: json!({}) };
		let second = Frame { tag: 4, body: json!({"more": 1}) };

		let mut buf = encode_frame(&first).unwrap();
		buf.extend_from_slice(&encode_frame(&second).unwrap());

		assert_eq!(decode_frame(&mut buf).unwrap().unwrap(), first);
		assert_eq!(decode_frame(&mut buf).unwrap().unwrap(), second);
		assert!(buf.is_empty());
	}

	#[test]
	fn test_implausible_body_length_is_fatal() {
		let mut buf = Vec::new();
		buf.extend_from_slice(&0i32.to_be_bytes());
		buf.extend_from_slice(&u32::MAX.to_be_bytes());

		let err = decode_frame(&mut buf).unwrap_err();
		assert!(matches!(err, ProtocolError::BodyTooLarge { .. }));
	}

	#[test]
	fn test_garbage_body_is_fatal() {
		let mut buf = Vec::new();
		buf.extend_from_slice(&1i32.to_be_bytes());
		buf.extend_from_slice(&4u32.to_be_bytes());
		buf.extend_from_slice(b"\xff\xfe\x00\x01");

		let err = decode_frame(&mut buf).unwrap_err();
		assert!(matches!(err, ProtocolError::MalformedBody { .. }));
	}
}

// vim: ts=4
