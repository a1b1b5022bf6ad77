//! Wire protocol: length-prefixed frames and the typed messages they carry

pub mod frame;
pub mod message;

pub use frame::{decode_frame, encode_frame, Frame, HEADER_LEN, MAX_BODY_LEN};
pub use message::{
	encode_request, encode_response, Request, Response, UploadPayload, WriteReport,
};

// vim: ts=4
