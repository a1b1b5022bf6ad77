//! Error types for remsync operations

use std::error::Error;
use std::fmt;
use std::io;

/// Main error type for sync operations
#[derive(Debug)]
pub enum SyncError {
	/// The two sides disagree on how many roots are being synchronised
	RootCountMismatch { sender: usize, receiver: usize },

	/// Crawl error (nested)
	Crawl(CrawlError),

	/// Protocol error (nested)
	Protocol(ProtocolError),

	/// Peer closed the connection mid-exchange
	Disconnected,

	/// Read or connect deadline elapsed
	Timeout,

	/// I/O error
	Io(io::Error),
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::RootCountMismatch { sender, receiver } => {
				write!(f, "Root count mismatch: sender={}, receiver={}", sender, receiver)
			}
			SyncError::Crawl(e) => write!(f, "Crawl error: {}", e),
			SyncError::Protocol(e) => write!(f, "Protocol error: {}", e),
			SyncError::Disconnected => write!(f, "Connection disconnected"),
			SyncError::Timeout => write!(f, "Connection timeout"),
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SyncError {}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

impl From<CrawlError> for SyncError {
	fn from(e: CrawlError) -> Self {
		SyncError::Crawl(e)
	}
}

impl From<ProtocolError> for SyncError {
	fn from(e: ProtocolError) -> Self {
		SyncError::Protocol(e)
	}
}

/// Crawler configuration and traversal errors
#[derive(Debug)]
pub enum CrawlError {
	/// Configured root does not exist
	RootMissing { path: String },

	/// Configured root exists but is not a directory
	NotADirectory { path: String },

	/// An exclusion pattern failed to compile
	InvalidPattern { pattern: String, message: String },

	/// I/O error reading the root directory
	Io(io::Error),
}

impl fmt::Display for CrawlError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CrawlError::RootMissing { path } => write!(f, "Root directory missing: {}", path),
			CrawlError::NotADirectory { path } => {
				write!(f, "Root is not a directory: {}", path)
			}
			CrawlError::InvalidPattern { pattern, message } => {
				write!(f, "Invalid exclusion pattern '{}': {}", pattern, message)
			}
			CrawlError::Io(e) => write!(f, "Crawl I/O error: {}", e),
		}
	}
}

impl Error for CrawlError {}

impl From<io::Error> for CrawlError {
	fn from(e: io::Error) -> Self {
		CrawlError::Io(e)
	}
}

/// Wire protocol errors, fatal for the connection that hit them
#[derive(Debug)]
pub enum ProtocolError {
	/// Frame header declares an implausible body length
	BodyTooLarge { declared: u32, max: u32 },

	/// Frame body is not valid serialised data
	MalformedBody { message: String },

	/// Message type tag outside the known vocabulary
	UnknownTag { tag: i32 },

	/// Peer answered with the wrong response type
	UnexpectedResponse { tag: i32 },
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProtocolError::BodyTooLarge { declared, max } => {
				write!(f, "Declared body length {} exceeds maximum {}", declared, max)
			}
			ProtocolError::MalformedBody { message } => {
				write!(f, "Malformed message body: {}", message)
			}
			ProtocolError::UnknownTag { tag } => write!(f, "Unknown message tag: {}", tag),
			ProtocolError::UnexpectedResponse { tag } => {
				write!(f, "Unexpected response tag: {}", tag)
			}
		}
	}
}

impl Error for ProtocolError {}

// vim: ts=4
