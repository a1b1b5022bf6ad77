//! Logging prelude module for convenient access to tracing macros.
//!
//! Re-exports the common tracing macros so call sites stay terse and
//! consistent across the codebase.

pub use tracing::{debug, error, info, trace, warn};

/// Initialize the tracing subscriber with environment filter support.
///
/// The `-v` count on the command line picks the default level (info,
/// debug, trace); `RUST_LOG` overrides it when set:
///
/// ```bash
/// RUST_LOG=remsync::server=debug remsync remote -p 8082 /srv/mirror
/// ```
pub fn init_tracing(verbosity: u8) {
	let default_filter = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};

	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
		)
		.with_writer(std::io::stderr)
		.init();
}

// vim: ts=4
