//! Telemetry setup for tracing and logging.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{
	filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Parse a `--log-level` value.
///
/// Returns `None` for an empty string, which defers to `RUST_LOG`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
	match level.to_lowercase().as_str() {
		"" => None,
		"disabled" | "off" => Some(LevelFilter::OFF),
		"trace" => Some(LevelFilter::TRACE),
		"debug" => Some(LevelFilter::DEBUG),
		"warn" | "warning" => Some(LevelFilter::WARN),
		"error" | "fatal" => Some(LevelFilter::ERROR),
		_ => Some(LevelFilter::INFO),
	}
}

/// Initialize tracing with the given log level.
///
/// Priority for log level:
/// 1. `log_level` argument (from --log-level CLI flag)
/// 2. `RUST_LOG` environment variable
/// 3. Default: info
///
/// Output goes to stderr, pretty printed on a terminal and as JSON otherwise,
/// keeping stdout free for diffs.
pub fn init(log_level: Option<LevelFilter>) {
	let filter_layer = match log_level {
		Some(level) => EnvFilter::new(level.to_string()),
		None => EnvFilter::builder()
			.with_default_directive(Level::INFO.into())
			.from_env_lossy(),
	};

	let fmt_layer = if std::io::stderr().is_terminal() {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.pretty()
			.boxed()
	} else {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.json()
			.boxed()
	};

	tracing_subscriber::registry()
		.with(filter_layer)
		.with(fmt_layer)
		.init();
}
