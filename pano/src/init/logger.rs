//! Logger

// Modules
mod pre_init;

// Imports
use {
	self::pre_init::MessageLevel,
	itertools::Itertools,
	std::{
		collections::{HashMap, hash_map},
		env::{self, VarError},
		fs,
		io,
		path::Path,
	},
	tracing::{metadata::LevelFilter, subscriber::DefaultGuard},
	tracing_subscriber::{EnvFilter, prelude::*},
};

/// Logger
///
/// Starts out logging only to stderr, until [`Logger::init_global`]
/// is called with the (possibly configured) log file.
#[derive(Debug)]
pub struct Logger {
	/// Temporary subscriber guard
	_temp_guard: DefaultGuard,
}

impl Logger {
	/// Initializes a temporary stderr-only logger for the current thread
	#[must_use]
	pub fn init_temp() -> Self {
		let term_layer = tracing_subscriber::fmt::layer()
			.with_writer(io::stderr)
			.with_ansi(self::colors_enabled())
			.with_filter(
				EnvFilter::builder()
					.with_default_directive(LevelFilter::INFO.into())
					.parse_lossy(self::get_env_filters("RUST_LOG", "info")),
			);
		let guard = tracing_subscriber::registry().with(term_layer).set_default();

		Self { _temp_guard: guard }
	}

	/// Replaces the temporary logger with the global one.
	///
	/// Logs to both stderr and `log_file`, if any
	pub fn init_global(self, log_file: Option<&Path>) {
		drop(self);

		// Create the terminal layer
		let term_use_colors = self::colors_enabled();
		let term_env = self::get_env_filters("RUST_LOG", "info");
		let term_layer = tracing_subscriber::fmt::layer()
			.with_writer(io::stderr)
			.with_ansi(term_use_colors)
			.pretty()
			.with_filter(
				EnvFilter::builder()
					.with_default_directive(LevelFilter::INFO.into())
					.parse_lossy(term_env),
			);

		// Create the file layer, if requested
		let file_layer = log_file.and_then(|log_file| {
			// Try to create the file
			let file = match fs::File::create(log_file) {
				Ok(file) => file,
				Err(err) => {
					pre_init::warn(format!("Unable to create log file {log_file:?}: {err}"));
					return None;
				},
			};

			// Then create the layer
			let env = self::get_env_filters("RUST_FILE_LOG", "debug");
			let layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_filter(EnvFilter::builder().parse_lossy(env));

			Some(layer)
		});

		// Register all layers to the registry
		let registry = tracing_subscriber::registry().with(term_layer).with(file_layer);

		#[cfg(feature = "tokio-console")]
		let registry = registry.with(console_subscriber::spawn());

		registry.init();
		tracing::debug!(?log_file, ?term_use_colors, "Initialized logging");

		// And emit all pre-init messages
		for (level, message) in pre_init::take() {
			match level {
				MessageLevel::Trace => tracing::trace!("{message}"),
				MessageLevel::Warn => tracing::warn!("{message}"),
			}
		}
	}
}

/// Returns whether to colors should be enabled for the terminal layer.
fn colors_enabled() -> bool {
	match env::var("RUST_LOG_COLOR").map(|var| var.to_lowercase()).as_deref() {
		// By default / `1` / `yes` / `true`, use colors
		Err(VarError::NotPresent) | Ok("1" | "yes" | "true") => true,

		// On `0`, `no`, `false`, don't
		Ok("0" | "no" | "false") => false,

		// Else don't use colors, but warn
		Ok(env) => {
			pre_init::warn(format!(
				"Ignoring unknown `RUST_LOG_COLOR` value: {env:?}, expected `0`, `1`, `yes`, `no`, `true`, `false`"
			));
			false
		},
		Err(VarError::NotUnicode(err)) => {
			pre_init::warn(format!("Ignoring non-utf8 `RUST_LOG_COLOR`: {err:?}"));
			false
		},
	}
}

/// Returns the env filters of a variable.
///
/// Adds default filters, if not specified
#[must_use]
fn get_env_filters(env: &str, default: &str) -> String {
	let var = match env::var(env) {
		Ok(var) => Some(var),
		Err(err) => {
			if let VarError::NotUnicode(var) = err {
				pre_init::warn(format!("Ignoring non-utf8 env variable {env:?}: {var:?}"));
			}

			None
		},
	};

	let filters = self::with_default_filters(var.as_deref(), default);
	pre_init::trace(format!("Using {env}={filters}"));

	filters
}

/// Adds the default filters to `var`, for all sources it doesn't specify.
fn with_default_filters(var: Option<&str>, default: &str) -> String {
	// Http stack is noisy below `warn`
	let default_filters = [
		(None, default),
		(Some("reqwest"), "warn"),
		(Some("hyper"), "warn"),
		(Some("hyper_util"), "warn"),
		(Some("rustls"), "warn"),
		(Some("h2"), "warn"),
	];

	// Split filters by `,`, then src and level by `=`
	let mut cur_filters = var
		.into_iter()
		.flat_map(|var| var.split(','))
		.filter(|s| !s.is_empty())
		.map(|s| match s.split_once('=') {
			Some((src, level)) => (Some(src), level),
			None => (None, s),
		})
		.collect::<HashMap<_, _>>();

	// Add all default filters, if not specified
	for (src, level) in default_filters {
		if let hash_map::Entry::Vacant(entry) = cur_filters.entry(src) {
			_ = entry.insert(level);
		}
	}

	// Then re-create it
	cur_filters
		.into_iter()
		.sorted()
		.map(|(src, level)| match src {
			Some(src) => format!("{src}={level}"),
			None => level.to_owned(),
		})
		.join(",")
}
