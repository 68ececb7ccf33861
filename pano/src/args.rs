//! Arguments

// Imports
use {pano_util::Size, std::path::PathBuf};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
#[command(about = "Pans the latest panorama of a webcam archive")]
pub struct Args {
	/// Config file.
	///
	/// Defaults to `config.toml` in the data directory.
	#[clap(long = "config")]
	pub config: Option<PathBuf>,

	/// Log file
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Source to show, instead of the configured default
	#[clap(long = "source", short = 's')]
	pub source: Option<String>,

	/// Initial pan speed multiplier
	#[clap(long = "speed")]
	pub speed: Option<f64>,

	/// Viewport size, `WxH`
	#[clap(long = "viewport")]
	pub viewport: Option<Size>,

	/// Developer mode, enables fast-forward
	#[clap(long = "dev")]
	pub dev: bool,

	/// Resolves the latest panorama once, prints it and exits
	#[clap(long = "once")]
	pub once: bool,
}

#[cfg(test)]
mod test {
	use {super::*, clap::Parser};

	#[test]
	fn parse() {
		let args = Args::try_parse_from(["pano", "--source", "station", "--viewport", "1280x720", "--once"])
			.expect("Unable to parse args");

		assert_eq!(args.source.as_deref(), Some("station"), "Source");
		assert_eq!(args.viewport, Some(Size::new(1280, 720)), "Viewport");
		assert!(args.once, "Once");
		assert!(!args.dev, "Dev");
	}

	#[test]
	fn invalid_viewport() {
		assert!(
			Args::try_parse_from(["pano", "--viewport", "wide"]).is_err(),
			"Invalid viewports should be rejected"
		);
	}
}
