//! Panorama viewer
//!
//! Finds the latest panorama of a webcam archive and pans it continuously.

// Modules
mod args;
mod command;
mod config;
mod controller;
mod fetch;
mod frames;
mod image_loader;
mod init;
mod panner;
mod resolver;
mod slot;
mod source;
mod status;
mod weather;

// Imports
use {
	self::{
		args::Args,
		config::Config,
		controller::Controller,
		fetch::HttpFetcher,
		panner::Speed,
		resolver::{ManifestLocation, Resolver},
		source::{PanoramaSource, Sources},
	},
	anyhow::Context,
	chrono::{Local, TimeDelta},
	clap::Parser,
	directories::ProjectDirs,
	std::{fs, time::Duration},
};

fn main() -> Result<(), anyhow::Error> {
	// Initialize stderr-only logging
	let logger = init::Logger::init_temp();

	// Get arguments
	let args = Args::parse();
	tracing::debug!(?args, "Parsed arguments");

	// Load the config
	let config_path = match &args.config {
		Some(path) => path.clone(),
		None => {
			let dirs = ProjectDirs::from("", "", "pano").context("Unable to create app directories")?;
			fs::create_dir_all(dirs.data_dir()).context("Unable to create data directory")?;
			dirs.data_dir().join("config.toml")
		},
	};
	let mut config = Config::get_or_create_default(&config_path);
	config.dev |= args.dev;
	tracing::debug!(?config, "Loaded config");

	// Initialize the logger properly now
	logger.init_global(args.log_file.as_deref().or(config.log_file.as_deref()));

	// Select the source
	let sources = Sources::from_config(&config.sources);
	let source_name = args.source.as_deref().unwrap_or(&config.default_source);
	let source = sources
		.get(source_name)
		.cloned()
		.with_context(|| format!("Unknown source {source_name:?}"))?;

	// Initialize the tokio runtime
	let tokio_runtime = init::tokio_runtime::create().context("Unable to create tokio runtime")?;
	let fetcher = HttpFetcher::new(config.probe.timeout).context("Unable to create http client")?;

	match args.once {
		true => tokio_runtime.block_on(self::resolve_once(&config, &source, fetcher))?,
		false => {
			let speed = args.speed.unwrap_or(config.pan.speed);
			let speed = Speed::new(speed).with_context(|| format!("Invalid speed {speed}"))?;
			let viewport = args.viewport.unwrap_or(config.pan.viewport);

			tokio_runtime.block_on(async {
				let (commands_tx, commands_rx) = async_channel::bounded(16);
				_ = pano_util::spawn_task("Stdin", command::read_stdin(commands_tx));

				let mut controller = Controller::new(&config, sources, source, fetcher, speed, viewport)
					.context("Unable to create controller")?;
				controller.run(commands_rx).await
			})?;
		},
	}

	// Note: Stdin is read on a blocking thread, which won't finish until
	//       the next line, so we can't wait for it.
	tokio_runtime.shutdown_timeout(Duration::from_millis(100));

	tracing::info!("Successfully shutting down");
	Ok(())
}

/// Resolves the latest panorama of `source` and prints it
async fn resolve_once(config: &Config, source: &PanoramaSource, fetcher: HttpFetcher) -> Result<(), anyhow::Error> {
	let lookback = TimeDelta::from_std(config.probe.lookback).context("Probe lookback is too large")?;
	let manifest = config
		.manifest
		.as_ref()
		.map(|manifest| ManifestLocation::parse(&manifest.location));
	let resolver = Resolver::new(fetcher, manifest, lookback, config.probe.min_image_bytes);

	let panorama = resolver
		.resolve(source, Local::now().naive_local())
		.await
		.with_context(|| format!("Unable to resolve panorama of {}", source.display_name))?;

	println!("{}", panorama.url);
	println!("{} ({})", panorama.timestamp.format("%Y-%m-%d %H:%M"), panorama.timestamp_origin);

	Ok(())
}
