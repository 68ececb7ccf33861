//! Controller
//!
//! Owns the session and drives it from a single event loop: loading
//! panoramas, animating them, and reacting to reloads, resizes and commands.

// Imports
use {
	crate::{
		command::{Command, SpeedCommand},
		config::Config,
		fetch::Fetch,
		frames::{Debouncer, FrameLoop},
		image_loader::{ImageLoadError, ImageLoader},
		panner::{BeginOutcome, Panner, Speed},
		resolver::{ManifestLocation, ResolveError, ResolvedPanorama, Resolver},
		source::{PanoramaSource, SourceName, Sources},
		status::Status,
		weather::{CurrentWeather, WeatherClient, WeatherError},
	},
	anyhow::Context,
	chrono::{Local, NaiveDateTime, TimeDelta},
	core::fmt,
	futures::{FutureExt, future::LocalBoxFuture},
	pano_util::Size,
	std::{future, sync::Arc, time::Duration},
	tokio::time::{self, Instant, MissedTickBehavior},
};

/// Session
#[derive(Debug)]
pub struct Session {
	/// Current source
	pub source: Arc<PanoramaSource>,

	/// Displayed panorama
	pub displayed: Option<Displayed>,

	/// Container size
	pub container: Size,

	/// Status
	pub status: Status,

	/// Weather label
	pub weather: Option<String>,
}

/// Displayed panorama
#[derive(PartialEq, Clone, Debug)]
pub struct Displayed {
	/// Panorama
	pub panorama: ResolvedPanorama,

	/// Natural image size
	pub image: Size,
}

/// Reason for a load
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LoadReason {
	/// Startup
	Initial,

	/// Periodic or manual reload
	Reload,

	/// Source was switched
	SourceChange,
}

impl fmt::Display for LoadReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Initial => f.pad("initial"),
			Self::Reload => f.pad("reload"),
			Self::SourceChange => f.pad("source change"),
		}
	}
}

/// Load outcome
#[derive(PartialEq, Clone, Debug)]
pub enum LoadOutcome {
	/// Resolved to the displayed url
	Unchanged(ResolvedPanorama),

	/// Resolved and loaded a new image
	Loaded(Displayed),
}

/// Load error
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// Unable to resolve
	#[error(transparent)]
	Resolve(#[from] ResolveError),

	/// Unable to load the image
	#[error("Unable to load image {url:?}")]
	Image {
		url: String,
		#[source]
		err: ImageLoadError,
	},
}

/// Finished load
#[derive(Debug)]
pub struct LoadResult {
	/// Source the load was started for
	pub source: SourceName,

	/// Reason
	pub reason: LoadReason,

	/// Result
	pub res: Result<LoadOutcome, LoadError>,
}

/// Finished weather fetch
type WeatherResult = (SourceName, Result<CurrentWeather, WeatherError>);

/// Resolves `source` and loads its image, unless it resolves to `current_url`
pub async fn load<F: Fetch>(
	resolver: &Resolver<F>,
	images: &ImageLoader<F>,
	source: &PanoramaSource,
	current_url: Option<&str>,
	now: NaiveDateTime,
) -> Result<LoadOutcome, LoadError> {
	let panorama = resolver.resolve(source, now).await?;
	if current_url == Some(panorama.url.as_str()) {
		return Ok(LoadOutcome::Unchanged(panorama));
	}

	let image = images.load(&panorama.url).await.map_err(|err| LoadError::Image {
		url: panorama.url.clone(),
		err,
	})?;

	Ok(LoadOutcome::Loaded(Displayed { panorama, image }))
}

/// Controller
pub struct Controller<F> {
	/// Session
	session: Session,

	/// All sources
	sources: Sources,

	/// Resolver
	resolver: Resolver<F>,

	/// Image loader
	images: ImageLoader<F>,

	/// Weather client, if enabled
	weather: Option<WeatherClient<F>>,

	/// Panner
	panner: Panner,

	/// Frame loop
	frames: FrameLoop,

	/// Resize debouncer
	resize: Debouncer<Size>,

	/// Reload interval
	reload_interval: Duration,

	/// Whether to keep the pan position when a reload finds a newer image
	preserve_position_on_reload: bool,

	/// Developer mode
	dev: bool,

	/// In-flight load
	pending_load: Option<LocalBoxFuture<'static, LoadResult>>,

	/// In-flight weather fetch
	pending_weather: Option<LocalBoxFuture<'static, WeatherResult>>,
}

impl<F: Fetch + Clone + 'static> Controller<F> {
	/// Creates a new controller, showing `source`
	pub fn new(
		config: &Config,
		sources: Sources,
		source: Arc<PanoramaSource>,
		fetcher: F,
		speed: Speed,
		viewport: Size,
	) -> Result<Self, anyhow::Error> {
		config.validate().context("Invalid config")?;
		let lookback = TimeDelta::from_std(config.probe.lookback).context("Probe lookback is too large")?;
		let manifest = config
			.manifest
			.as_ref()
			.map(|manifest| ManifestLocation::parse(&manifest.location));
		if manifest.is_none() && sources.any_manifest() {
			tracing::warn!("Some sources use the manifest, but no manifest location is configured");
		}

		let resolver = Resolver::new(fetcher.clone(), manifest, lookback, config.probe.min_image_bytes);
		let weather = config
			.weather
			.enabled
			.then(|| WeatherClient::new(fetcher.clone(), config.weather.endpoint.clone()));

		Ok(Self {
			session: Session {
				source,
				displayed: None,
				container: viewport,
				status: Status::Searching,
				weather: None,
			},
			sources,
			resolver,
			images: ImageLoader::new(fetcher),
			weather,
			panner: Panner::new(config.pan.duration, speed).context("Unable to create panner")?,
			frames: FrameLoop::with_frame_rate(config.pan.frame_rate),
			resize: Debouncer::new(config.pan.resize_debounce),
			reload_interval: config.reload_interval,
			preserve_position_on_reload: config.pan.preserve_position_on_reload,
			dev: config.dev,
			pending_load: None,
			pending_weather: None,
		})
	}

	/// Returns the session
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Runs the controller until `quit` or ctrl-c
	pub async fn run(&mut self, commands_rx: async_channel::Receiver<Command>) -> Result<(), anyhow::Error> {
		tracing::info!(
			source = %self.session.source.display_name,
			container = %self.session.container,
			speed = %self.panner.speed(),
			frame_duration = ?self.frames.frame_duration(),
			reload_interval = %humantime::format_duration(self.reload_interval),
			"Starting"
		);
		self.start_load(LoadReason::Initial);

		let mut reload = time::interval_at(Instant::now() + self.reload_interval, self.reload_interval);
		reload.set_missed_tick_behavior(MissedTickBehavior::Delay);

		let ctrl_c = tokio::signal::ctrl_c();
		tokio::pin!(ctrl_c);
		let mut commands_open = true;

		loop {
			tokio::select! {
				load = Self::next(&mut self.pending_load) => self.apply_load(load),
				weather = Self::next(&mut self.pending_weather) => self.apply_weather(weather),
				delta = self.frames.next_frame() => self.on_frame(delta),
				container = self.resize.wait() => self.apply_resize(container),
				_ = reload.tick() => self.reload(),

				command = commands_rx.recv(), if commands_open => match command {
					Ok(Command::Quit) => {
						tracing::info!("Quitting");
						break;
					},
					Ok(command) => self.handle_command(command),
					Err(_) => {
						tracing::debug!("Command channel closed");
						commands_open = false;
					},
				},

				res = &mut ctrl_c => {
					res.context("Unable to listen for ctrl-c")?;
					tracing::info!("Received ctrl-c, quitting");
					break;
				},
			}
		}

		Ok(())
	}

	/// Awaits an in-flight future, clearing it once finished.
	///
	/// Never returns if there is none.
	async fn next<T>(pending: &mut Option<LocalBoxFuture<'static, T>>) -> T {
		let Some(fut) = pending.as_mut() else {
			return future::pending().await;
		};

		let output = fut.await;
		*pending = None;
		output
	}

	/// Handles a command
	fn handle_command(&mut self, command: Command) {
		match command {
			Command::Source(name) => self.change_source(&name),
			Command::Speed(speed) => self.set_speed(speed),
			Command::Resize(container) => self.resize(container),
			Command::Reload => self.reload(),
			Command::Status => self.log_status(),
			Command::Quit => tracing::debug!("Quit should be handled by the event loop"),
		}
	}

	/// Starts loading the current source, replacing any in-flight load
	fn start_load(&mut self, reason: LoadReason) {
		let source = Arc::clone(&self.session.source);
		let current_url = self
			.session
			.displayed
			.as_ref()
			.map(|displayed| displayed.panorama.url.clone());
		if reason != LoadReason::Reload {
			self.set_status(Status::Searching);
		}

		tracing::debug!(source = %source.name, %reason, "Starting load");
		let resolver = self.resolver.clone();
		let images = self.images.clone();
		let now = Local::now().naive_local();
		let load = async move {
			let res = self::load(&resolver, &images, &source, current_url.as_deref(), now).await;
			LoadResult {
				source: source.name.clone(),
				reason,
				res,
			}
		};

		if self.pending_load.replace(load.boxed_local()).is_some() {
			tracing::debug!("Replaced in-flight load");
		}
	}

	/// Applies a finished load
	fn apply_load(&mut self, load: LoadResult) {
		if load.source != self.session.source.name {
			tracing::debug!(source = %load.source, "Discarding load of a previous source");
			return;
		}

		match load.res {
			Ok(LoadOutcome::Unchanged(panorama)) => {
				tracing::debug!(url = %panorama.url, "Panorama unchanged");
				self.set_status(Status::Latest(panorama.timestamp));
			},
			Ok(LoadOutcome::Loaded(displayed)) => {
				let preserve_position = load.reason == LoadReason::Reload && self.preserve_position_on_reload;
				tracing::info!(
					url = %displayed.panorama.url,
					image = %displayed.image,
					reason = %load.reason,
					preserve_position,
					"Showing new panorama"
				);

				self.frames.cancel();
				let outcome = self
					.panner
					.begin(displayed.image, self.session.container, preserve_position);
				// A pending resize restarts the animation once it settles
				if matches!(outcome, BeginOutcome::Started(_)) && !self.resize.is_pending() {
					self.frames.start();
				}

				self.set_status(Status::Latest(displayed.panorama.timestamp));
				self.session.displayed = Some(displayed);
			},
			Err(err) => match load.reason {
				LoadReason::Reload => tracing::warn!("Unable to reload panorama: {err:?}"),
				LoadReason::Initial | LoadReason::SourceChange => {
					tracing::warn!("Unable to load panorama: {err:?}");
					self.set_status(Status::Error(err.to_string()));
				},
			},
		}

		self.start_weather();
	}

	/// Starts fetching the weather of the current source, if enabled
	fn start_weather(&mut self) {
		let Some(client) = self.weather.clone() else {
			return;
		};

		let source = Arc::clone(&self.session.source);
		let fetch = async move {
			let res = client.current(&source.location).await;
			(source.name.clone(), res)
		};
		self.pending_weather = Some(fetch.boxed_local());
	}

	/// Applies a finished weather fetch
	fn apply_weather(&mut self, (source, res): WeatherResult) {
		if source != self.session.source.name {
			tracing::debug!(%source, "Discarding weather of a previous source");
			return;
		}

		match res {
			Ok(weather) => {
				let label = weather.label();
				tracing::info!(%source, "Weather: {label}");
				self.session.weather = Some(label);
			},
			Err(err) => tracing::warn!(%source, "Unable to fetch weather: {err:?}"),
		}
	}

	/// Advances the animation by one frame
	fn on_frame(&mut self, delta: Duration) {
		match self.panner.tick(delta) {
			Some(position) => tracing::trace!(position, "Frame"),
			None => self.frames.cancel(),
		}
	}

	/// Reloads the current source
	fn reload(&mut self) {
		if self.pending_load.is_some() {
			tracing::debug!("Load already in flight, skipping reload");
			return;
		}

		tracing::debug!("Checking for a newer panorama");
		self.start_load(LoadReason::Reload);
	}

	/// Switches to the source `name`
	fn change_source(&mut self, name: &str) {
		let Some(source) = self.sources.get(name) else {
			let available = self.sources.names().map(SourceName::as_str).collect::<Vec<_>>();
			tracing::warn!(name, ?available, "Unknown source");
			return;
		};

		tracing::info!(source = %source.name, "Switching source");
		self.session.source = Arc::clone(source);
		self.session.displayed = None;
		self.session.weather = None;
		self.frames.cancel();
		self.panner.reset();
		self.start_load(LoadReason::SourceChange);
	}

	/// Sets the pan speed
	fn set_speed(&mut self, speed: SpeedCommand) {
		let speed = match speed {
			SpeedCommand::Set(speed) => speed,
			SpeedCommand::FastForward if self.dev => Speed::FAST_FORWARD,
			SpeedCommand::FastForward => {
				tracing::warn!("Fast-forward is only available in developer mode");
				return;
			},
		};

		self.panner.set_speed(speed);
	}

	/// Queues a resize of the container
	fn resize(&mut self, container: Size) {
		tracing::debug!(%container, "Resizing");
		if self.resize.is_pending() {
			tracing::trace!("Replacing pending resize");
		}
		self.frames.cancel();
		self.resize.trigger(container);
	}

	/// Applies a debounced resize
	fn apply_resize(&mut self, container: Size) {
		tracing::info!(%container, "Resized");
		self.session.container = container;

		let Some(displayed) = &self.session.displayed else {
			return;
		};
		if let BeginOutcome::Started(_) = self.panner.on_resize(displayed.image, container) {
			self.frames.start();
		}
	}

	/// Sets the status
	fn set_status(&mut self, status: Status) {
		if self.session.status != status {
			tracing::info!(source = %self.session.source.display_name, "{status}");
			self.session.status = status;
		}
	}

	/// Logs the whole status
	fn log_status(&self) {
		let session = self.session();
		tracing::info!(
			source = %session.source.display_name,
			status = %session.status,
			url = ?session.displayed.as_ref().map(|displayed| &displayed.panorama.url),
			origin = ?session.displayed.as_ref().map(|displayed| displayed.panorama.timestamp_origin),
			container = %session.container,
			speed = %self.panner.speed(),
			position = ?self.panner.state().map(|state| state.position),
			weather = ?session.weather,
			"Status"
		);
	}
}

impl<F> fmt::Debug for Controller<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Controller")
			.field("session", &self.session)
			.field("panner", &self.panner)
			.field("frames", &self.frames)
			.field("pending_load", &self.pending_load.is_some())
			.field("pending_weather", &self.pending_weather.is_some())
			.finish_non_exhaustive()
	}
}
