//! Configuration

// Imports
use {
	crate::{panner::Speed, slot::Cadence, source::GeoLocation},
	anyhow::Context,
	pano_util::Size,
	std::{
		collections::BTreeMap,
		io,
		path::{Path, PathBuf},
		time::Duration,
	},
};

/// Configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// Log file
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub log_file: Option<PathBuf>,

	/// Source shown on startup
	#[serde(default = "Config::default_source")]
	pub default_source: String,

	/// How often to check for a newer panorama.
	///
	/// Defaults to 15 minutes regardless of the weather. When the weather is
	/// enabled, `5m` keeps its label fresher, since it's only refetched on reloads.
	#[serde(default = "Config::default_reload_interval", with = "humantime_serde")]
	pub reload_interval: Duration,

	/// Developer mode.
	///
	/// Enables the fast-forward speed.
	#[serde(default)]
	pub dev: bool,

	/// Panning
	#[serde(default)]
	pub pan: PanConfig,

	/// Archive probing
	#[serde(default)]
	pub probe: ProbeConfig,

	/// Manifest, for sources in manifest mode
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub manifest: Option<ManifestConfig>,

	/// Weather
	#[serde(default)]
	pub weather: WeatherConfig,

	/// All sources, by name
	#[serde(default = "Config::default_sources")]
	pub sources: BTreeMap<String, Source>,
}

impl Config {
	/// Tries to load the config
	///
	/// If it doesn't exist, creates a default config and writes it.
	/// If it's otherwise unreadable, uses the default config without overwriting it.
	pub fn get_or_create_default(path: &Path) -> Self {
		match Self::load(path) {
			Ok(config) => config,
			Err(err) => {
				let config = Self::default();
				let not_found = err
					.downcast_ref::<io::Error>()
					.is_some_and(|err| err.kind() == io::ErrorKind::NotFound);
				match not_found {
					true => {
						tracing::info!(?path, "No config found, creating default");
						if let Err(err) = config.write(path) {
							tracing::warn!("Unable to write default config: {err:?}");
						}
					},
					false => tracing::warn!("Unable to load config, using default: {err:?}"),
				}

				config
			},
		}
	}

	/// Loads the config
	fn load(path: &Path) -> Result<Self, anyhow::Error> {
		tracing::debug!(?path, "Loading config");

		let config_toml = std::fs::read_to_string(path)?;
		let config = toml::from_str::<Self>(&config_toml).context("Unable to parse config")?;
		config.validate().context("Invalid config")?;

		Ok(config)
	}

	/// Checks values that parse fine, but can't be used
	pub fn validate(&self) -> Result<(), anyhow::Error> {
		anyhow::ensure!(!self.reload_interval.is_zero(), "`reload_interval` must be non-zero");
		anyhow::ensure!(!self.pan.duration.is_zero(), "`pan.duration` must be non-zero");
		anyhow::ensure!(self.pan.frame_rate != 0, "`pan.frame_rate` must be non-zero");
		anyhow::ensure!(
			Speed::new(self.pan.speed).is_some(),
			"`pan.speed` must be finite and non-negative, found {}",
			self.pan.speed
		);

		Ok(())
	}

	/// Writes the config
	fn write(&self, path: &Path) -> Result<(), anyhow::Error> {
		let config_toml = toml::to_string_pretty(self).context("Unable to serialize config")?;
		std::fs::write(path, config_toml.as_bytes()).context("Unable to write config")?;

		Ok(())
	}

	fn default_source() -> String {
		"village".to_owned()
	}

	fn default_reload_interval() -> Duration {
		Duration::from_secs(15 * 60)
	}

	fn default_sources() -> BTreeMap<String, Source> {
		let archive = |name: &str, url: &str, cadence, latitude, longitude| Source {
			name:     name.to_owned(),
			location: GeoLocation { latitude, longitude },
			mode:     SourceMode::Archive {
				url: url.to_owned(),
				cadence,
			},
		};

		[
			(
				"village",
				archive(
					"Village",
					"https://data.skaping.com/le-grand-bornand/village",
					Cadence::Regular,
					45.9419,
					6.4283,
				),
			),
			(
				"station",
				archive(
					"Station",
					"https://data3.skaping.com/grand-bornand/chinaillon",
					Cadence::FixedOffset,
					45.9727,
					6.4625,
				),
			),
			(
				"maroly",
				archive(
					"Maroly",
					"https://data3.skaping.com/grand-bornand/terres-rouges",
					Cadence::Regular,
					45.9608,
					6.4814,
				),
			),
			(
				"lachat",
				archive(
					"Lachat",
					"https://data.skaping.com/grand-bornand/la-floria",
					Cadence::Regular,
					45.9281,
					6.4186,
				),
			),
		]
		.into_iter()
		.map(|(key, source)| (key.to_owned(), source))
		.collect()
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_file:        None,
			default_source:  Self::default_source(),
			reload_interval: Self::default_reload_interval(),
			dev:             false,
			pan:             PanConfig::default(),
			probe:           ProbeConfig::default(),
			manifest:        None,
			weather:         WeatherConfig::default(),
			sources:         Self::default_sources(),
		}
	}
}

/// Source configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Source {
	/// Name shown to the user
	pub name: String,

	/// Location
	#[serde(flatten)]
	pub location: GeoLocation,

	/// Resolution mode
	#[serde(flatten)]
	pub mode: SourceMode,
}

/// Source resolution mode
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SourceMode {
	/// Probe the archive directly
	Archive {
		/// Base url of the archive
		url: String,

		/// Capture cadence
		#[serde(default)]
		cadence: Cadence,
	},

	/// Look up the manifest, using the source name as key
	Manifest,
}

/// Panning configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PanConfig {
	/// Time to traverse one image width at speed 1
	#[serde(default = "PanConfig::default_duration", with = "humantime_serde")]
	pub duration: Duration,

	/// Frames per second of the animation loop
	#[serde(default = "PanConfig::default_frame_rate")]
	pub frame_rate: u32,

	/// Initial speed multiplier
	#[serde(default = "PanConfig::default_speed")]
	pub speed: f64,

	/// Quiet period before applying a resize
	#[serde(default = "PanConfig::default_resize_debounce", with = "humantime_serde")]
	pub resize_debounce: Duration,

	/// Initial viewport size
	#[serde(default = "PanConfig::default_viewport")]
	pub viewport: Size,

	/// Whether to keep the pan position when a newer image is loaded
	#[serde(default = "PanConfig::default_preserve_position")]
	pub preserve_position_on_reload: bool,
}

impl PanConfig {
	fn default_duration() -> Duration {
		Duration::from_secs(180)
	}

	fn default_frame_rate() -> u32 {
		60
	}

	fn default_speed() -> f64 {
		1.0
	}

	fn default_resize_debounce() -> Duration {
		Duration::from_millis(150)
	}

	fn default_viewport() -> Size {
		Size::new(1920, 1080)
	}

	fn default_preserve_position() -> bool {
		true
	}
}

impl Default for PanConfig {
	fn default() -> Self {
		Self {
			duration:                    Self::default_duration(),
			frame_rate:                  Self::default_frame_rate(),
			speed:                       Self::default_speed(),
			resize_debounce:             Self::default_resize_debounce(),
			viewport:                    Self::default_viewport(),
			preserve_position_on_reload: Self::default_preserve_position(),
		}
	}
}

/// Archive probing configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ProbeConfig {
	/// How far back to look for an image
	#[serde(default = "ProbeConfig::default_lookback", with = "humantime_serde")]
	pub lookback: Duration,

	/// Images at or below this size are considered placeholders
	#[serde(default = "ProbeConfig::default_min_image_bytes")]
	pub min_image_bytes: u64,

	/// Timeout for each request
	#[serde(default = "ProbeConfig::default_timeout", with = "humantime_serde")]
	pub timeout: Duration,
}

impl ProbeConfig {
	fn default_lookback() -> Duration {
		Duration::from_secs(48 * 60 * 60)
	}

	fn default_min_image_bytes() -> u64 {
		50_000
	}

	fn default_timeout() -> Duration {
		Duration::from_secs(10)
	}
}

impl Default for ProbeConfig {
	fn default() -> Self {
		Self {
			lookback:        Self::default_lookback(),
			min_image_bytes: Self::default_min_image_bytes(),
			timeout:         Self::default_timeout(),
		}
	}
}

/// Manifest configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ManifestConfig {
	/// Manifest location.
	///
	/// Either a `http(s)://` url or a local path.
	pub location: String,
}

/// Weather configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WeatherConfig {
	/// Whether to fetch the weather
	#[serde(default)]
	pub enabled: bool,

	/// Current weather endpoint
	#[serde(default = "WeatherConfig::default_endpoint")]
	pub endpoint: String,
}

impl WeatherConfig {
	fn default_endpoint() -> String {
		"https://api.open-meteo.com/v1/forecast".to_owned()
	}
}

impl Default for WeatherConfig {
	fn default() -> Self {
		Self {
			enabled:  false,
			endpoint: Self::default_endpoint(),
		}
	}
}
