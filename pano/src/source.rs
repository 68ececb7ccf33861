//! Panorama sources

// Imports
use {
	crate::{config, slot::Cadence},
	core::{borrow::Borrow, fmt},
	std::{collections::BTreeMap, sync::Arc},
};

/// Panorama source
#[derive(Clone, Debug)]
pub struct PanoramaSource {
	/// Name
	///
	/// Doubles as the key into the manifest
	pub name: SourceName,

	/// Name shown to the user
	pub display_name: String,

	/// Location
	pub location: GeoLocation,

	/// Resolution mode
	pub mode: SourceMode,
}

/// Source resolution mode
#[derive(Clone, Debug)]
pub enum SourceMode {
	/// Probe the archive directly
	Archive {
		/// Base url of the archive
		base_url: String,

		/// Capture cadence
		cadence: Cadence,
	},

	/// Look up the latest image in the manifest
	Manifest,
}

/// Geographic location
#[derive(PartialEq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GeoLocation {
	/// Latitude, in degrees
	pub latitude: f64,

	/// Longitude, in degrees
	pub longitude: f64,
}

/// All sources
#[derive(Debug)]
pub struct Sources {
	/// Sources by name
	sources: BTreeMap<SourceName, Arc<PanoramaSource>>,
}

impl Sources {
	/// Creates the sources from their configuration
	pub fn from_config(sources: &BTreeMap<String, config::Source>) -> Self {
		let sources = sources
			.iter()
			.map(|(name, source)| {
				let name = SourceName::from(name.clone());
				let mode = match &source.mode {
					config::SourceMode::Archive { url, cadence } => SourceMode::Archive {
						base_url: url.trim_end_matches('/').to_owned(),
						cadence:  *cadence,
					},
					config::SourceMode::Manifest => SourceMode::Manifest,
				};
				let source = PanoramaSource {
					name: name.clone(),
					display_name: source.name.clone(),
					location: source.location,
					mode,
				};

				(name, Arc::new(source))
			})
			.collect();

		Self { sources }
	}

	/// Gets a source by name
	pub fn get(&self, name: &str) -> Option<&Arc<PanoramaSource>> {
		self.sources.get(name)
	}

	/// Returns if any source uses the manifest
	pub fn any_manifest(&self) -> bool {
		self.sources
			.values()
			.any(|source| matches!(source.mode, SourceMode::Manifest))
	}

	/// Returns all source names
	pub fn names(&self) -> impl Iterator<Item = &SourceName> {
		self.sources.keys()
	}
}

/// Source name
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
#[derive(derive_more::Display)]
pub struct SourceName(Arc<str>);

impl SourceName {
	/// Returns this name as a string
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for SourceName {
	fn from(s: String) -> Self {
		Self(s.into())
	}
}

impl From<&str> for SourceName {
	fn from(s: &str) -> Self {
		Self(s.into())
	}
}

impl Borrow<str> for SourceName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SourceName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

#[cfg(test)]
mod test {
	use {super::*, crate::config::Config};

	#[test]
	fn default_sources() {
		let config = Config::default();
		let sources = Sources::from_config(&config.sources);

		let names = sources.names().map(SourceName::as_str).collect::<Vec<_>>();
		assert_eq!(names, ["lachat", "maroly", "station", "village"], "Unexpected default sources");
		assert!(!sources.any_manifest(), "Default sources should all probe the archive");

		let station = sources.get("station").expect("Missing station source");
		assert_eq!(station.display_name, "Station", "Display name mismatch");
		match &station.mode {
			SourceMode::Archive { base_url, cadence } => {
				assert_eq!(base_url, "https://data3.skaping.com/grand-bornand/chinaillon", "Base url");
				assert_eq!(*cadence, Cadence::FixedOffset, "Station uses the fixed-offset cadence");
			},
			SourceMode::Manifest => panic!("Station should probe the archive"),
		}
	}

	#[test]
	fn trailing_slash_is_trimmed() {
		let mut config = Config::default();
		let village = config.sources.get_mut("village").expect("Missing village source");
		village.mode = config::SourceMode::Archive {
			url:     "https://example.com/village/".to_owned(),
			cadence: Cadence::Regular,
		};

		let sources = Sources::from_config(&config.sources);
		match &sources.get("village").expect("Missing village source").mode {
			SourceMode::Archive { base_url, .. } => assert_eq!(base_url, "https://example.com/village", "Base url"),
			SourceMode::Manifest => panic!("Village should probe the archive"),
		}
	}
}
