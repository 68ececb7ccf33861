//! Panorama resolver
//!
//! Finds the latest valid image of a source, either by probing
//! the archive backwards in time, or by looking it up in the manifest.

// Modules
mod error;
mod manifest;
mod probe;

// Exports
pub use self::{
	error::{ManifestError, ResolveError, TimestampParseError},
	manifest::{Manifest, ManifestLocation},
};

// Imports
use {
	crate::{
		fetch::Fetch,
		slot::{self, Cadence},
		source::{PanoramaSource, SourceMode, SourceName},
	},
	chrono::{NaiveDateTime, TimeDelta},
	core::fmt,
};

/// Resolved panorama
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ResolvedPanorama {
	/// Image url
	pub url: String,

	/// Time the image was captured
	pub timestamp: NaiveDateTime,

	/// Where `timestamp` came from
	pub timestamp_origin: TimestampOrigin,
}

/// Origin of a panorama timestamp
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TimestampOrigin {
	/// Slot that was probed
	Slot,

	/// Parsed from the image url
	Url,

	/// Url couldn't be parsed, so the resolution time was used
	WallClock,
}

impl fmt::Display for TimestampOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Slot => f.pad("slot"),
			Self::Url => f.pad("url"),
			Self::WallClock => f.pad("wall-clock"),
		}
	}
}

/// Resolver
#[derive(Clone, Debug)]
pub struct Resolver<F> {
	/// Fetcher
	fetcher: F,

	/// Manifest location
	manifest: Option<ManifestLocation>,

	/// How far back to probe
	lookback: TimeDelta,

	/// Images at or below this size are placeholders
	min_image_bytes: u64,
}

impl<F: Fetch> Resolver<F> {
	/// Creates a new resolver
	pub fn new(fetcher: F, manifest: Option<ManifestLocation>, lookback: TimeDelta, min_image_bytes: u64) -> Self {
		Self {
			fetcher,
			manifest,
			lookback,
			min_image_bytes,
		}
	}

	/// Resolves the latest panorama of `source`, as of `now`
	pub async fn resolve(&self, source: &PanoramaSource, now: NaiveDateTime) -> Result<ResolvedPanorama, ResolveError> {
		let (res, duration) = pano_util::measure_async(async {
			match &source.mode {
				SourceMode::Archive { base_url, cadence } => self.probe(&source.name, base_url, *cadence, now).await,
				SourceMode::Manifest => self.lookup(&source.name, now).await,
			}
		})
		.await;

		match &res {
			Ok(panorama) => tracing::debug!(
				source = %source.name,
				url = %panorama.url,
				timestamp = %panorama.timestamp,
				origin = %panorama.timestamp_origin,
				?duration,
				"Resolved panorama"
			),
			Err(err) => tracing::debug!(source = %source.name, ?duration, "Unable to resolve panorama: {err}"),
		}

		res
	}

	/// Probes the archive backwards from the slot of `now`
	async fn probe(
		&self,
		source_name: &SourceName,
		base_url: &str,
		cadence: Cadence,
		now: NaiveDateTime,
	) -> Result<ResolvedPanorama, ResolveError> {
		tracing::debug!(%source_name, %cadence, attempts = cadence.attempts(self.lookback), "Probing archive");

		for slot in slot::candidates(cadence, now, self.lookback) {
			let url = probe::archive_url(base_url, slot);
			if probe::image_exists(&self.fetcher, &url, self.min_image_bytes).await {
				return Ok(ResolvedPanorama {
					url,
					timestamp: slot,
					timestamp_origin: TimestampOrigin::Slot,
				});
			}
		}

		Err(ResolveError::NotFound {
			source_name:    source_name.clone(),
			lookback_hours: self.lookback.num_hours(),
		})
	}

	/// Looks up the source in a freshly fetched manifest
	async fn lookup(&self, source_name: &SourceName, now: NaiveDateTime) -> Result<ResolvedPanorama, ResolveError> {
		let location = self.manifest.as_ref().ok_or_else(|| ResolveError::NoManifest {
			source_name: source_name.clone(),
		})?;

		let manifest = Manifest::fetch(&self.fetcher, location).await?;
		let url = manifest.image_url(source_name)?.to_owned();

		let (timestamp, timestamp_origin) = match manifest::parse_url_timestamp(&url) {
			Ok(timestamp) => (timestamp, TimestampOrigin::Url),
			Err(err) => {
				tracing::warn!(%source_name, "Unable to parse image timestamp, using current time: {err}");
				(now, TimestampOrigin::WallClock)
			},
		};

		Ok(ResolvedPanorama {
			url,
			timestamp,
			timestamp_origin,
		})
	}
}
