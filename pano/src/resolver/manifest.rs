//! Manifest
//!
//! A manifest is a json object mapping each source name to the url of its
//! latest known image, kept up to date by an external refresh process.

// Imports
use {
	super::{ManifestError, ResolveError, TimestampParseError},
	crate::{fetch::Fetch, source::SourceName},
	chrono::{NaiveDate, NaiveDateTime},
	core::fmt,
	regex::Regex,
	std::{collections::HashMap, path::PathBuf, sync::LazyLock},
};

/// Manifest location
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ManifestLocation {
	/// Remote url
	Url(String),

	/// Local file
	Path(PathBuf),
}

impl ManifestLocation {
	/// Parses a location, treating anything that isn't a `http(s)` url as a path
	#[must_use]
	pub fn parse(location: &str) -> Self {
		match location.starts_with("http://") || location.starts_with("https://") {
			true => Self::Url(location.to_owned()),
			false => Self::Path(PathBuf::from(location)),
		}
	}
}

impl fmt::Display for ManifestLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Url(url) => write!(f, "{url:?}"),
			Self::Path(path) => write!(f, "{path:?}"),
		}
	}
}

/// Manifest
#[derive(Debug)]
pub struct Manifest {
	/// Latest image url of each source
	entries: HashMap<String, Option<String>>,
}

impl Manifest {
	/// Fetches the manifest from `location`
	pub async fn fetch<F: Fetch>(fetcher: &F, location: &ManifestLocation) -> Result<Self, ResolveError> {
		let bytes = match location {
			ManifestLocation::Url(url) => fetcher.get(url).await?,
			ManifestLocation::Path(path) => tokio::fs::read(path).await.map_err(|err| ManifestError::Read {
				location: location.clone(),
				err,
			})?,
		};

		let manifest = Self::parse(location, &bytes)?;
		tracing::debug!(%location, entries = manifest.entries.len(), "Fetched manifest");
		Ok(manifest)
	}

	/// Parses a manifest
	pub fn parse(location: &ManifestLocation, bytes: &[u8]) -> Result<Self, ManifestError> {
		let entries = serde_json::from_slice(bytes).map_err(|err| ManifestError::Parse {
			location: location.clone(),
			err,
		})?;

		Ok(Self { entries })
	}

	/// Returns the latest image url of a source
	pub fn image_url(&self, source_name: &SourceName) -> Result<&str, ManifestError> {
		match self.entries.get(source_name.as_str()) {
			Some(Some(url)) => Ok(url),
			Some(None) => Err(ManifestError::NullEntry {
				source_name: source_name.clone(),
			}),
			None => Err(ManifestError::MissingEntry {
				source_name: source_name.clone(),
			}),
		}
	}
}

/// Timestamp segment of an image url, `YYYY/MM/DD/[quality/]HH-MM`
static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"([0-9]{4})/([0-9]{2})/([0-9]{2})/(?:[^/]+/)?([0-9]{2})-([0-9]{2})")
		.expect("Timestamp regex should be valid")
});

/// Parses the capture timestamp out of an image url
pub fn parse_url_timestamp(url: &str) -> Result<NaiveDateTime, TimestampParseError> {
	let captures = TIMESTAMP_REGEX
		.captures(url)
		.ok_or_else(|| TimestampParseError::NoMatch { url: url.to_owned() })?;

	let field = |idx: usize| captures[idx].parse::<u32>().ok();
	let timestamp = || {
		let date = NaiveDate::from_ymd_opt(i32::try_from(field(1)?).ok()?, field(2)?, field(3)?)?;
		date.and_hms_opt(field(4)?, field(5)?, 0)
	};

	timestamp().ok_or_else(|| TimestampParseError::Invalid { url: url.to_owned() })
}
