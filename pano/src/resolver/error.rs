//! Resolver errors

// Imports
use {
	super::manifest::ManifestLocation,
	crate::{fetch::FetchError, source::SourceName},
	std::io,
};

/// Resolve error
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	/// No valid image within the lookback window
	#[error("No panorama found for {source_name} in the last {lookback_hours} hours")]
	NotFound {
		source_name:    SourceName,
		lookback_hours: i64,
	},

	/// Source uses the manifest, but none is configured
	#[error("Source {source_name} uses the manifest, but no manifest location is configured")]
	NoManifest { source_name: SourceName },

	/// Manifest
	#[error(transparent)]
	Manifest(#[from] ManifestError),

	/// Network
	#[error("Unable to fetch manifest")]
	Network(#[from] FetchError),
}

/// Manifest error
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
	/// Unable to read the manifest file
	#[error("Unable to read manifest {location}")]
	Read {
		location: ManifestLocation,
		#[source]
		err:      io::Error,
	},

	/// Unable to parse the manifest
	#[error("Unable to parse manifest {location}")]
	Parse {
		location: ManifestLocation,
		#[source]
		err:      serde_json::Error,
	},

	/// Source is missing from the manifest
	#[error("Manifest has no entry for {source_name}, it must be populated by the manifest refresh process")]
	MissingEntry { source_name: SourceName },

	/// Source entry is null
	#[error("Manifest entry for {source_name} is empty, it must be populated by the manifest refresh process")]
	NullEntry { source_name: SourceName },
}

/// Timestamp parse error
#[derive(Debug, thiserror::Error)]
pub enum TimestampParseError {
	/// No `YYYY/MM/DD/HH-MM` segment
	#[error("Url {url:?} has no `YYYY/MM/DD/HH-MM` segment")]
	NoMatch { url: String },

	/// Segment isn't a valid date and time
	#[error("Url {url:?} has an invalid date or time")]
	Invalid { url: String },
}
