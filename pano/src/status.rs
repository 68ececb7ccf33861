//! Status

// Imports
use {chrono::NaiveDateTime, core::fmt};

/// User-visible status
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Status {
	/// Looking for the latest panorama
	Searching,

	/// Showing the panorama captured at a time
	Latest(NaiveDateTime),

	/// Last load failed
	Error(String),
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Searching => f.pad("Searching..."),
			Self::Latest(timestamp) => write!(f, "Latest panorama: {}", timestamp.format("%b %-d, %Y, %H:%M")),
			Self::Error(err) => f.pad(err),
		}
	}
}
