//! Size

// Imports
use {
	anyhow::Context,
	std::{borrow::Cow, fmt, str::FromStr},
};

/// A size, in pixels
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Size {
	/// Width
	pub width: u32,

	/// Height
	pub height: u32,
}

impl Size {
	/// Creates a new size
	#[must_use]
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	/// Returns if either side of this size is zero
	#[must_use]
	pub const fn is_empty(self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Returns the aspect ratio, `width / height`.
	///
	/// Returns `None` if the height is zero.
	#[must_use]
	pub fn aspect_ratio(self) -> Option<f64> {
		match self.height {
			0 => None,
			height => Some(f64::from(self.width) / f64::from(height)),
		}
	}
}

impl fmt::Display for Size {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

impl FromStr for Size {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		// Split at the first `x` to get the width and height
		let (width, height) = s.trim().split_once('x').context("Unable to find `x` in size")?;

		Ok(Self {
			width:  width.parse::<u32>().context("Unable to parse width")?,
			height: height.parse::<u32>().context("Unable to parse height")?,
		})
	}
}

impl<'de> serde::Deserialize<'de> for Size {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let s = Cow::<str>::deserialize(deserializer)?;
		Self::from_str(&s).map_err(serde::de::Error::custom)
	}
}

impl serde::Serialize for Size {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}
