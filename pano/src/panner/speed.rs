//! Pan speed

// Imports
use core::fmt;

/// Pan speed multiplier.
///
/// Always finite and non-negative. A speed of `0` pauses the panning.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub struct Speed(f64);

impl Speed {
	/// Paused
	pub const PAUSED: Self = Self(0.0);

	/// Normal speed
	pub const NORMAL: Self = Self(1.0);

	/// Fast-forward, only available in developer mode
	pub const FAST_FORWARD: Self = Self(10.0);

	/// Creates a speed, if `multiplier` is finite and non-negative
	#[must_use]
	pub fn new(multiplier: f64) -> Option<Self> {
		(multiplier.is_finite() && multiplier >= 0.0).then_some(Self(multiplier))
	}

	/// Returns the multiplier
	#[must_use]
	pub const fn multiplier(self) -> f64 {
		self.0
	}

	/// Returns if this speed is paused
	#[must_use]
	pub fn is_paused(self) -> bool {
		self.0 <= 0.0
	}
}

impl Default for Speed {
	fn default() -> Self {
		Self::NORMAL
	}
}

impl fmt::Display for Speed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.is_paused() {
			true => f.pad("paused"),
			false => write!(f, "{}x", self.0),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn validation() {
		assert_eq!(Speed::new(0.5).map(Speed::multiplier), Some(0.5), "Half speed");
		assert_eq!(Speed::new(0.0), Some(Speed::PAUSED), "Zero is paused");
		assert_eq!(Speed::new(-1.0), None, "Negative speeds are invalid");
		assert_eq!(Speed::new(f64::NAN), None, "NaN is invalid");
		assert_eq!(Speed::new(f64::INFINITY), None, "Infinity is invalid");
	}

	#[test]
	fn display() {
		assert_eq!(Speed::PAUSED.to_string(), "paused", "Paused");
		assert_eq!(Speed::NORMAL.to_string(), "1x", "Normal");
		assert_eq!(Speed::FAST_FORWARD.to_string(), "10x", "Fast-forward");
	}
}
