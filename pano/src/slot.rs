//! Time slots
//!
//! Archives store at most one capture per slot, where a slot is a
//! timestamp aligned to the capture cadence of the source.

// Imports
use {
	chrono::{NaiveDateTime, TimeDelta, Timelike},
	core::fmt,
};

/// Capture cadence
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
	/// Every 10 minutes, on minutes ending in `0`
	#[default]
	Regular,

	/// Twice per hour, at `:01` and `:31`
	FixedOffset,
}

impl Cadence {
	/// Rounds `time` to the slot it belongs to
	#[must_use]
	pub fn round(self, time: NaiveDateTime) -> NaiveDateTime {
		match self {
			Self::Regular => self::round_to_regular(time),
			Self::FixedOffset => self::round_to_fixed_offset(time),
		}
	}

	/// Returns the interval between two consecutive slots
	#[must_use]
	pub fn interval(self) -> TimeDelta {
		match self {
			Self::Regular => TimeDelta::minutes(10),
			Self::FixedOffset => TimeDelta::minutes(30),
		}
	}

	/// Returns how many slots fit within `lookback`
	#[must_use]
	pub fn attempts(self, lookback: TimeDelta) -> i64 {
		lookback.num_minutes() / self.interval().num_minutes()
	}
}

impl fmt::Display for Cadence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Regular => f.pad("regular"),
			Self::FixedOffset => f.pad("fixed-offset"),
		}
	}
}

/// Rounds `time` down to the nearest 10 minute boundary
#[must_use]
pub fn round_to_regular(time: NaiveDateTime) -> NaiveDateTime {
	self::at_minute(time, time.minute() / 10 * 10)
}

/// Rounds `time` to either `:01` or `:31`.
///
/// Minutes `[0, 16)` go to `:01`, `[16, 46)` to `:31`, and
/// anything after goes to `:01` of the next hour.
#[must_use]
pub fn round_to_fixed_offset(time: NaiveDateTime) -> NaiveDateTime {
	match time.minute() {
		minute if minute < 16 => self::at_minute(time, 1),
		minute if minute < 46 => self::at_minute(time, 31),
		_ => self::at_minute(time + TimeDelta::hours(1), 1),
	}
}

/// Returns all slots to probe, starting from the slot of `now` and
/// walking backwards one interval at a time, for up to `lookback`.
pub fn candidates(cadence: Cadence, now: NaiveDateTime, lookback: TimeDelta) -> impl Iterator<Item = NaiveDateTime> {
	let start = cadence.round(now);
	let interval_mins = cadence.interval().num_minutes();
	(0..cadence.attempts(lookback)).map(move |idx| start - TimeDelta::minutes(idx * interval_mins))
}

/// Returns the archive path of a slot, `YYYY/MM/DD/HH-MM`
#[must_use]
pub fn calendar_path(slot: NaiveDateTime) -> String {
	slot.format("%Y/%m/%d/%H-%M").to_string()
}

/// Returns `time` at the start of `minute` within the same hour
fn at_minute(time: NaiveDateTime, minute: u32) -> NaiveDateTime {
	time.date()
		.and_hms_opt(time.hour(), minute, 0)
		.expect("Hour and minute should be valid")
}
