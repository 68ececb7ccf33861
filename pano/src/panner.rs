//! Panner
//!
//! Pans an image horizontally from right to left, scaled to fill the
//! height of its container, wrapping back to the right edge once a whole
//! image width has been travelled.

// Modules
mod speed;

// Exports
pub use self::speed::Speed;

// Imports
use {pano_util::Size, std::time::Duration};

/// Pan state
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct PanState {
	/// Current offset, in pixels
	pub position: f64,

	/// Offset at which the right edge of the image meets the right edge of the container
	pub start_offset: f64,

	/// Offset one image width past `start_offset`
	pub wrap_bound: f64,

	/// Width of the image, scaled to the container height
	pub image_width: f64,
}

impl PanState {
	/// Computes the bounds of panning `image` within `container`.
	///
	/// Returns `Err` with the scaled image width if the image isn't wider than the container.
	pub fn bounds(image: Size, container: Size) -> Result<Self, f64> {
		let image_width = image
			.aspect_ratio()
			.map_or(0.0, |ratio| f64::from(container.height) * ratio);
		let container_width = f64::from(container.width);
		if image_width <= container_width {
			return Err(image_width);
		}

		let start_offset = (image_width - container_width).max(0.0);
		let wrap_bound = start_offset + image_width;
		Ok(Self {
			position: wrap_bound,
			start_offset,
			wrap_bound,
			image_width,
		})
	}
}

/// Outcome of beginning to pan an image
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum BeginOutcome {
	/// Panning started
	Started(PanState),

	/// Image isn't wider than the container
	NotPannable {
		image_width:     f64,
		container_width: u32,
	},
}

/// Panner
#[derive(Debug)]
pub struct Panner {
	/// Time to travel one image width at normal speed
	duration: Duration,

	/// Speed
	speed: Speed,

	/// State, if panning
	state: Option<PanState>,
}

impl Panner {
	/// Creates a new panner.
	///
	/// `duration` must be non-zero.
	pub fn new(duration: Duration, speed: Speed) -> Result<Self, anyhow::Error> {
		anyhow::ensure!(!duration.is_zero(), "Pan duration must be non-zero");

		Ok(Self {
			duration,
			speed,
			state: None,
		})
	}

	/// Returns the current state
	#[must_use]
	pub fn state(&self) -> Option<&PanState> {
		self.state.as_ref()
	}

	/// Returns the speed
	#[must_use]
	pub fn speed(&self) -> Speed {
		self.speed
	}

	/// Sets the speed.
	///
	/// Takes effect on the next tick, without moving the image.
	pub fn set_speed(&mut self, speed: Speed) {
		tracing::debug!(%speed, "Setting pan speed");
		self.speed = speed;
	}

	/// Begins panning `image` within `container`.
	///
	/// If `preserve_position` is set and we were already panning, the previous
	/// position is kept, clamped to the new bounds. Otherwise starts from the right edge.
	pub fn begin(&mut self, image: Size, container: Size, preserve_position: bool) -> BeginOutcome {
		let mut state = match PanState::bounds(image, container) {
			Ok(state) => state,
			Err(image_width) => {
				tracing::warn!(%image, %container, image_width, "Image is not wider than the container, not panning");
				self.state = None;
				return BeginOutcome::NotPannable {
					image_width,
					container_width: container.width,
				};
			},
		};

		if let Some(prev) = self.state.filter(|_| preserve_position) {
			state.position = prev.position.clamp(state.start_offset, state.wrap_bound);
		}

		tracing::debug!(%image, %container, ?state, "Began panning");
		self.state = Some(state);
		BeginOutcome::Started(state)
	}

	/// Advances the panning by `delta`, returning the new position.
	///
	/// Returns `None` if not panning.
	pub fn tick(&mut self, delta: Duration) -> Option<f64> {
		let state = self.state.as_mut()?;

		let step = state.image_width * (delta.as_secs_f64() / self.duration.as_secs_f64()) * self.speed.multiplier();
		state.position -= step;
		if state.position < state.start_offset {
			state.position = state.wrap_bound;
		}

		Some(state.position)
	}

	/// Re-begins panning after the container was resized.
	///
	/// Always starts from the right edge.
	pub fn on_resize(&mut self, image: Size, container: Size) -> BeginOutcome {
		self.reset();
		self.begin(image, container, false)
	}

	/// Stops panning, forgetting the position
	pub fn reset(&mut self) {
		self.state = None;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	const FRAME: Duration = Duration::from_nanos(16_666_667);
	const IMAGE: Size = Size::new(8000, 1000);
	const CONTAINER: Size = Size::new(1920, 1080);

	fn panner() -> Panner {
		Panner::new(Duration::from_secs(180), Speed::NORMAL).expect("Unable to create panner")
	}

	fn started(outcome: BeginOutcome) -> PanState {
		match outcome {
			BeginOutcome::Started(state) => state,
			BeginOutcome::NotPannable { .. } => panic!("Image should be pannable"),
		}
	}

	#[test]
	fn bounds() {
		let state = self::started(self::panner().begin(IMAGE, CONTAINER, false));

		assert!((state.image_width - 8640.0).abs() < 1e-9, "Image width: {}", state.image_width);
		assert!((state.start_offset - 6720.0).abs() < 1e-9, "Start offset: {}", state.start_offset);
		assert!((state.wrap_bound - 15360.0).abs() < 1e-9, "Wrap bound: {}", state.wrap_bound);
		assert!(
			(state.position - state.wrap_bound).abs() < f64::EPSILON,
			"Should start at the right edge"
		);
	}

	#[test]
	fn narrow_images_are_not_panned() {
		let mut panner = self::panner();
		let outcome = panner.begin(Size::new(1000, 1000), CONTAINER, false);

		assert!(
			matches!(outcome, BeginOutcome::NotPannable { container_width: 1920, .. }),
			"Unexpected outcome: {outcome:?}"
		);
		assert_eq!(panner.tick(FRAME), None, "Nothing should pan");
	}

	#[test]
	fn ticks_stay_in_bounds_and_wrap_exactly() {
		let mut panner = self::panner();
		panner.set_speed(Speed::FAST_FORWARD);
		let state = self::started(panner.begin(IMAGE, CONTAINER, false));

		let mut prev = state.position;
		let mut wrapped = 0;
		for _ in 0..20_000 {
			let position = panner.tick(FRAME).expect("Should be panning");
			assert!(
				(state.start_offset..=state.wrap_bound).contains(&position),
				"Position {position} out of bounds"
			);

			if position > prev {
				assert!(
					(position - state.wrap_bound).abs() < f64::EPSILON,
					"Wrapped to {position} instead of the wrap bound"
				);
				wrapped += 1;
			}
			prev = position;
		}

		assert!(wrapped > 0, "Should have wrapped at least once");
	}

	#[test]
	fn paused_never_moves() {
		let mut panner = self::panner();
		panner.set_speed(Speed::PAUSED);
		let state = self::started(panner.begin(IMAGE, CONTAINER, false));

		for _ in 0..1000 {
			assert_eq!(panner.tick(FRAME), Some(state.position), "Paused panner moved");
		}
	}

	#[test]
	fn one_width_per_duration() {
		let mut panner = self::panner();
		let state = self::started(panner.begin(IMAGE, CONTAINER, false));

		// Stop one second short of a full width, so we never wrap
		let frames: u32 = 179 * 60;
		let mut position = state.position;
		for _ in 0..frames {
			let next = panner.tick(FRAME).expect("Should be panning");
			assert!(next < position, "Should only move left before the wrap: {next} >= {position}");
			position = next;
		}

		let elapsed = FRAME.as_secs_f64() * f64::from(frames);
		let expected = state.wrap_bound - state.image_width * elapsed / 180.0;
		assert!(
			(position - expected).abs() < 1e-3,
			"Should travel {} per 180s, ended at {position}, expected {expected}",
			state.image_width
		);

		// Over the remaining second and the next, we should wrap exactly once
		let mut wraps = 0;
		for _ in 0..2 * 60 {
			let next = panner.tick(FRAME).expect("Should be panning");
			if next > position {
				wraps += 1;
				assert!(
					(next - state.wrap_bound).abs() < f64::EPSILON,
					"Should wrap to the wrap bound, found {next}"
				);
			}
			assert!(next >= state.start_offset, "Should never show past the start offset: {next}");
			position = next;
		}
		assert_eq!(wraps, 1, "Should wrap once per image width");
	}

	#[test]
	fn zero_duration_is_rejected() {
		assert!(
			Panner::new(Duration::ZERO, Speed::NORMAL).is_err(),
			"Zero duration should be rejected"
		);
		assert!(
			Panner::new(Duration::from_nanos(1), Speed::PAUSED).is_ok(),
			"Any non-zero duration should be accepted"
		);
	}

	#[test]
	fn preserved_position_is_clamped() {
		let mut panner = self::panner();
		let first = self::started(panner.begin(IMAGE, CONTAINER, false));
		for _ in 0..600 {
			_ = panner.tick(FRAME);
		}
		let before = panner.state().expect("Should be panning").position;
		assert!(before < first.wrap_bound, "Should have moved");

		let same = self::started(panner.begin(IMAGE, CONTAINER, true));
		assert!((same.position - before).abs() < f64::EPSILON, "Position should be preserved");

		let narrower = self::started(panner.begin(Size::new(4000, 1000), CONTAINER, true));
		assert!(
			(narrower.position - narrower.wrap_bound).abs() < f64::EPSILON,
			"Position should be clamped to the new wrap bound"
		);

		let restarted = self::started(panner.begin(IMAGE, CONTAINER, false));
		assert!(
			(restarted.position - restarted.wrap_bound).abs() < f64::EPSILON,
			"Position should restart from the right edge"
		);
	}

	#[test]
	fn resize_restarts_from_right_edge() {
		let mut panner = self::panner();
		_ = panner.begin(IMAGE, CONTAINER, false);
		for _ in 0..600 {
			_ = panner.tick(FRAME);
		}

		let state = self::started(panner.on_resize(IMAGE, Size::new(1280, 720)));
		assert!((state.image_width - 5760.0).abs() < 1e-9, "Image width: {}", state.image_width);
		assert!(
			(state.position - state.wrap_bound).abs() < f64::EPSILON,
			"Resize should restart from the right edge"
		);
	}
}
