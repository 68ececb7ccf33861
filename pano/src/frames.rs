//! Frame pacing
//!
//! Timers driven by the runtime clock, so they advance with tokio's
//! paused clock in tests.

// Imports
use {
	std::{future, time::Duration},
	tokio::time::{self, Instant, Interval, MissedTickBehavior},
};

/// Frame loop.
///
/// While running, yields once per frame with the time elapsed since
/// the previous frame. While stopped, never yields.
#[derive(Debug)]
pub struct FrameLoop {
	/// Duration of each frame
	frame_duration: Duration,

	/// Frame timer and the last frame time, if running
	timer: Option<(Interval, Instant)>,
}

impl FrameLoop {
	/// Creates a stopped frame loop
	#[must_use]
	pub fn new(frame_duration: Duration) -> Self {
		Self {
			frame_duration,
			timer: None,
		}
	}

	/// Creates a stopped frame loop running at `frame_rate` frames per second
	#[must_use]
	pub fn with_frame_rate(frame_rate: u32) -> Self {
		Self::new(Duration::from_secs(1) / frame_rate.max(1))
	}

	/// Returns the duration of each frame
	#[must_use]
	pub fn frame_duration(&self) -> Duration {
		self.frame_duration
	}

	/// Returns if running
	#[must_use]
	pub fn is_running(&self) -> bool {
		self.timer.is_some()
	}

	/// Starts the loop, with the first frame one frame duration from now.
	///
	/// Restarts it if already running.
	pub fn start(&mut self) {
		let now = Instant::now();
		let mut interval = time::interval_at(now + self.frame_duration, self.frame_duration);
		interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
		self.timer = Some((interval, now));
	}

	/// Stops the loop.
	///
	/// Does nothing if already stopped.
	pub fn cancel(&mut self) {
		self.timer = None;
	}

	/// Waits for the next frame, returning the time since the previous one.
	///
	/// Cancel safe.
	pub async fn next_frame(&mut self) -> Duration {
		let Some((interval, last_frame)) = &mut self.timer else {
			return future::pending().await;
		};

		let now = interval.tick().await;
		let delta = now.saturating_duration_since(*last_frame);
		*last_frame = now;
		delta
	}
}

/// Debouncer.
///
/// Holds the latest triggered value until no other trigger happened for the quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
	/// Quiet period
	quiet: Duration,

	/// Deadline and the pending value
	pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
	/// Creates a new debouncer
	#[must_use]
	pub fn new(quiet: Duration) -> Self {
		Self { quiet, pending: None }
	}

	/// Triggers the debouncer, replacing any pending value and restarting the quiet period
	pub fn trigger(&mut self, value: T) {
		self.pending = Some((Instant::now() + self.quiet, value));
	}

	/// Drops any pending value
	pub fn cancel(&mut self) {
		self.pending = None;
	}

	/// Returns if a value is pending
	#[must_use]
	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	/// Waits for the quiet period to pass, returning the latest value.
	///
	/// Never returns if nothing is pending. Cancel safe.
	pub async fn wait(&mut self) -> T {
		let Some((deadline, _)) = &self.pending else {
			return future::pending().await;
		};
		time::sleep_until(*deadline).await;

		let (_, value) = self.pending.take().expect("Pending value vanished while waiting");
		value
	}
}

#[cfg(test)]
mod test {
	use {super::*, futures::FutureExt};

	#[tokio::test(start_paused = true)]
	async fn frames_are_paced() {
		let mut frames = FrameLoop::with_frame_rate(60);
		assert!(!frames.is_running(), "Should start stopped");

		frames.start();
		let start = Instant::now();
		for _ in 0..60 {
			let delta = frames.next_frame().await;
			assert_eq!(delta, frames.frame_duration(), "Frame delta");
		}

		let elapsed = start.elapsed();
		assert!(
			elapsed >= Duration::from_millis(999) && elapsed <= Duration::from_millis(1001),
			"60 frames should take one second, took {elapsed:?}"
		);
	}

	#[tokio::test(start_paused = true)]
	async fn cancelled_loop_never_yields() {
		let mut frames = FrameLoop::with_frame_rate(60);
		frames.start();
		frames.cancel();
		frames.cancel();
		assert!(!frames.is_running(), "Should be stopped");

		let res = time::timeout(Duration::from_secs(10), frames.next_frame()).await;
		assert!(res.is_err(), "Cancelled loop yielded a frame");
	}

	#[tokio::test(start_paused = true)]
	async fn debounce_keeps_latest() {
		let mut debouncer = Debouncer::new(Duration::from_millis(150));
		let start = Instant::now();

		debouncer.trigger(1);
		time::sleep(Duration::from_millis(100)).await;
		debouncer.trigger(2);
		time::sleep(Duration::from_millis(100)).await;
		debouncer.trigger(3);

		assert_eq!(debouncer.wait().await, 3, "Only the latest value should be kept");
		assert_eq!(start.elapsed(), Duration::from_millis(350), "Quiet period restarts on each trigger");
		assert!(!debouncer.is_pending(), "Value should have been taken");
	}

	#[tokio::test(start_paused = true)]
	async fn debounce_cancel() {
		let mut debouncer = Debouncer::new(Duration::from_millis(150));
		debouncer.trigger(());
		debouncer.cancel();

		assert!(debouncer.wait().now_or_never().is_none(), "Cancelled debouncer should be pending");
		let res = time::timeout(Duration::from_secs(1), debouncer.wait()).await;
		assert!(res.is_err(), "Cancelled debouncer yielded a value");
	}
}
