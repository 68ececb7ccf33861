//! Utility

// Modules
mod size;

// Exports
pub use self::size::Size;

// Imports
use std::{
	future::Future,
	time::{Duration, Instant},
};

/// Measures how long it took to execute an async function
pub async fn measure_async<F: Future>(f: F) -> (F::Output, Duration) {
	let start_time = Instant::now();
	let value = f.await;
	let duration = start_time.elapsed();
	(value, duration)
}

/// Spawns a named task on the current runtime.
///
/// Any error returned by the task is logged, not propagated.
pub fn spawn_task<F>(name: impl Into<String>, fut: F) -> tokio::task::JoinHandle<()>
where
	F: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
{
	let name = name.into();
	tokio::spawn(async move {
		tracing::debug!(%name, "Spawning task");
		match fut.await {
			Ok(()) => tracing::debug!(%name, "Task finished"),
			Err(err) => tracing::warn!(%name, "Task returned an error: {err:?}"),
		}
	})
}
