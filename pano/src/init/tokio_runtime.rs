//! Tokio initialization

// Imports
use {
	anyhow::Context,
	std::sync::atomic::{self, AtomicUsize},
};

/// Creates the tokio runtime.
///
/// The controller runs on the current thread, only blocking work
/// (such as reading stdin) is sent to other threads.
pub fn create() -> Result<tokio::runtime::Runtime, anyhow::Error> {
	tokio::runtime::Builder::new_current_thread()
		.enable_time()
		.enable_io()
		.thread_name_fn(|| {
			static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
			let id = NEXT_ID.fetch_add(1, atomic::Ordering::AcqRel);
			format!("tokio${id}")
		})
		.build()
		.context("Unable to create runtime")
}
