//! Pre-initialization messages
//!
//! Messages emitted while the logger is being set up, replayed once it's ready.

// Imports
use std::{mem, sync::Mutex};

/// Message level
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MessageLevel {
	Trace,
	Warn,
}

/// All buffered messages, in order
static MESSAGES: Mutex<Vec<(MessageLevel, String)>> = Mutex::new(vec![]);

/// Buffers a message at `level`
fn push(level: MessageLevel, message: String) {
	let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
	messages.push((level, message));
}

/// Buffers a trace message
pub fn trace(message: impl Into<String>) {
	self::push(MessageLevel::Trace, message.into());
}

/// Buffers a warning
pub fn warn(message: impl Into<String>) {
	self::push(MessageLevel::Warn, message.into());
}

/// Takes all buffered messages
pub fn take() -> Vec<(MessageLevel, String)> {
	let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
	mem::take(&mut *messages)
}

