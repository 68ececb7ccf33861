//! Initialization

// Modules
pub mod logger;
pub mod tokio_runtime;

// Exports
pub use self::logger::Logger;
