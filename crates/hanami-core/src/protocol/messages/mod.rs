//! Concrete message types.

pub mod error_log;

pub use error_log::ErrorLogMessage;
