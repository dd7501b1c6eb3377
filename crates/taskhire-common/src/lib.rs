//! # Taskhire Common
//!
//! Pieces shared by the Taskhire SDK and CLI: deployment constants, the
//! configuration error type, and unified logging initialization.

pub mod constants;
pub mod error;
pub mod logging;

pub use error::ConfigurationError;
