//! # Taskhire CLI
//!
//! Command-line client for the Taskhire API, built on `taskhire-sdk`:
//! - Telegram launch-data login and session refresh
//! - Profile, task and project management
//! - AI assists for task descriptions and AJTBD quizzes

pub mod cli;
pub mod config;
pub mod error;
pub mod output;

pub use cli::*;
pub use error::*;
