//! Core domain for Serene: conversational sessions and mood reflection.
//!
//! The types here never perform I/O and never wait on time. Timestamps come
//! from a `Clock`, and deferred work is expressed as tokens the caller
//! registers with its own timer.

pub mod clock;
pub mod config;
pub mod error;
pub mod mood;
pub mod session;

// Re-export common error type
pub use error::{Result, SereneError};
