//! Application layer for Serene.
//!
//! This crate drives the core domain on a tokio runtime: it registers
//! response timers, calls the response generator, persists committed
//! entities and publishes session events.

pub mod chat_service;
pub mod mood_service;
pub mod responder;
pub mod seed;

pub use chat_service::ChatService;
pub use mood_service::MoodService;
pub use responder::{CannedResponder, ScriptedResponder};
