//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default so a missing or partial file is always valid.

use crate::error::{Result, SereneError};
use crate::mood::InsightWindow;
use crate::session::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_RESPONSE_LATENCY_MS: u64 = 1500;

/// Upper bound for `response_latency_ms` (one hour).
pub const MAX_RESPONSE_LATENCY_MS: u64 = 60 * 60 * 1000;

pub const DEFAULT_CANNED_RESPONSE: &str = "Thank you for sharing that with me. It takes courage to open up about these feelings. Let's explore some coping strategies that might help you manage this overwhelming feeling.";

pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm sorry, I'm having trouble responding right now. Take a slow breath with me, and let's try again in a moment.";

pub const DEFAULT_GREETING: &str = "Hello! I'm your AI therapy companion. How are you feeling today? Remember, I'm here to listen and support you.";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub insight: InsightConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the chat session and its response scheduler.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Delay between a local turn and the counterpart reply
    #[serde(default = "default_response_latency_ms")]
    pub response_latency_ms: u64,
    /// What to do with triggers that arrive while a reply is scheduled
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    #[serde(default = "default_canned_response")]
    pub canned_response: String,
    /// Used when the response generator fails or returns nothing
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    /// Counterpart turn that opens every new session
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,
}

impl RootConfig {
    /// Checks values serde cannot bound on its own.
    ///
    /// # Errors
    ///
    /// `Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.chat.validate()
    }
}

impl ChatConfig {
    pub fn response_latency(&self) -> Duration {
        Duration::from_millis(self.response_latency_ms)
    }

    /// # Errors
    ///
    /// `Config` if `response_latency_ms` exceeds `MAX_RESPONSE_LATENCY_MS`.
    pub fn validate(&self) -> Result<()> {
        if self.response_latency_ms > MAX_RESPONSE_LATENCY_MS {
            return Err(SereneError::config(format!(
                "chat.response_latency_ms = {} exceeds the maximum of {} ms",
                self.response_latency_ms, MAX_RESPONSE_LATENCY_MS
            )));
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_latency_ms: default_response_latency_ms(),
            overlap_policy: OverlapPolicy::default(),
            canned_response: default_canned_response(),
            fallback_message: default_fallback_message(),
            greeting: default_greeting(),
        }
    }
}

/// Settings for mood insight aggregation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct InsightConfig {
    #[serde(default)]
    pub window: InsightWindow,
    #[serde(default = "default_anxious_threshold")]
    pub anxious_threshold: usize,
    #[serde(default = "default_sad_threshold")]
    pub sad_threshold: usize,
    #[serde(default = "default_tired_threshold")]
    pub tired_threshold: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            window: InsightWindow::default(),
            anxious_threshold: default_anxious_threshold(),
            sad_threshold: default_sad_threshold(),
            tired_threshold: default_tired_threshold(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_response_latency_ms() -> u64 {
    DEFAULT_RESPONSE_LATENCY_MS
}

fn default_canned_response() -> String {
    DEFAULT_CANNED_RESPONSE.to_string()
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}

fn default_greeting() -> Option<String> {
    Some(DEFAULT_GREETING.to_string())
}

fn default_anxious_threshold() -> usize {
    2
}

fn default_sad_threshold() -> usize {
    3
}

fn default_tired_threshold() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}
