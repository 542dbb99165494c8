//! Built-in response generators.
//!
//! Neither performs inference; they stand in for a backend behind the
//! `ResponseGenerator` trait.

use async_trait::async_trait;
use serene_core::error::{Result, SereneError};
use serene_core::session::{ResponseGenerator, Turn};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replies with the same text to every turn.
#[derive(Debug, Clone)]
pub struct CannedResponder {
    text: String,
}

impl CannedResponder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ResponseGenerator for CannedResponder {
    async fn generate_response(&self, _transcript: &[Turn]) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Replies with scripted lines in order, wrapping around at the end.
#[derive(Debug)]
pub struct ScriptedResponder {
    lines: Vec<String>,
    cursor: AtomicUsize,
}

impl ScriptedResponder {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedResponder {
    async fn generate_response(&self, _transcript: &[Turn]) -> Result<String> {
        if self.lines.is_empty() {
            return Err(SereneError::delivery("script has no lines"));
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.lines.len();
        Ok(self.lines[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responder_ignores_transcript() {
        let responder = CannedResponder::new("I'm here for you.");
        assert_eq!(
            responder.generate_response(&[]).await.unwrap(),
            "I'm here for you."
        );
    }

    #[tokio::test]
    async fn test_scripted_responder_cycles() {
        let responder = ScriptedResponder::new(["one", "two"]);
        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(responder.generate_response(&[]).await.unwrap());
        }
        assert_eq!(replies, vec!["one", "two", "one"]);
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let responder = ScriptedResponder::new(Vec::<String>::new());
        assert!(matches!(
            responder.generate_response(&[]).await,
            Err(SereneError::DeliveryFailure(_))
        ));
    }
}
