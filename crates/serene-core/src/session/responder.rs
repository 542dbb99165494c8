//! Response generator trait.
//!
//! The point where a real inference backend plugs into the session.

use super::turn::Turn;
use crate::error::Result;
use async_trait::async_trait;

/// Produces the counterpart reply for a session transcript.
///
/// Implementations may take arbitrary time; the fixed scheduling latency is
/// independent of how long this call runs. A failure is never surfaced to the
/// user: the session substitutes its fallback message.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generates a reply given every turn committed so far (oldest first).
    async fn generate_response(&self, transcript: &[Turn]) -> Result<String>;
}
