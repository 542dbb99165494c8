//! Turn repository trait.
//!
//! Defines the interface for turn persistence operations.

use super::turn::Turn;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for persisting committed turns.
///
/// The session core never assumes durability: implementations may be an
/// in-memory stub or a durable store. A failed `append` is logged by the
/// caller and does not roll back the committed turn.
#[async_trait]
pub trait TurnRepository: Send + Sync {
    /// Appends a committed turn to the history of `session_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Turn stored
    /// - `Err(_)`: Error occurred during storage
    async fn append(&self, session_id: &str, turn: &Turn) -> Result<()>;

    /// Loads every stored turn of `session_id` in insertion order.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Turn>)`: Stored turns (empty for an unknown session)
    /// - `Err(_)`: Error occurred during retrieval
    async fn load_history(&self, session_id: &str) -> Result<Vec<Turn>>;
}
