//! Mood repository trait.

use super::model::MoodEntry;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for persisting mood check-ins.
///
/// Like `TurnRepository`, this may be an in-memory stub or a durable store.
#[async_trait]
pub trait MoodRepository: Send + Sync {
    /// Appends a committed entry.
    async fn append(&self, entry: &MoodEntry) -> Result<()>;

    /// Loads every stored entry in insertion order.
    async fn load_history(&self) -> Result<Vec<MoodEntry>>;
}
