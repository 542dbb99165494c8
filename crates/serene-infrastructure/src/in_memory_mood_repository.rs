//! In-memory `MoodRepository`.

use async_trait::async_trait;
use serene_core::error::Result;
use serene_core::mood::{MoodEntry, MoodRepository};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryMoodRepository {
    entries: RwLock<Vec<MoodEntry>>,
}

impl InMemoryMoodRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `entries` (oldest first).
    pub fn with_entries(entries: Vec<MoodEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl MoodRepository for InMemoryMoodRepository {
    async fn append(&self, entry: &MoodEntry) -> Result<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn load_history(&self) -> Result<Vec<MoodEntry>> {
        Ok(self.entries.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serene_core::mood::{MoodEntryId, MoodTag};

    #[tokio::test]
    async fn test_append_then_load() {
        let repo = InMemoryMoodRepository::new();
        let entry = MoodEntry {
            id: MoodEntryId(1),
            tag: MoodTag::Neutral,
            note: "Average day".to_string(),
            recorded_at: Utc::now(),
        };

        repo.append(&entry).await.unwrap();

        assert_eq!(repo.load_history().await.unwrap(), vec![entry]);
    }
}
