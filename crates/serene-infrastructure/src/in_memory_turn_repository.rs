//! In-memory `TurnRepository`.

use async_trait::async_trait;
use serene_core::error::Result;
use serene_core::session::{Turn, TurnRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Stores turns per session in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryTurnRepository {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl InMemoryTurnRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with at least one stored turn.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl TurnRepository for InMemoryTurnRepository {
    async fn append(&self, session_id: &str, turn: &Turn) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn load_history(&self, session_id: &str) -> Result<Vec<Turn>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serene_core::session::{TurnAuthor, TurnId};

    fn turn(id: u64, text: &str) -> Turn {
        Turn {
            id: TurnId(id),
            author: TurnAuthor::Local,
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_history_is_kept_per_session() {
        let repo = InMemoryTurnRepository::new();

        repo.append("a", &turn(1, "hello")).await.unwrap();
        repo.append("a", &turn(2, "again")).await.unwrap();
        repo.append("b", &turn(1, "other")).await.unwrap();

        let history = repo.load_history("a").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "again");
        assert_eq!(repo.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_session_has_empty_history() {
        let repo = InMemoryTurnRepository::new();
        assert!(repo.load_history("missing").await.unwrap().is_empty());
    }
}
