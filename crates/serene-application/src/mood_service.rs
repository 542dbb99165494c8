//! Mood tracking use case.
//!
//! Wraps the `MoodLog` with persistence and exposes read-only snapshots and
//! insights to the presentation layer.

use serene_core::clock::Clock;
use serene_core::config::InsightConfig;
use serene_core::error::Result;
use serene_core::mood::{
    InsightSnapshot, InsightWindow, MoodEntry, MoodLog, MoodRepository, MoodTag, TagCount,
    insight,
};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MoodService {
    log: RwLock<MoodLog>,
    repository: Arc<dyn MoodRepository>,
    clock: Arc<dyn Clock>,
    config: InsightConfig,
}

impl MoodService {
    /// Restores the log from `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored history cannot be loaded.
    pub async fn load(
        repository: Arc<dyn MoodRepository>,
        clock: Arc<dyn Clock>,
        config: InsightConfig,
    ) -> Result<Self> {
        let entries = repository.load_history().await?;
        tracing::info!("[MoodService] Restored {} mood entries", entries.len());
        Ok(Self {
            log: RwLock::new(MoodLog::restore(entries)),
            repository,
            clock,
            config,
        })
    }

    /// Records a check-in from a tag name.
    ///
    /// # Errors
    ///
    /// `InvalidTag` if `tag` names no mood; nothing is recorded.
    pub async fn record(&self, tag: &str, note: &str) -> Result<MoodEntry> {
        let tag = MoodTag::parse(tag)?;
        Ok(self.record_tag(tag, note).await)
    }

    pub async fn record_tag(&self, tag: MoodTag, note: &str) -> MoodEntry {
        let mut log = self.log.write().await;
        let entry = log.record_tag(tag, note, self.clock.now());
        if let Err(e) = self.repository.append(&entry).await {
            tracing::warn!("[MoodService] Failed to persist mood entry {}: {}", entry.id, e);
        }
        entry
    }

    /// Most-recent-first history, at most `limit` entries when given.
    pub async fn history(&self, limit: Option<usize>) -> Vec<MoodEntry> {
        self.log.read().await.history(limit)
    }

    pub async fn len(&self) -> usize {
        self.log.read().await.len()
    }

    /// Insight snapshot over the configured window.
    pub async fn summarize(&self) -> InsightSnapshot {
        self.summarize_window(self.config.window).await
    }

    pub async fn summarize_window(&self, window: InsightWindow) -> InsightSnapshot {
        let log = self.log.read().await;
        insight::summarize(log.entries(), window, self.clock.now(), &self.config)
    }

    pub async fn modal_tag(&self, window: InsightWindow) -> Option<TagCount> {
        let log = self.log.read().await;
        insight::modal_tag(&insight::window(log.entries(), window, self.clock.now()))
    }

    pub async fn streak(&self, tag: MoodTag) -> usize {
        insight::streak(self.log.read().await.entries(), tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_mood_entries;
    use chrono::{TimeZone, Utc};
    use serene_core::clock::ManualClock;
    use serene_core::error::SereneError;
    use serene_core::mood::Recommendation;
    use serene_infrastructure::InMemoryMoodRepository;

    async fn demo_service() -> (MoodService, Arc<InMemoryMoodRepository>) {
        let now = Utc.with_ymd_and_hms(2024, 5, 7, 21, 0, 0).unwrap();
        let repository = Arc::new(InMemoryMoodRepository::with_entries(demo_mood_entries(now)));
        let service = MoodService::load(
            repository.clone(),
            Arc::new(ManualClock::new(now)),
            InsightConfig::default(),
        )
        .await
        .unwrap();
        (service, repository)
    }

    #[tokio::test]
    async fn test_demo_week_insights() {
        let (service, _) = demo_service().await;

        let snapshot = service.summarize().await;

        assert_eq!(snapshot.total, 7);
        assert_eq!(
            snapshot.modal,
            Some(TagCount {
                tag: MoodTag::Happy,
                count: 3
            })
        );
        assert_eq!(snapshot.recommendation, Recommendation::KeepGoing);
    }

    #[tokio::test]
    async fn test_record_persists_and_updates_history() {
        let (service, repository) = demo_service().await;

        let entry = service.record("Tired", "Slept badly").await.unwrap();

        assert_eq!(entry.id.0, 8);
        assert_eq!(service.history(Some(1)).await, vec![entry.clone()]);
        assert_eq!(repository.load_history().await.unwrap().last(), Some(&entry));
        assert_eq!(service.streak(MoodTag::Tired).await, 1);
    }

    #[tokio::test]
    async fn test_invalid_tag_records_nothing() {
        let (service, repository) = demo_service().await;

        let result = service.record("invalid-tag", "x").await;

        assert_eq!(result, Err(SereneError::invalid_tag("invalid-tag")));
        assert_eq!(service.len().await, 7);
        assert_eq!(repository.load_history().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_history_limit_is_stable() {
        let (service, _) = demo_service().await;

        let first = service.history(Some(3)).await;
        let second = service.history(Some(3)).await;

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(first[0].note, "Had a great therapy session");
    }
}
