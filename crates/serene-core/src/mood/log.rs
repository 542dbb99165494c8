//! Append-only mood check-in log.

use super::model::{MoodEntry, MoodEntryId, MoodTag};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Owns the sequence of mood check-ins.
///
/// Entries are stored oldest first and are never mutated or removed.
/// `recorded_at` never decreases for entries recorded through the log;
/// restored entries keep their stored timestamps.
#[derive(Debug, Clone)]
pub struct MoodLog {
    entries: Vec<MoodEntry>,
    next_id: u64,
}

impl MoodLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a log from previously stored entries.
    ///
    /// Entries are ordered by id; new ids continue after the highest one.
    pub fn restore(mut entries: Vec<MoodEntry>) -> Self {
        entries.sort_by_key(|e| e.id);
        let next_id = entries.last().map_or(1, |e| e.id.0 + 1);
        Self { entries, next_id }
    }

    /// Records a check-in from a tag name.
    ///
    /// # Errors
    ///
    /// `InvalidTag` if `tag` is not one of the known moods; the log is left
    /// unchanged.
    pub fn record(&mut self, tag: &str, note: &str, now: DateTime<Utc>) -> Result<MoodEntry> {
        let tag = MoodTag::parse(tag)?;
        Ok(self.record_tag(tag, note, now))
    }

    pub fn record_tag(&mut self, tag: MoodTag, note: &str, now: DateTime<Utc>) -> MoodEntry {
        // Clock skew must not break recorded_at ordering
        let recorded_at = match self.entries.last() {
            Some(last) if last.recorded_at > now => last.recorded_at,
            _ => now,
        };
        let entry = MoodEntry {
            id: MoodEntryId(self.next_id),
            tag,
            note: note.trim().to_string(),
            recorded_at,
        };
        self.next_id += 1;
        tracing::debug!("[MoodLog] Recorded {} as entry {}", tag, entry.id);
        self.entries.push(entry.clone());
        entry
    }

    /// Most-recent-first snapshot, truncated to `limit` entries when given.
    pub fn history(&self, limit: Option<usize>) -> Vec<MoodEntry> {
        let take = limit.unwrap_or(self.entries.len());
        self.entries.iter().rev().take(take).cloned().collect()
    }

    /// Every entry in insertion order (oldest first).
    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MoodLog {
    fn default() -> Self {
        Self::new()
    }
}
