//! Append-only turn timeline for one session.

use super::turn::{Turn, TurnAuthor, TurnId};
use crate::error::{Result, SereneError};
use chrono::{DateTime, Utc};

/// Ordered log of the turns committed to a session.
///
/// Invariants:
/// - ids are assigned from 1 and strictly increase in storage order
/// - `created_at` never decreases in storage order
/// - a turn is never mutated or removed while the timeline is open
///
/// Once sealed, the timeline accepts no more turns.
#[derive(Debug, Clone)]
pub struct Timeline {
    turns: Vec<Turn>,
    next_id: u64,
    sealed: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            next_id: 1,
            sealed: false,
        }
    }

    /// Commits a user-authored turn.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` if `text` is empty after trimming (nothing is appended)
    /// - `SessionClosed` if the timeline has been sealed
    pub fn submit_local(&mut self, text: &str, now: DateTime<Utc>) -> Result<Turn> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SereneError::EmptyInput);
        }
        if self.sealed {
            return Err(SereneError::SessionClosed);
        }
        Ok(self.push(TurnAuthor::Local, text.to_string(), now))
    }

    /// Commits a counterpart turn.
    ///
    /// Returns `None` without touching the log when the timeline is sealed,
    /// which happens when a late delivery races a closed session.
    pub fn append_counterpart(&mut self, text: &str, now: DateTime<Utc>) -> Option<Turn> {
        if self.sealed {
            tracing::warn!("[Timeline] Ignoring counterpart turn for a closed session");
            return None;
        }
        Some(self.push(TurnAuthor::Counterpart, text.trim().to_string(), now))
    }

    /// Snapshot of every committed turn in insertion order.
    pub fn list(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Seals the timeline and hands the committed turns back to the caller.
    ///
    /// Calling this on a sealed timeline returns an empty vector.
    pub fn seal(&mut self) -> Vec<Turn> {
        self.sealed = true;
        std::mem::take(&mut self.turns)
    }

    fn push(&mut self, author: TurnAuthor, text: String, now: DateTime<Utc>) -> Turn {
        // Clock skew must not break createdAt ordering
        let created_at = match self.turns.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let turn = Turn {
            id: TurnId(self.next_id),
            author,
            text,
            created_at,
        };
        self.next_id += 1;
        tracing::debug!("[Timeline] Committed {:?} turn {}", author, turn.id);
        self.turns.push(turn.clone());
        turn
    }
}
