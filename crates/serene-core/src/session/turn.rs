//! Conversation turn types.
//!
//! This module contains types for representing committed messages in a
//! session, including their author and identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of a turn within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnAuthor {
    /// Message typed by the user.
    Local,
    /// Reply produced by the response generator.
    Counterpart,
}

/// A single committed message in a session timeline.
///
/// Turns are immutable once created; the timeline only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: TurnId,
    pub author: TurnAuthor,
    /// Non-empty message content.
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn is_local(&self) -> bool {
        self.author == TurnAuthor::Local
    }

    pub fn is_counterpart(&self) -> bool {
        self.author == TurnAuthor::Counterpart
    }
}
