//! Mood check-in types.

use crate::error::{Result, SereneError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The closed set of moods a check-in can carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MoodTag {
    Happy,
    Neutral,
    Sad,
    Anxious,
    Tired,
}

impl MoodTag {
    /// Parses a tag name, case-insensitively.
    ///
    /// # Errors
    ///
    /// `InvalidTag` if `value` names no tag.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim()).map_err(|_| SereneError::invalid_tag(value))
    }

    pub fn all() -> impl Iterator<Item = MoodTag> {
        Self::iter()
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodTag::Happy => "😊",
            MoodTag::Neutral => "😐",
            MoodTag::Sad => "😔",
            MoodTag::Anxious => "😰",
            MoodTag::Tired => "😴",
        }
    }

    /// Coarse positivity score used for trend detection.
    pub fn valence(self) -> i32 {
        match self {
            MoodTag::Happy => 1,
            MoodTag::Neutral | MoodTag::Tired => 0,
            MoodTag::Sad | MoodTag::Anxious => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodEntryId(pub u64);

impl fmt::Display for MoodEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable mood check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: MoodEntryId,
    pub tag: MoodTag,
    /// Free-text reflection, possibly empty
    #[serde(default)]
    pub note: String,
    pub recorded_at: DateTime<Utc>,
}
