//! Demo data matching the prototype's hardcoded screens.

use chrono::{DateTime, Duration, Utc};
use serene_core::mood::{MoodEntry, MoodEntryId, MoodTag};

/// A week of check-ins ending on `now`, oldest first.
pub fn demo_mood_entries(now: DateTime<Utc>) -> Vec<MoodEntry> {
    let week = [
        (6, MoodTag::Neutral, "Average day"),
        (5, MoodTag::Happy, "Good self-care day"),
        (4, MoodTag::Anxious, "Presentation anxiety"),
        (3, MoodTag::Happy, "Spent time with friends"),
        (2, MoodTag::Sad, "Feeling lonely"),
        (1, MoodTag::Neutral, "Work was stressful but manageable"),
        (0, MoodTag::Happy, "Had a great therapy session"),
    ];

    week.iter()
        .enumerate()
        .map(|(i, (days_ago, tag, note))| MoodEntry {
            id: MoodEntryId(i as u64 + 1),
            tag: *tag,
            note: note.to_string(),
            recorded_at: now - Duration::days(*days_ago),
        })
        .collect()
}
