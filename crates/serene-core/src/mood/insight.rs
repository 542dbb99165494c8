//! Insight aggregation over mood check-ins.
//!
//! Everything here is a pure function of an entry slice (oldest first) and
//! the inputs passed in. Nothing is cached, so a snapshot can never drift
//! from the log it was computed from.

use super::model::{MoodEntry, MoodTag};
use crate::config::InsightConfig;
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Trailing range of entries an insight is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightWindow {
    /// The last N check-ins.
    LastEntries(usize),
    /// Check-ins recorded on the last N calendar days (UTC), today included.
    LastDays(u32),
}

impl Default for InsightWindow {
    fn default() -> Self {
        InsightWindow::LastDays(7)
    }
}

impl fmt::Display for InsightWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightWindow::LastEntries(n) => write!(f, "last {} check-ins", n),
            InsightWindow::LastDays(n) => write!(f, "last {} days", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: MoodTag,
    pub count: usize,
}

/// Direction of mood across the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodPattern {
    NotEnoughData,
    Improving,
    Declining,
    Steady,
}

impl MoodPattern {
    pub fn describe(self) -> &'static str {
        match self {
            MoodPattern::NotEnoughData => "Keep checking in to reveal your mood pattern",
            MoodPattern::Improving => "Your mood has been lifting recently",
            MoodPattern::Declining => "Your mood has dipped recently",
            MoodPattern::Steady => "Your mood has been fairly steady",
        }
    }
}

/// Canned suggestion chosen from the window's counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StartTracking,
    StressRelief,
    ReachOut,
    RestAndRecharge,
    KeepGoing,
    SelfCare,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::StartTracking => {
                "Record a daily check-in to start seeing insights about your mood"
            }
            Recommendation::StressRelief => {
                "Anxiety has come up often lately. Try a guided breathing or stress-relief exercise"
            }
            Recommendation::ReachOut => {
                "You've had several low days. Consider reaching out to someone you trust or a therapist"
            }
            Recommendation::RestAndRecharge => {
                "You've been feeling tired. Prioritise rest and a consistent sleep routine"
            }
            Recommendation::KeepGoing => {
                "You're doing well. Keep up the activities that support your mood"
            }
            Recommendation::SelfCare => {
                "Consider scheduling more self-care activities during the week"
            }
        }
    }
}

/// Derived summary of a window of check-ins. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSnapshot {
    pub window: InsightWindow,
    pub total: usize,
    pub counts: BTreeMap<MoodTag, usize>,
    pub modal: Option<TagCount>,
    /// Run length of the most recent tag.
    pub streak: Option<TagCount>,
    pub pattern: MoodPattern,
    pub recommendation: Recommendation,
}

impl InsightSnapshot {
    pub fn count_of(&self, tag: MoodTag) -> usize {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// One-line summary, e.g. "You felt happy 4 out of 7 check-ins".
    pub fn headline(&self) -> String {
        match self.modal {
            Some(TagCount { tag, count }) => {
                format!("You felt {} {} out of {} check-ins", tag, count, self.total)
            }
            None => format!("No check-ins in the {}", self.window),
        }
    }
}

/// Entries covered by `window`, in their original order.
///
/// `LastDays` selects by timestamp, so an out-of-order entry never hides the
/// ones stored after it.
pub fn window(entries: &[MoodEntry], window: InsightWindow, now: DateTime<Utc>) -> Vec<MoodEntry> {
    match window {
        InsightWindow::LastEntries(n) => entries[entries.len().saturating_sub(n)..].to_vec(),
        InsightWindow::LastDays(0) => Vec::new(),
        InsightWindow::LastDays(n) => {
            let start = now
                .date_naive()
                .checked_sub_days(Days::new(u64::from(n - 1)))
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|start| start.and_utc());
            match start {
                Some(start) => entries
                    .iter()
                    .filter(|e| e.recorded_at >= start)
                    .cloned()
                    .collect(),
                None => entries.to_vec(),
            }
        }
    }
}

/// Most frequent tag; ties go to the tag seen most recently.
pub fn modal_tag(entries: &[MoodEntry]) -> Option<TagCount> {
    // tag -> (count, index of latest occurrence)
    let mut tally: BTreeMap<MoodTag, (usize, usize)> = BTreeMap::new();
    for (index, entry) in entries.iter().enumerate() {
        let slot = tally.entry(entry.tag).or_insert((0, index));
        slot.0 += 1;
        slot.1 = index;
    }
    tally
        .into_iter()
        .max_by_key(|(_, (count, last_seen))| (*count, *last_seen))
        .map(|(tag, (count, _))| TagCount { tag, count })
}

/// Number of consecutive most-recent entries tagged `tag`.
pub fn streak(entries: &[MoodEntry], tag: MoodTag) -> usize {
    entries.iter().rev().take_while(|e| e.tag == tag).count()
}

/// Compares the older half of the window against the newer half.
pub fn pattern(entries: &[MoodEntry]) -> MoodPattern {
    const MIN_ENTRIES: usize = 4;
    const MARGIN: f64 = 0.5;

    if entries.len() < MIN_ENTRIES {
        return MoodPattern::NotEnoughData;
    }
    let (older, newer) = entries.split_at(entries.len() / 2);
    let delta = average_valence(newer) - average_valence(older);
    if delta >= MARGIN {
        MoodPattern::Improving
    } else if delta <= -MARGIN {
        MoodPattern::Declining
    } else {
        MoodPattern::Steady
    }
}

/// Picks the recommendation for a window, first matching rule wins.
pub fn recommend(
    counts: &BTreeMap<MoodTag, usize>,
    modal: Option<TagCount>,
    config: &InsightConfig,
) -> Recommendation {
    let count = |tag: MoodTag| counts.get(&tag).copied().unwrap_or(0);
    let Some(modal) = modal else {
        return Recommendation::StartTracking;
    };

    if count(MoodTag::Anxious) >= config.anxious_threshold {
        Recommendation::StressRelief
    } else if count(MoodTag::Sad) >= config.sad_threshold {
        Recommendation::ReachOut
    } else if count(MoodTag::Tired) >= config.tired_threshold {
        Recommendation::RestAndRecharge
    } else if modal.tag == MoodTag::Happy {
        Recommendation::KeepGoing
    } else {
        Recommendation::SelfCare
    }
}

/// Builds the insight snapshot for `window`.
pub fn summarize(
    entries: &[MoodEntry],
    window_spec: InsightWindow,
    now: DateTime<Utc>,
    config: &InsightConfig,
) -> InsightSnapshot {
    let in_window = window(entries, window_spec, now);
    let in_window = in_window.as_slice();

    let mut counts = BTreeMap::new();
    for entry in in_window {
        *counts.entry(entry.tag).or_insert(0) += 1;
    }
    let modal = modal_tag(in_window);
    let streak = in_window.last().map(|latest| TagCount {
        tag: latest.tag,
        count: streak(in_window, latest.tag),
    });

    InsightSnapshot {
        window: window_spec,
        total: in_window.len(),
        recommendation: recommend(&counts, modal, config),
        counts,
        modal,
        streak,
        pattern: pattern(in_window),
    }
}

fn average_valence(entries: &[MoodEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: i32 = entries.iter().map(|e| e.tag.valence()).sum();
    f64::from(sum) / entries.len() as f64
}
