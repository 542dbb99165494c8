//! Mood tracking domain module.
//!
//! - `model`: Check-in types (`MoodTag`, `MoodEntry`)
//! - `log`: Append-only entry log (`MoodLog`)
//! - `insight`: Pure aggregation over the log (`summarize`, `modal_tag`, `streak`)
//! - `repository`: Persistence collaborator trait (`MoodRepository`)

pub mod insight;
mod log;
mod model;
mod repository;

pub use insight::{
    InsightSnapshot, InsightWindow, MoodPattern, Recommendation, TagCount, modal_tag, streak,
    summarize,
};
pub use log::MoodLog;
pub use model::{MoodEntry, MoodEntryId, MoodTag};
pub use repository::MoodRepository;
