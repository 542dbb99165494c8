use anyhow::Result;
use chrono::Utc;
use serene_application::MoodService;
use serene_application::seed::demo_mood_entries;
use serene_core::clock::SystemClock;
use serene_core::config::InsightConfig;
use serene_core::error::SereneError;
use serene_core::mood::{InsightSnapshot, MoodEntry, MoodTag};
use serene_infrastructure::InMemoryMoodRepository;
use std::sync::Arc;

/// Loads the demo week; there is no durable mood store.
async fn demo_service(config: &InsightConfig) -> Result<MoodService> {
    let repository = Arc::new(InMemoryMoodRepository::with_entries(demo_mood_entries(
        Utc::now(),
    )));
    Ok(MoodService::load(repository, Arc::new(SystemClock), config.clone()).await?)
}

pub async fn record(config: &InsightConfig, tag: &str, note: &str) -> Result<()> {
    let service = demo_service(config).await?;

    let entry = match service.record(tag, note).await {
        Ok(entry) => entry,
        Err(SereneError::InvalidTag { tag }) => {
            let valid: Vec<String> = MoodTag::all()
                .map(|t| format!("{} {}", t.emoji(), t))
                .collect();
            println!("❌ Unknown mood '{}'. Pick one of: {}", tag, valid.join(", "));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("✅ Saved today's mood: {} {}", entry.tag.emoji(), entry.tag);

    print_history(&service.history(Some(7)).await);
    print_insights(&service.summarize().await);
    Ok(())
}

pub async fn insights(config: &InsightConfig, limit: usize) -> Result<()> {
    let service = demo_service(config).await?;

    print_history(&service.history(Some(limit)).await);
    print_insights(&service.summarize().await);
    Ok(())
}

fn print_history(entries: &[MoodEntry]) {
    println!("\n📅 Recent moods");
    for entry in entries {
        let note = if entry.note.is_empty() {
            "-"
        } else {
            entry.note.as_str()
        };
        println!(
            "  {} {:<8} {}  {}",
            entry.tag.emoji(),
            entry.tag,
            entry.recorded_at.format("%a %b %-d"),
            note
        );
    }
}

fn print_insights(snapshot: &InsightSnapshot) {
    println!("\n📈 Insights ({})", snapshot.window);
    if let Some(modal) = snapshot.modal {
        println!("  Most common mood: {} {}", modal.tag.emoji(), snapshot.headline());
    } else {
        println!("  {}", snapshot.headline());
    }
    if let Some(streak) = snapshot.streak.filter(|s| s.count > 1) {
        println!("  Streak: {} check-ins in a row feeling {}", streak.count, streak.tag);
    }
    println!("  Mood pattern: {}", snapshot.pattern.describe());
    println!("  Recommendation: {}", snapshot.recommendation.message());
}
