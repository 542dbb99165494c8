//! Chat session use case.
//!
//! `ChatService` owns one `Session` and drives it on the tokio runtime:
//! it registers a one-shot timer for each scheduled response, calls the
//! response generator when the timer fires, persists every committed turn,
//! and publishes `SessionEvent`s to subscribers.

use serene_core::clock::{Clock, SystemClock};
use serene_core::config::ChatConfig;
use serene_core::error::Result;
use serene_core::session::{
    PendingResponse, ResponseGenerator, ScheduledResponse, Session, SessionEvent, Turn,
    TurnRepository,
};
use serene_infrastructure::InMemoryTurnRepository;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Handle to a running chat session. Clones share the same session.
#[derive(Clone)]
pub struct ChatService {
    inner: Arc<ChatInner>,
}

struct ChatInner {
    session_id: String,
    session: RwLock<Session>,
    generator: Arc<dyn ResponseGenerator>,
    repository: Arc<dyn TurnRepository>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<SessionEvent>,
    /// Timer task for the currently scheduled response
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ChatService {
    /// Opens a new session, seeding the configured greeting.
    pub async fn open(
        config: &ChatConfig,
        generator: Arc<dyn ResponseGenerator>,
        repository: Arc<dyn TurnRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = Session::with_greeting(config, clock.now());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let service = Self {
            inner: Arc::new(ChatInner {
                session_id: session.id.clone(),
                session: RwLock::new(session),
                generator,
                repository,
                clock,
                events,
                timer: Mutex::new(None),
            }),
        };

        {
            let session = service.inner.session.read().await;
            for turn in session.timeline().turns() {
                service.persist(turn).await;
            }
        }
        tracing::info!("[ChatService] Opened session {}", service.inner.session_id);
        service
    }

    /// Opens a session backed by an in-memory repository and the system clock.
    pub async fn open_in_memory(config: &ChatConfig, generator: Arc<dyn ResponseGenerator>) -> Self {
        Self::open(
            config,
            generator,
            Arc::new(InMemoryTurnRepository::new()),
            Arc::new(SystemClock),
        )
        .await
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Subscribes to session events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Commits a local turn and schedules the counterpart response.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` for blank text
    /// - `SessionClosed` after `close`
    pub async fn submit_local(&self, text: &str) -> Result<Turn> {
        let mut session = self.inner.session.write().await;
        let outcome = session.submit_local(text, self.inner.clock.now())?;

        self.persist(&outcome.turn).await;
        self.publish(SessionEvent::TurnCommitted {
            turn: outcome.turn.clone(),
        });
        if let Some(token) = outcome.scheduled {
            self.publish(SessionEvent::ResponseScheduled { response: token });
            self.arm(token, session.scheduler().latency());
        }
        Ok(outcome.turn)
    }

    /// Snapshot of the timeline in insertion order.
    pub async fn list(&self) -> Vec<Turn> {
        self.inner.session.read().await.transcript()
    }

    /// The most recent pending-response record.
    pub async fn pending(&self) -> Option<PendingResponse> {
        self.inner.session.read().await.scheduler().pending().cloned()
    }

    pub async fn is_open(&self) -> bool {
        self.inner.session.read().await.is_open()
    }

    /// Closes the session, cancelling any scheduled response first.
    ///
    /// Returns the final transcript. Closing again returns an empty vector
    /// and publishes nothing.
    pub async fn close(&self) -> Vec<Turn> {
        let mut session = self.inner.session.write().await;
        if !session.is_open() {
            return Vec::new();
        }
        let cancelled = session
            .scheduler()
            .pending()
            .filter(|_| session.scheduler().is_scheduled())
            .map(|p| p.for_turn_id);

        let transcript = session.close();

        if let Some(handle) = self.take_timer() {
            handle.abort();
        }
        if let Some(for_turn_id) = cancelled {
            self.publish(SessionEvent::ResponseCancelled { for_turn_id });
        }
        self.publish(SessionEvent::SessionClosed {
            session_id: self.inner.session_id.clone(),
        });
        tracing::info!(
            "[ChatService] Closed session {} with {} turn(s)",
            self.inner.session_id,
            transcript.len()
        );
        transcript
    }

    /// Registers the timer that delivers `token` after `delay`.
    ///
    /// Called right after `token` is issued, with the scheduler latency as
    /// `delay`. The sleep runs on tokio time, while `token.due_at` is on the
    /// injected clock's timeline, so the two are never mixed.
    fn arm(&self, token: ScheduledResponse, delay: Duration) {
        let service = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.fire(token).await;
        });

        // The previous handle belongs to a resolved response (or to the task
        // currently running `fire`), so it is detached rather than aborted.
        let mut slot = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(handle);
    }

    fn take_timer(&self) -> Option<JoinHandle<()>> {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    /// Timer callback: generates and delivers the response for `token`.
    async fn fire(&self, token: ScheduledResponse) {
        let transcript = {
            let session = self.inner.session.read().await;
            if !session.is_awaiting(&token) {
                tracing::debug!(
                    "[ChatService] Timer for turn {} fired after cancellation, ignoring",
                    token.for_turn_id
                );
                return;
            }
            session.transcript()
        };

        let generated = self.inner.generator.generate_response(&transcript).await;

        let mut session = self.inner.session.write().await;
        let Some(delivery) = session.complete_response(&token, generated, self.inner.clock.now())
        else {
            return;
        };

        self.persist(&delivery.turn).await;
        self.publish(SessionEvent::TurnCommitted {
            turn: delivery.turn.clone(),
        });
        self.publish(SessionEvent::ResponseDelivered {
            for_turn_id: token.for_turn_id,
            used_fallback: delivery.used_fallback,
        });
        if let Some(next) = delivery.follow_up {
            self.publish(SessionEvent::ResponseScheduled { response: next });
            self.arm(next, session.scheduler().latency());
        }
    }

    async fn persist(&self, turn: &Turn) {
        if let Err(e) = self
            .inner
            .repository
            .append(&self.inner.session_id, turn)
            .await
        {
            tracing::warn!(
                "[ChatService] Failed to persist turn {} of session {}: {}",
                turn.id,
                self.inner.session_id,
                e
            );
        }
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{CannedResponder, ScriptedResponder};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serene_core::clock::ManualClock;
    use serene_core::error::SereneError;
    use serene_core::session::{OverlapPolicy, ResponseState, TurnAuthor};

    struct FailingResponder;

    #[async_trait]
    impl ResponseGenerator for FailingResponder {
        async fn generate_response(&self, _transcript: &[Turn]) -> Result<String> {
            Err(SereneError::delivery("backend unavailable"))
        }
    }

    fn config(policy: OverlapPolicy) -> ChatConfig {
        ChatConfig {
            overlap_policy: policy,
            greeting: None,
            ..ChatConfig::default()
        }
    }

    async fn open(policy: OverlapPolicy) -> ChatService {
        ChatService::open_in_memory(
            &config(policy),
            Arc::new(CannedResponder::new("Thank you for sharing.")),
        )
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_arrives_after_latency() {
        let chat = open(OverlapPolicy::Coalesce).await;

        chat.submit_local("hello").await.unwrap();
        assert_eq!(chat.pending().await.unwrap().state, ResponseState::Scheduled);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(chat.list().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let turns = chat.list().await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].author, TurnAuthor::Counterpart);
        assert_eq!(turns[1].text, "Thank you for sharing.");
        assert_eq!(chat.pending().await.unwrap().state, ResponseState::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_response() {
        let chat = open(OverlapPolicy::Coalesce).await;
        let mut events = chat.subscribe();

        chat.submit_local("hello").await.unwrap();
        let transcript = chat.close().await;
        assert_eq!(transcript.len(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(chat.list().await.is_empty());
        assert_eq!(chat.pending().await.unwrap().state, ResponseState::Cancelled);
        assert!(chat.close().await.is_empty());

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(event);
        }
        assert!(matches!(kinds[0], SessionEvent::TurnCommitted { .. }));
        assert!(matches!(kinds[1], SessionEvent::ResponseScheduled { .. }));
        assert!(matches!(kinds[2], SessionEvent::ResponseCancelled { .. }));
        assert!(matches!(kinds[3], SessionEvent::SessionClosed { .. }));
        assert_eq!(kinds.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_failure_delivers_fallback() {
        let chat_config = config(OverlapPolicy::Coalesce);
        let chat = ChatService::open_in_memory(&chat_config, Arc::new(FailingResponder)).await;

        chat.submit_local("hello").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let turns = chat.list().await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].text, chat_config.fallback_message);
        assert_eq!(chat.pending().await.unwrap().state, ResponseState::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_keeps_single_outstanding_response() {
        let chat = ChatService::open_in_memory(
            &config(OverlapPolicy::Coalesce),
            Arc::new(ScriptedResponder::new(["first reply", "second reply"])),
        )
        .await;
        let mut events = chat.subscribe();

        chat.submit_local("one").await.unwrap();
        chat.submit_local("two").await.unwrap();
        chat.submit_local("three").await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;

        let texts: Vec<String> = chat.list().await.into_iter().map(|t| t.text).collect();
        assert_eq!(
            texts,
            vec!["one", "two", "three", "first reply", "second reply"]
        );

        // Scheduled/delivered events must strictly alternate
        let mut outstanding = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                SessionEvent::ResponseScheduled { .. } => {
                    outstanding += 1;
                    assert_eq!(outstanding, 1);
                }
                SessionEvent::ResponseDelivered { .. } => outstanding -= 1,
                _ => {}
            }
        }
        assert_eq!(outstanding, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_is_rejected() {
        let chat = open(OverlapPolicy::Coalesce).await;

        assert_eq!(chat.submit_local("   ").await, Err(SereneError::EmptyInput));
        assert!(chat.list().await.is_empty());
        assert!(chat.pending().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_is_committed_and_persisted() {
        let repository = Arc::new(InMemoryTurnRepository::new());
        let chat = ChatService::open(
            &ChatConfig::default(),
            Arc::new(CannedResponder::new("ok")),
            repository.clone(),
            Arc::new(SystemClock),
        )
        .await;

        let turns = chat.list().await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].author, TurnAuthor::Counterpart);
        let stored = repository.load_history(chat.session_id()).await.unwrap();
        assert_eq!(stored, turns);
    }

    /// Generator whose call moves the injected wall clock far ahead.
    struct ClockJumpingResponder {
        clock: ManualClock,
    }

    #[async_trait]
    impl ResponseGenerator for ClockJumpingResponder {
        async fn generate_response(&self, _transcript: &[Turn]) -> Result<String> {
            self.clock.advance(chrono::Duration::days(1));
            Ok("ok".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_follows_latency_not_wall_clock() {
        let start = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let chat = ChatService::open(
            &config(OverlapPolicy::Coalesce),
            Arc::new(ClockJumpingResponder {
                clock: clock.clone(),
            }),
            Arc::new(InMemoryTurnRepository::new()),
            Arc::new(clock.clone()),
        )
        .await;

        chat.submit_local("one").await.unwrap();
        chat.submit_local("two").await.unwrap();
        assert_eq!(
            chat.pending().await.unwrap().due_at,
            start + chrono::Duration::milliseconds(1500)
        );

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(chat.list().await.len(), 3);

        // Follow-up is due on the jumped wall clock but fires after the latency
        let follow_up = chat.pending().await.unwrap();
        assert_eq!(follow_up.state, ResponseState::Scheduled);
        assert_eq!(
            follow_up.due_at,
            start + chrono::Duration::days(1) + chrono::Duration::milliseconds(1500)
        );

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(chat.list().await.len(), 4);
        assert_eq!(chat.pending().await.unwrap().state, ResponseState::Delivered);
    }
}
