//! Session domain model.
//!
//! A `Session` owns one timeline and its single pending-response slot, and
//! has an explicit `Open -> Closed` lifecycle.

use super::scheduler::{ResponseScheduler, ScheduledResponse};
use super::timeline::Timeline;
use super::turn::Turn;
use crate::config::ChatConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    Closed,
}

/// Result of a successful local submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub turn: Turn,
    /// Token to register with a timer; `None` when another response was
    /// already scheduled.
    pub scheduled: Option<ScheduledResponse>,
}

/// Result of delivering a scheduled response.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub turn: Turn,
    /// Follow-up response scheduled for a deferred local turn.
    pub follow_up: Option<ScheduledResponse>,
    /// True when the generator failed and the fallback message was used.
    pub used_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    pub created_at: DateTime<Utc>,
    state: SessionState,
    timeline: Timeline,
    scheduler: ResponseScheduler,
    fallback_message: String,
}

impl Session {
    /// Opens an empty session.
    pub fn new(config: &ChatConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            state: SessionState::Open,
            timeline: Timeline::new(),
            scheduler: ResponseScheduler::new(config.response_latency(), config.overlap_policy),
            fallback_message: config.fallback_message.clone(),
        }
    }

    /// Opens a session whose timeline starts with the configured greeting.
    ///
    /// A missing or blank greeting yields an empty timeline.
    pub fn with_greeting(config: &ChatConfig, now: DateTime<Utc>) -> Self {
        let mut session = Self::new(config, now);
        if let Some(greeting) = config.greeting.as_deref().filter(|g| !g.trim().is_empty()) {
            session.timeline.append_counterpart(greeting, now);
        }
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn scheduler(&self) -> &ResponseScheduler {
        &self.scheduler
    }

    /// Snapshot of the committed turns.
    pub fn transcript(&self) -> Vec<Turn> {
        self.timeline.list()
    }

    /// Commits a local turn and asks the scheduler for a response.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` for blank text
    /// - `SessionClosed` once the session has been closed
    pub fn submit_local(&mut self, text: &str, now: DateTime<Utc>) -> Result<SubmitOutcome> {
        let turn = self.timeline.submit_local(text, now)?;
        let scheduled = self.scheduler.trigger(turn.id, now);
        Ok(SubmitOutcome { turn, scheduled })
    }

    /// Returns true while `token` is still owed a delivery.
    pub fn is_awaiting(&self, token: &ScheduledResponse) -> bool {
        self.is_open() && self.scheduler.is_current(token)
    }

    /// Delivers the response for `token`.
    ///
    /// Returns `None` and changes nothing when the token is stale (cancelled,
    /// superseded or already delivered) or the session is closed. A generator
    /// failure or blank output is replaced by the fallback message, so a live
    /// token always ends `Delivered`.
    pub fn complete_response(
        &mut self,
        token: &ScheduledResponse,
        generated: Result<String>,
        now: DateTime<Utc>,
    ) -> Option<Delivery> {
        if !self.is_awaiting(token) {
            tracing::debug!(
                "[Session] Ignoring delivery for turn {} in session {}",
                token.for_turn_id,
                self.id
            );
            return None;
        }

        let (text, used_fallback) = match generated {
            Ok(text) if !text.trim().is_empty() => (text, false),
            Ok(_) => {
                tracing::warn!("[Session] Response generator returned empty text, using fallback");
                (self.fallback_message.clone(), true)
            }
            Err(e) => {
                tracing::warn!("[Session] Response generation failed, using fallback: {}", e);
                (self.fallback_message.clone(), true)
            }
        };

        let turn = self.timeline.append_counterpart(&text, now)?;
        let follow_up = self.scheduler.mark_delivered(token, now);
        Some(Delivery {
            turn,
            follow_up,
            used_fallback,
        })
    }

    /// Closes the session.
    ///
    /// Cancels any scheduled response before sealing the timeline, and
    /// returns the drained transcript. Closing twice returns an empty vector.
    pub fn close(&mut self) -> Vec<Turn> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }
        self.scheduler.cancel();
        self.state = SessionState::Closed;
        tracing::info!("[Session] Closed session {}", self.id);
        self.timeline.seal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::error::SereneError;
    use crate::session::{OverlapPolicy, ResponseState, TurnAuthor, TurnId};
    use chrono::{Duration, TimeZone};

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    fn config(policy: OverlapPolicy) -> ChatConfig {
        ChatConfig {
            overlap_policy: policy,
            greeting: None,
            ..ChatConfig::default()
        }
    }

    #[test]
    fn test_greeting_opens_the_timeline() {
        let clock = clock();
        let session = Session::with_greeting(&ChatConfig::default(), clock.now());

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].author, TurnAuthor::Counterpart);
        assert!(!session.scheduler().is_scheduled());
    }

    #[test]
    fn test_submit_schedules_and_delivery_appends_counterpart() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Coalesce), clock.now());

        let outcome = session.submit_local("hello", clock.now()).unwrap();
        let token = outcome.scheduled.unwrap();
        assert_eq!(session.scheduler().pending().unwrap().state, ResponseState::Scheduled);

        clock.advance(Duration::milliseconds(1500));
        assert_eq!(session.scheduler().due(clock.now()), Some(token));

        let delivery = session
            .complete_response(&token, Ok("I'm listening.".to_string()), clock.now())
            .unwrap();

        assert_eq!(delivery.turn.author, TurnAuthor::Counterpart);
        assert_eq!(delivery.turn.text, "I'm listening.");
        assert!(!delivery.used_fallback);
        assert_eq!(session.scheduler().pending().unwrap().state, ResponseState::Delivered);
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn test_empty_submission_creates_nothing() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Coalesce), clock.now());

        assert_eq!(
            session.submit_local("   ", clock.now()),
            Err(SereneError::EmptyInput)
        );
        assert!(session.transcript().is_empty());
        assert!(session.scheduler().pending().is_none());
    }

    #[test]
    fn test_generator_failure_delivers_fallback() {
        let clock = clock();
        let chat = config(OverlapPolicy::Coalesce);
        let mut session = Session::new(&chat, clock.now());
        let token = session.submit_local("hello", clock.now()).unwrap().scheduled.unwrap();

        let delivery = session
            .complete_response(&token, Err(SereneError::delivery("model offline")), clock.now())
            .unwrap();

        assert!(delivery.used_fallback);
        assert_eq!(delivery.turn.text, chat.fallback_message);
        assert_eq!(session.scheduler().pending().unwrap().state, ResponseState::Delivered);
    }

    #[test]
    fn test_blank_generator_output_delivers_fallback() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Coalesce), clock.now());
        let token = session.submit_local("hello", clock.now()).unwrap().scheduled.unwrap();

        let delivery = session
            .complete_response(&token, Ok("  ".to_string()), clock.now())
            .unwrap();

        assert!(delivery.used_fallback);
    }

    #[test]
    fn test_close_before_due_suppresses_late_delivery() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Coalesce), clock.now());
        let token = session.submit_local("hello", clock.now()).unwrap().scheduled.unwrap();

        let drained = session.close();
        assert_eq!(drained.len(), 1);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.scheduler().pending().unwrap().state, ResponseState::Cancelled);

        clock.advance(Duration::seconds(5));
        assert!(session
            .complete_response(&token, Ok("too late".to_string()), clock.now())
            .is_none());
        assert!(session.transcript().is_empty());

        // Idempotent
        assert!(session.close().is_empty());
        assert_eq!(
            session.submit_local("anyone?", clock.now()),
            Err(SereneError::SessionClosed)
        );
    }

    #[test]
    fn test_three_quick_submissions_keep_one_outstanding_response() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Coalesce), clock.now());

        let first = session.submit_local("one", clock.now()).unwrap();
        let second = session.submit_local("two", clock.now()).unwrap();
        let third = session.submit_local("three", clock.now()).unwrap();

        let token = first.scheduled.unwrap();
        assert!(second.scheduled.is_none());
        assert!(third.scheduled.is_none());

        clock.advance(Duration::milliseconds(1500));
        let delivery = session
            .complete_response(&token, Ok("reply".to_string()), clock.now())
            .unwrap();

        // Only the latest unanswered turn gets a follow-up
        let follow_up = delivery.follow_up.unwrap();
        assert_eq!(follow_up.for_turn_id, TurnId(3));
        assert!(session.scheduler().is_scheduled());

        clock.advance(Duration::milliseconds(1500));
        let last = session
            .complete_response(&follow_up, Ok("reply".to_string()), clock.now())
            .unwrap();
        assert!(last.follow_up.is_none());

        let counterpart_turns = session
            .transcript()
            .iter()
            .filter(|t| t.is_counterpart())
            .count();
        assert_eq!(counterpart_turns, 2);
    }

    #[test]
    fn test_drop_policy_answers_only_first_of_burst() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Drop), clock.now());

        let token = session.submit_local("one", clock.now()).unwrap().scheduled.unwrap();
        assert!(session.submit_local("two", clock.now()).unwrap().scheduled.is_none());
        assert!(session.submit_local("three", clock.now()).unwrap().scheduled.is_none());

        let delivery = session
            .complete_response(&token, Ok("reply".to_string()), clock.now())
            .unwrap();
        assert!(delivery.follow_up.is_none());
        assert!(!session.scheduler().is_scheduled());
    }

    #[test]
    fn test_duplicate_delivery_is_ignored() {
        let clock = clock();
        let mut session = Session::new(&config(OverlapPolicy::Coalesce), clock.now());
        let token = session.submit_local("hello", clock.now()).unwrap().scheduled.unwrap();

        assert!(session.complete_response(&token, Ok("a".to_string()), clock.now()).is_some());
        assert!(session.complete_response(&token, Ok("b".to_string()), clock.now()).is_none());
        assert_eq!(session.transcript().len(), 2);
    }
}
