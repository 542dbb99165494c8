//! Response scheduling state machine.
//!
//! Each request moves `idle -> scheduled -> {delivered | cancelled}`. The
//! scheduler itself never waits on time: it hands out a `ScheduledResponse`
//! token that the caller registers with whatever timer facility it runs on,
//! and checks that token again when the timer fires.

use super::turn::TurnId;
use crate::error::SereneError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of a pending counterpart response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseState {
    Scheduled,
    Delivered,
    Cancelled,
}

/// Handling of triggers that arrive while a response is still scheduled.
///
/// Only one response is ever scheduled at a time under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Remember the latest unanswered local turn and answer it once the
    /// current response is delivered.
    #[default]
    Coalesce,
    /// Discard the trigger.
    Drop,
}

/// Record of the counterpart reply owed for a local turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingResponse {
    pub for_turn_id: TurnId,
    pub due_at: DateTime<Utc>,
    pub state: ResponseState,
    pub generation: u64,
}

/// Token for one scheduling act.
///
/// The timer that fires at `due_at` carries this token back. A token whose
/// generation no longer matches the scheduler's pending record is stale and
/// its delivery is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledResponse {
    pub for_turn_id: TurnId,
    pub due_at: DateTime<Utc>,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct ResponseScheduler {
    latency: Duration,
    policy: OverlapPolicy,
    pending: Option<PendingResponse>,
    /// Latest local turn that arrived while a response was scheduled
    deferred: Option<TurnId>,
    generation: u64,
}

impl ResponseScheduler {
    pub fn new(latency: Duration, policy: OverlapPolicy) -> Self {
        Self {
            latency,
            policy,
            pending: None,
            deferred: None,
            generation: 0,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// The most recent pending record, in whatever state it ended.
    pub fn pending(&self) -> Option<&PendingResponse> {
        self.pending.as_ref()
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(
            self.pending,
            Some(PendingResponse {
                state: ResponseState::Scheduled,
                ..
            })
        )
    }

    /// Local turn waiting for a follow-up response under `Coalesce`.
    pub fn deferred(&self) -> Option<TurnId> {
        self.deferred
    }

    /// Requests a response for `turn_id`.
    ///
    /// Returns the token to register with a timer, or `None` when a response
    /// is already scheduled. That conflict is resolved by the overlap policy
    /// and never reported to the caller as an error.
    pub fn trigger(&mut self, turn_id: TurnId, now: DateTime<Utc>) -> Option<ScheduledResponse> {
        if let Some(pending) = self.pending.as_ref().filter(|p| p.state == ResponseState::Scheduled) {
            let conflict = SereneError::SchedulingConflict {
                pending_for: pending.for_turn_id.0,
            };
            match self.policy {
                OverlapPolicy::Coalesce => {
                    tracing::debug!("[Scheduler] {}; deferring turn {}", conflict, turn_id);
                    self.deferred = Some(turn_id);
                }
                OverlapPolicy::Drop => {
                    tracing::debug!("[Scheduler] {}; dropping trigger for turn {}", conflict, turn_id);
                }
            }
            return None;
        }
        Some(self.schedule(turn_id, now))
    }

    /// Returns true if `token` is the live scheduled response.
    pub fn is_current(&self, token: &ScheduledResponse) -> bool {
        matches!(
            &self.pending,
            Some(p) if p.generation == token.generation && p.state == ResponseState::Scheduled
        )
    }

    /// Scheduled token whose due time has passed, if any.
    ///
    /// Lets an event loop without timers poll the scheduler.
    pub fn due(&self, now: DateTime<Utc>) -> Option<ScheduledResponse> {
        self.pending
            .as_ref()
            .filter(|p| p.state == ResponseState::Scheduled && p.due_at <= now)
            .map(|p| ScheduledResponse {
                for_turn_id: p.for_turn_id,
                due_at: p.due_at,
                generation: p.generation,
            })
    }

    /// Marks the response for `token` delivered.
    ///
    /// Returns the follow-up token when a deferred turn is waiting. A stale
    /// token leaves the scheduler untouched and returns `None`.
    pub fn mark_delivered(
        &mut self,
        token: &ScheduledResponse,
        now: DateTime<Utc>,
    ) -> Option<ScheduledResponse> {
        if !self.is_current(token) {
            tracing::debug!(
                "[Scheduler] Ignoring stale delivery for turn {} (generation {})",
                token.for_turn_id,
                token.generation
            );
            return None;
        }
        if let Some(pending) = self.pending.as_mut() {
            pending.state = ResponseState::Delivered;
        }
        tracing::debug!("[Scheduler] Delivered response for turn {}", token.for_turn_id);

        self.deferred
            .take()
            .filter(|deferred| *deferred > token.for_turn_id)
            .map(|deferred| self.schedule(deferred, now))
    }

    /// Cancels the scheduled response, if any.
    ///
    /// Idempotent: cancelling twice or after delivery does nothing. Returns
    /// true when a scheduled response was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        self.deferred = None;
        match self.pending.as_mut() {
            Some(pending) if pending.state == ResponseState::Scheduled => {
                pending.state = ResponseState::Cancelled;
                tracing::debug!("[Scheduler] Cancelled response for turn {}", pending.for_turn_id);
                true
            }
            _ => false,
        }
    }

    fn schedule(&mut self, turn_id: TurnId, now: DateTime<Utc>) -> ScheduledResponse {
        self.generation += 1;
        // Latencies past chrono's range saturate instead of overflowing
        let due_at = chrono::Duration::from_std(self.latency)
            .ok()
            .and_then(|latency| now.checked_add_signed(latency))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.pending = Some(PendingResponse {
            for_turn_id: turn_id,
            due_at,
            state: ResponseState::Scheduled,
            generation: self.generation,
        });
        tracing::debug!(
            "[Scheduler] Scheduled response for turn {} at {} (generation {})",
            turn_id,
            due_at,
            self.generation
        );
        ScheduledResponse {
            for_turn_id: turn_id,
            due_at,
            generation: self.generation,
        }
    }
}
