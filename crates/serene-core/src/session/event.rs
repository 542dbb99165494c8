use serde::{Deserialize, Serialize};

use super::{ScheduledResponse, Turn, TurnId};

/// Notifications published to the presentation layer.
///
/// These are read-only; consumers never write back into the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A turn was appended to the timeline.
    TurnCommitted { turn: Turn },
    /// A counterpart response was scheduled.
    ResponseScheduled { response: ScheduledResponse },
    /// The scheduled response was delivered.
    ResponseDelivered {
        for_turn_id: TurnId,
        #[serde(default)]
        used_fallback: bool,
    },
    /// The scheduled response was cancelled before delivery.
    ResponseCancelled { for_turn_id: TurnId },
    /// The session was closed; no further events follow.
    SessionClosed { session_id: String },
}
