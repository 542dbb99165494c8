//! Session domain module.
//!
//! This module contains the conversational session model: the turn timeline,
//! the response scheduler, the `Session` entity tying them together, and the
//! collaborator traits a backend implements.
//!
//! # Module Structure
//!
//! - `turn`: Turn types (`Turn`, `TurnId`, `TurnAuthor`)
//! - `timeline`: Append-only turn log (`Timeline`)
//! - `scheduler`: Response state machine (`ResponseScheduler`, `PendingResponse`)
//! - `model`: Session entity and lifecycle (`Session`)
//! - `event`: Notifications for the presentation layer (`SessionEvent`)
//! - `responder`: Inference collaborator trait (`ResponseGenerator`)
//! - `repository`: Persistence collaborator trait (`TurnRepository`)

mod event;
mod model;
mod repository;
mod responder;
mod scheduler;
mod timeline;
mod turn;

// Re-export public API
pub use event::SessionEvent;
pub use model::{Delivery, Session, SessionState, SubmitOutcome};
pub use repository::TurnRepository;
pub use responder::ResponseGenerator;
pub use scheduler::{
    OverlapPolicy, PendingResponse, ResponseScheduler, ResponseState, ScheduledResponse,
};
pub use timeline::Timeline;
pub use turn::{Turn, TurnAuthor, TurnId};
