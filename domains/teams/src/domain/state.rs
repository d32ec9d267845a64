//! Invite state machine
//!
//! The state is derived from the stored `read`/`accepted` flags:
//!
//! | read  | accepted | state         |
//! |-------|----------|---------------|
//! | false | false    | `Pending`     |
//! | true  | false    | `ReadPending` |
//! | any   | true     | `Accepted`    |
//!
//! `Accepted` is terminal. Every transition requires the invite to be
//! unexpired.

use crewdesk_common::Error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Guard condition failed: {0}")]
    GuardFailed(String),

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        Error::Conflict(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteState {
    Pending,
    ReadPending,
    Accepted,
}

impl InviteState {
    pub fn from_flags(read: bool, accepted: bool) -> Self {
        match (read, accepted) {
            (_, true) => Self::Accepted,
            (true, false) => Self::ReadPending,
            (false, false) => Self::Pending,
        }
    }

    /// Flags persisted for this state
    pub fn flags(&self) -> (bool, bool) {
        match self {
            Self::Pending => (false, false),
            Self::ReadPending => (true, false),
            Self::Accepted => (true, true),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for InviteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::ReadPending => write!(f, "read_pending"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

/// Events that trigger invite state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteEvent {
    /// Invitee opened the invite without accepting
    MarkRead,
    /// Invitee accepted the invite
    Accept,
}

impl InviteEvent {
    /// Event for an update request carrying the `accepted` flag
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            Self::Accept
        } else {
            Self::MarkRead
        }
    }
}

impl std::fmt::Display for InviteEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MarkRead => write!(f, "mark_read"),
            Self::Accept => write!(f, "accept"),
        }
    }
}

/// Guard context for invite transitions
#[derive(Debug, Clone)]
pub struct InviteGuardContext {
    /// Whether `now >= expiration`
    pub is_expired: bool,
}

pub struct InviteStateMachine;

impl InviteStateMachine {
    /// Attempt a state transition with guard conditions
    pub fn transition(
        current: InviteState,
        event: InviteEvent,
        context: &InviteGuardContext,
    ) -> Result<InviteState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        if context.is_expired {
            return Err(StateError::GuardFailed(format!(
                "Cannot {} an expired invite",
                event
            )));
        }

        let next = match event {
            InviteEvent::MarkRead => InviteState::ReadPending,
            InviteEvent::Accept => InviteState::Accepted,
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(
        current: InviteState,
        event: InviteEvent,
        context: &InviteGuardContext,
    ) -> bool {
        Self::transition(current, event, context).is_ok()
    }
}
