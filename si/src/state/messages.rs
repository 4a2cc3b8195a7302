//! Session store messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{Clarification, CompletenessScore, Session, SessionStatus};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Duplicate session id: {0}")]
    Duplicate(String),

    #[error("Channel error")]
    ChannelError,
}

/// Response from store operations
pub type StoreResponse<T> = Result<T, StoreError>;

/// Partial update of a stored session
///
/// Each present field replaces the stored value wholesale. `updated_at` is
/// always refreshed by the store.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub clarifications: Option<Vec<Clarification>>,
    pub completeness: Option<CompletenessScore>,
    pub assumptions: Option<Vec<String>>,
    pub status: Option<SessionStatus>,
    pub round_count: Option<u32>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clarifications(mut self, clarifications: Vec<Clarification>) -> Self {
        self.clarifications = Some(clarifications);
        self
    }

    pub fn completeness(mut self, completeness: CompletenessScore) -> Self {
        self.completeness = Some(completeness);
        self
    }

    pub fn assumptions(mut self, assumptions: Vec<String>) -> Self {
        self.assumptions = Some(assumptions);
        self
    }

    pub fn status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn round_count(mut self, round_count: u32) -> Self {
        self.round_count = Some(round_count);
        self
    }

    /// Merge the present fields into a session
    pub fn apply_to(self, session: &mut Session) {
        if let Some(clarifications) = self.clarifications {
            session.clarifications = clarifications;
        }
        if let Some(completeness) = self.completeness {
            session.completeness = completeness;
        }
        if let Some(assumptions) = self.assumptions {
            session.assumptions = assumptions;
        }
        if let Some(status) = self.status {
            session.status = status;
        }
        if let Some(round_count) = self.round_count {
            session.round_count = round_count;
        }
    }
}

/// Commands sent to the SessionStore actor
#[derive(Debug)]
pub enum StoreCommand {
    Create {
        session: Session,
        reply: oneshot::Sender<StoreResponse<Session>>,
    },
    Get {
        id: String,
        reply: oneshot::Sender<StoreResponse<Option<Session>>>,
    },
    Update {
        id: String,
        update: SessionUpdate,
        reply: oneshot::Sender<StoreResponse<Option<Session>>>,
    },
    List {
        reply: oneshot::Sender<StoreResponse<Vec<Session>>>,
    },
    Delete {
        id: String,
        reply: oneshot::Sender<StoreResponse<bool>>,
    },
}
