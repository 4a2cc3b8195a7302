//! SessionStore - actor that owns every Session record
//!
//! Processes commands via channels. Each command is applied atomically, but a
//! caller that reads a session, awaits something else and then writes back
//! holds no lock in between: two such callers on the same id race and the
//! last update wins.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::{Session, SessionContext};

use super::messages::{SessionUpdate, StoreCommand, StoreError, StoreResponse};

/// Handle to send commands to the store actor
#[derive(Clone)]
pub struct SessionStore {
    tx: mpsc::Sender<StoreCommand>,
}

impl SessionStore {
    /// Spawn a new store actor on the current tokio runtime
    pub fn spawn() -> Self {
        debug!("spawn: called");
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(actor_loop(Sessions::default(), rx));
        info!("SessionStore spawned");
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<StoreResponse<T>>) -> StoreCommand,
    ) -> StoreResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| StoreError::ChannelError)?;
        reply_rx.await.map_err(|_| StoreError::ChannelError)?
    }

    /// Create and persist a new session
    pub async fn create(&self, requirement: impl Into<String>, context: SessionContext) -> StoreResponse<Session> {
        let session = Session::new(requirement, context);
        debug!(session_id = %session.id, "create: called");
        self.insert(session).await
    }

    /// Persist a fully built session (ids must be unique)
    pub async fn insert(&self, session: Session) -> StoreResponse<Session> {
        debug!(session_id = %session.id, "insert: called");
        self.request(|reply| StoreCommand::Create { session, reply }).await
    }

    /// Get a session by id
    pub async fn get(&self, id: &str) -> StoreResponse<Option<Session>> {
        debug!(%id, "get: called");
        let id = id.to_string();
        self.request(|reply| StoreCommand::Get { id, reply }).await
    }

    /// Get a session by id, returning an error if not found
    pub async fn get_required(&self, id: &str) -> StoreResponse<Session> {
        debug!(%id, "get_required: called");
        self.get(id).await?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Merge a partial update into a stored session and return the new value
    pub async fn update(&self, id: &str, update: SessionUpdate) -> StoreResponse<Option<Session>> {
        debug!(%id, ?update.status, ?update.round_count, "update: called");
        let id = id.to_string();
        self.request(|reply| StoreCommand::Update { id, update, reply }).await
    }

    /// Snapshot of all sessions
    pub async fn list(&self) -> StoreResponse<Vec<Session>> {
        debug!("list: called");
        self.request(|reply| StoreCommand::List { reply }).await
    }

    /// Remove a session; returns whether one existed
    pub async fn delete(&self, id: &str) -> StoreResponse<bool> {
        debug!(%id, "delete: called");
        let id = id.to_string();
        self.request(|reply| StoreCommand::Delete { id, reply }).await
    }
}

/// In-memory records, listed in insertion order
#[derive(Default)]
struct Sessions {
    records: HashMap<String, Session>,
    order: Vec<String>,
}

impl Sessions {
    fn create(&mut self, session: Session) -> StoreResponse<Session> {
        if self.records.contains_key(&session.id) {
            return Err(StoreError::Duplicate(session.id));
        }
        self.order.push(session.id.clone());
        self.records.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update(&mut self, id: &str, update: SessionUpdate) -> Option<Session> {
        let session = self.records.get_mut(id)?;
        update.apply_to(session);
        session.updated_at = Utc::now();
        Some(session.clone())
    }

    fn list(&self) -> Vec<Session> {
        self.order.iter().filter_map(|id| self.records.get(id)).cloned().collect()
    }

    fn delete(&mut self, id: &str) -> bool {
        let existed = self.records.remove(id).is_some();
        if existed {
            self.order.retain(|o| o != id);
        }
        existed
    }
}

async fn actor_loop(mut sessions: Sessions, mut rx: mpsc::Receiver<StoreCommand>) {
    debug!("SessionStore actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::Create { session, reply } => {
                debug!(session_id = %session.id, "actor_loop: Create command");
                let _ = reply.send(sessions.create(session));
            }
            StoreCommand::Get { id, reply } => {
                debug!(%id, "actor_loop: Get command");
                let _ = reply.send(Ok(sessions.records.get(&id).cloned()));
            }
            StoreCommand::Update { id, update, reply } => {
                debug!(%id, "actor_loop: Update command");
                let _ = reply.send(Ok(sessions.update(&id, update)));
            }
            StoreCommand::List { reply } => {
                debug!(count = sessions.records.len(), "actor_loop: List command");
                let _ = reply.send(Ok(sessions.list()));
            }
            StoreCommand::Delete { id, reply } => {
                debug!(%id, "actor_loop: Delete command");
                let existed = sessions.delete(&id);
                if existed {
                    info!(session_id = %id, "Deleted session");
                }
                let _ = reply.send(Ok(existed));
            }
        }
    }

    debug!("SessionStore actor stopped");
}
