//! In-memory session registry keyed by [`SessionId`].

use std::collections::HashMap;

use st_common::{Error, Result, SessionId};
use tracing::info;

use super::controller::DialogController;
use super::reply::Reply;
use super::session::Session;
use crate::logging::event_names;

/// Open conversations for one process. Nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new conversation and return its id.
    pub fn open(&mut self) -> SessionId {
        let mut session = Session::new();
        // Ids carry second resolution plus a random suffix; retry on the rare clash.
        while self.sessions.contains_key(&session.id) {
            session = Session::new();
        }
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);
        info!(event = event_names::SESSION_OPENED, session_id = %id, "Session opened");
        id
    }

    pub fn get(&self, id: &SessionId) -> Result<&Session> {
        self.sessions.get(id).ok_or_else(|| not_found(id))
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Result<&mut Session> {
        self.sessions.get_mut(id).ok_or_else(|| not_found(id))
    }

    /// End a conversation, returning its final state.
    pub fn close(&mut self, id: &SessionId) -> Result<Session> {
        let session = self.sessions.remove(id).ok_or_else(|| not_found(id))?;
        info!(event = event_names::SESSION_CLOSED, session_id = %id, "Session closed");
        Ok(session)
    }

    /// Run one turn of the conversation `id`.
    pub fn handle_turn(
        &mut self,
        controller: &DialogController,
        id: &SessionId,
        raw_input: &str,
    ) -> Result<Reply> {
        let session = self.get_mut(id)?;
        Ok(controller.handle_turn(session, raw_input))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Open session ids, sorted.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn not_found(id: &SessionId) -> Error {
    Error::SessionNotFound {
        session_id: id.to_string(),
    }
}
