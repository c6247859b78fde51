//! Session Management
//!
//! One [`Session`] per live conversation: it owns the history, the
//! cancellation token, and a busy flag so two loop runs can never mutate
//! one history at the same time. The manager hands out sessions behind a
//! `Mutex`, which makes that exclusion structural.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::history::ConversationHistory;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub type SessionId = String;

/// One live conversation with one agent.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    /// Name of the agent this session talks to.
    pub agent: String,
    /// The conversation so far.
    pub history: ConversationHistory,
    /// Cancellation token for the in-flight run.
    pub cancel_token: CancellationToken,
    /// Whether a run is currently in flight. Set via [`Session::begin_run`]
    /// and cleared via [`Session::finish_run`].
    is_busy: bool,
}

impl Session {
    pub fn new(agent: &str, history: ConversationHistory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            agent: agent.to_string(),
            history,
            cancel_token: CancellationToken::new(),
            is_busy: false,
        }
    }

    /// Cancel the in-flight run, if any.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Mark the session busy and hand out a fresh token for the run.
    /// Fails while another run is in flight, so one history is never
    /// mutated by two loops at once.
    pub fn begin_run(&mut self) -> Result<()> {
        if self.is_busy {
            bail!("session '{}' already has a run in flight", self.id);
        }
        self.is_busy = true;
        self.cancel_token = CancellationToken::new();
        Ok(())
    }

    /// Clear the busy flag once the run has returned.
    pub fn finish_run(&mut self) {
        self.is_busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }
}

// ---------------------------------------------------------------------------
// Session Manager
// ---------------------------------------------------------------------------

/// Holds all live sessions.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a session, optionally seeded with persisted history.
    pub async fn create_session(&self, agent: &str, history: ConversationHistory) -> SessionId {
        let session = Session::new(agent, history);
        let id = session.id.clone();
        tracing::info!(session_id = %id, agent, "created session");

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get_session(&self, id: &str) -> Result<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("session '{}' not found", id))
    }

    /// Cancel a session's in-flight run.
    pub async fn cancel_session(&self, id: &str) -> Result<()> {
        let session_arc = self.get_session(id).await?;
        let session = session_arc.lock().await;
        session.cancel();
        tracing::info!(session_id = %id, "cancelled session");
        Ok(())
    }

    pub async fn remove_session(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(id).is_some() {
            tracing::info!(session_id = %id, "removed session");
            Ok(())
        } else {
            bail!("session '{}' not found", id)
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
