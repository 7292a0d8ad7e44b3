//! Client sessions: the per-caller isolation boundary.
//!
//! The session map is guarded by one RwLock held only for map operations;
//! each session's state sits behind its own mutex, so requests from the
//! same client serialize while different clients proceed in parallel.
//! Eviction takes the per-session lock before removing a session from the
//! map, so it can never pull state out from under an in-flight request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use kernel_bridge::Kernel;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::registry::ShapeRegistry;

/// Metadata key carrying the caller's stable identifier.
pub const CLIENT_ID_METADATA_KEY: &str = "client-id";

/// Per-request call context: transport metadata plus an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub metadata: HashMap<String, String>,
    pub deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context identifying a specific client.
    pub fn for_client(client_id: impl Into<String>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(CLIENT_ID_METADATA_KEY.to_string(), client_id.into());
        Self {
            metadata,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Mutable state of one session, guarded by the session mutex.
pub struct SessionState {
    pub registry: ShapeRegistry,
    pub last_activity: Instant,
}

/// One client's isolated shape store.
pub struct ClientSession {
    client_id: String,
    state: Mutex<SessionState>,
}

impl ClientSession {
    fn new(client_id: String) -> Self {
        Self {
            client_id,
            state: Mutex::new(SessionState {
                registry: ShapeRegistry::new(),
                last_activity: Instant::now(),
            }),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Lock this session's state. Requests for the same client serialize
    /// here.
    pub fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock()
    }
}

/// Maps client ids to sessions, creating lazily and reaping idle ones.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<ClientSession>>>,
    default_client_id: String,
}

impl SessionManager {
    pub fn new(default_client_id: String) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_client_id,
        }
    }

    /// Extract the caller's stable id from request metadata. Callers that
    /// send none all share the default session.
    pub fn resolve_client_id(&self, ctx: &RequestContext) -> String {
        match ctx.metadata.get(CLIENT_ID_METADATA_KEY) {
            Some(id) if !id.is_empty() => id.clone(),
            _ => self.default_client_id.clone(),
        }
    }

    /// Fetch the caller's session, creating it on first contact. Touches
    /// `last_activity` either way. Never returns null.
    pub fn get_or_create(&self, client_id: &str) -> Arc<ClientSession> {
        if let Some(session) = self.sessions.read().get(client_id) {
            session.state().last_activity = Instant::now();
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write();
        // Re-check: another thread may have inserted while we upgraded.
        if let Some(session) = sessions.get(client_id) {
            session.state().last_activity = Instant::now();
            return Arc::clone(session);
        }

        debug!(client_id, "creating session");
        let session = Arc::new(ClientSession::new(client_id.to_string()));
        sessions.insert(client_id.to_string(), Arc::clone(&session));
        session
    }

    /// Reap sessions idle beyond `timeout`, releasing every kernel handle
    /// they own. Returns the number of sessions removed.
    pub fn cleanup_inactive<K: Kernel>(
        &self,
        timeout: Duration,
        kernel: &Mutex<K>,
    ) -> usize {
        let mut reaped = 0;
        let mut sessions = self.sessions.write();
        sessions.retain(|client_id, session| {
            // The per-session lock orders us after any in-flight request.
            let mut state = session.state();
            if state.last_activity.elapsed() < timeout {
                return true;
            }
            let records = state.registry.clear();
            if !records.is_empty() {
                let mut kernel = kernel.lock();
                for record in &records {
                    kernel.release(&record.handle);
                }
            }
            info!(client_id = %client_id, shapes = records.len(), "session expired");
            reaped += 1;
            false
        });
        reaped
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}
