use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::storage::{DurableStorage, StorageError};
use crate::models::UserProfile;

/// Storage key for the bearer credential
pub const CREDENTIAL_KEY: &str = "session.credential";

/// Storage key for the cached profile (JSON)
pub const PROFILE_KEY: &str = "session.profile";

/// Buffer size for the session event channel.
/// Events are rare (one per login/logout/expiry), 16 leaves plenty of slack
/// for a slow view subscriber.
const EVENT_BUFFER_SIZE: usize = 16;

/// Who the current visitor is.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated {
        credential: String,
        profile: UserProfile,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn credential(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { credential, .. } => Some(credential),
            SessionState::Anonymous => None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated { profile, .. } => Some(profile),
            SessionState::Anonymous => None,
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Anonymous => f.write_str("Anonymous"),
            SessionState::Authenticated { profile, .. } => f
                .debug_struct("Authenticated")
                .field("credential", &"<redacted>")
                .field("username", &profile.username)
                .finish(),
        }
    }
}

/// Auth-state transitions, published to whoever renders the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A stored session was found at startup
    Restored(UserProfile),
    SignedIn(UserProfile),
    SignedOut,
    /// The backend rejected the credential; the session is gone
    Expired,
}

struct Inner {
    state: SessionState,
    initialized: bool,
}

/// Single owner of the persisted session.
///
/// Nothing else reads or writes the session keys. Credential and profile are
/// always written and removed together.
pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    inner: RwLock<Inner>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            storage,
            inner: RwLock::new(Inner {
                state: SessionState::Anonymous,
                initialized: false,
            }),
            events,
        }
    }

    /// Subscribe to auth-state transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Load the session from durable storage.
    ///
    /// Never fails: unreadable, half-present or corrupt sessions come back
    /// as `Anonymous`, and whatever was left behind is removed.
    pub fn restore(&self) -> SessionState {
        let mut inner = self.inner.write();
        let state = self.read_durable();
        inner.state = state.clone();
        inner.initialized = true;
        drop(inner);

        if let SessionState::Authenticated { ref profile, .. } = state {
            info!(username = %profile.username, "Session restored");
            self.publish(SessionEvent::Restored(profile.clone()));
        } else {
            debug!("No stored session");
        }
        state
    }

    fn read_durable(&self) -> SessionState {
        let credential = match self.storage.get(CREDENTIAL_KEY) {
            Ok(c) => c.filter(|c| !c.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                self.discard_durable();
                return SessionState::Anonymous;
            }
        };
        let profile = match self.storage.get(PROFILE_KEY) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to read stored profile");
                self.discard_durable();
                return SessionState::Anonymous;
            }
        };

        match (credential, profile) {
            (Some(credential), Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => SessionState::Authenticated { credential, profile },
                Err(e) => {
                    warn!(error = %e, "Stored profile is corrupt, discarding session");
                    self.discard_durable();
                    SessionState::Anonymous
                }
            },
            (None, None) => SessionState::Anonymous,
            (credential, _) => {
                warn!(
                    has_credential = credential.is_some(),
                    "Half-present session in storage, discarding"
                );
                self.discard_durable();
                SessionState::Anonymous
            }
        }
    }

    fn discard_durable(&self) {
        if let Err(e) = self.storage.remove_all(&[CREDENTIAL_KEY, PROFILE_KEY]) {
            warn!(error = %e, "Failed to remove stored session");
        }
    }

    /// Persist a new session, replacing any previous one.
    ///
    /// Both keys are written in one storage operation. If that fails the
    /// in-memory state is left untouched.
    pub fn save(&self, credential: String, profile: UserProfile) -> Result<(), StorageError> {
        let raw_profile = serde_json::to_string(&profile)?;
        let mut inner = self.inner.write();
        self.storage.put_all(&[
            (CREDENTIAL_KEY, credential.clone()),
            (PROFILE_KEY, raw_profile),
        ])?;
        inner.state = SessionState::Authenticated {
            credential,
            profile: profile.clone(),
        };
        inner.initialized = true;
        drop(inner);

        info!(username = %profile.username, "Session saved");
        self.publish(SessionEvent::SignedIn(profile));
        Ok(())
    }

    /// Remove the session. Calling this while anonymous is a no-op.
    ///
    /// The in-memory session is always dropped, even when removing the
    /// durable copy fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let was_authenticated = inner.state.is_authenticated();
        inner.state = SessionState::Anonymous;
        inner.initialized = true;
        let result = self.storage.remove_all(&[CREDENTIAL_KEY, PROFILE_KEY]);
        drop(inner);

        if was_authenticated {
            info!("Session cleared");
            self.publish(SessionEvent::SignedOut);
        }
        result
    }

    /// Invalidate the session if it still holds `credential`.
    ///
    /// Returns true only for the call that actually performed the
    /// transition, so concurrent failures with the same credential expire
    /// the session once.
    pub fn expire(&self, credential: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.state.credential() != Some(credential) {
            return false;
        }
        inner.state = SessionState::Anonymous;
        if let Err(e) = self.storage.remove_all(&[CREDENTIAL_KEY, PROFILE_KEY]) {
            warn!(error = %e, "Failed to remove expired session from storage");
        }
        drop(inner);

        warn!("Session expired, credential rejected by backend");
        self.publish(SessionEvent::Expired);
        true
    }

    /// In-memory state, without touching storage.
    ///
    /// Before `restore()` or `save()` has run this is `Anonymous`.
    pub fn current(&self) -> SessionState {
        let inner = self.inner.read();
        if !inner.initialized {
            debug!("Session read before restore");
        }
        inner.state.clone()
    }

    /// The bearer credential if signed in
    pub fn credential(&self) -> Option<String> {
        self.inner.read().state.credential().map(str::to_string)
    }

    /// The cached profile if signed in
    pub fn profile(&self) -> Option<UserProfile> {
        self.inner.read().state.profile().cloned()
    }
}
