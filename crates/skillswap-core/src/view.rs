//! Structured view state for a rendering layer.
//!
//! The controller never touches the screen. It produces a `ViewState`
//! (which page, who is signed in, what message to show) and the front end
//! binds that to whatever it draws with.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::{SessionEvent, SessionState, SessionStore};
use crate::models::UserProfile;

/// Top-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Route {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ViewState {
    pub route: Route,
    pub user: Option<UserProfile>,
    pub notice: Option<Notice>,
}

impl ViewState {
    /// Anonymous visitors see the login page; everyone else the dashboard.
    pub fn for_session(state: &SessionState, notice: Option<Notice>) -> Self {
        match state {
            SessionState::Anonymous => Self { route: Route::Login, user: None, notice },
            SessionState::Authenticated { profile, .. } => Self {
                route: Route::Dashboard,
                user: Some(profile.clone()),
                notice,
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Message to show when a session event happens.
pub fn notice_for_event(event: &SessionEvent) -> Option<Notice> {
    match event {
        SessionEvent::Restored(_) => None,
        SessionEvent::SignedIn(profile) => {
            Some(Notice::success(format!("Welcome, {}!", profile.display_name())))
        }
        SessionEvent::SignedOut => Some(Notice::info("You have been logged out.")),
        SessionEvent::Expired => Some(Notice::error("Your session has expired. Please log in again.")),
    }
}

/// Keep a `watch` channel of `ViewState` in step with the session.
///
/// For long-lived front ends. Spawns a task on the current tokio runtime
/// that exits once every receiver is dropped.
pub fn watch_session(store: Arc<SessionStore>) -> watch::Receiver<ViewState> {
    let (tx, rx) = watch::channel(ViewState::for_session(&store.current(), None));
    spawn_refresher(store, tx);
    rx
}

fn spawn_refresher(store: Arc<SessionStore>, tx: watch::Sender<ViewState>) -> JoinHandle<()> {
    let mut events = store.subscribe();

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                _ = tx.closed() => break,
                received = events.recv() => received,
            };
            let notice = match received {
                Ok(event) => {
                    debug!(?event, "Refreshing view");
                    notice_for_event(&event)
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "View refresher fell behind session events");
                    None
                }
                Err(RecvError::Closed) => break,
            };
            if tx.send(ViewState::for_session(&store.current(), notice)).is_err() {
                break;
            }
        }
        debug!("View refresher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;

    fn bob() -> UserProfile {
        UserProfile {
            id: 1,
            username: "bob".to_string(),
            full_name: "Bob".to_string(),
            email: String::new(),
            bio: None,
        }
    }

    #[test]
    fn test_view_for_session() {
        let anon = ViewState::for_session(&SessionState::Anonymous, None);
        assert_eq!(anon.route, Route::Login);
        assert!(!anon.is_authenticated());

        let state = SessionState::Authenticated { credential: "t".to_string(), profile: bob() };
        let view = ViewState::for_session(&state, Some(Notice::info("hi")));
        assert_eq!(view.route, Route::Dashboard);
        assert_eq!(view.user, Some(bob()));
        assert_eq!(view.notice, Some(Notice::info("hi")));
    }

    #[test]
    fn test_notice_for_event() {
        assert_eq!(notice_for_event(&SessionEvent::Restored(bob())), None);
        assert_eq!(
            notice_for_event(&SessionEvent::SignedIn(bob())),
            Some(Notice::success("Welcome, Bob!"))
        );
        assert_eq!(
            notice_for_event(&SessionEvent::Expired).map(|n| n.level),
            Some(NoticeLevel::Error)
        );
    }

    #[tokio::test]
    async fn test_watch_session_follows_transitions() {
        let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        store.restore();
        let mut rx = watch_session(store.clone());
        assert_eq!(rx.borrow().route, Route::Login);

        store.save("tok".to_string(), bob()).expect("save");
        rx.changed().await.expect("view update");
        assert_eq!(rx.borrow_and_update().route, Route::Dashboard);

        assert!(store.expire("tok"));
        rx.changed().await.expect("view update");
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.route, Route::Login);
        assert_eq!(view.notice.map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[tokio::test]
    async fn test_refresher_stops_when_receiver_dropped() {
        let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        store.restore();
        let (tx, rx) = watch::channel(ViewState::for_session(&store.current(), None));
        let handle = spawn_refresher(store.clone(), tx);

        drop(rx);
        handle.await.expect("refresher task");
        assert_eq!(Arc::strong_count(&store), 1, "refresher released the store");
    }
}
