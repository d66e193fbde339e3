//! Session controller: the one object a front end talks to.
//!
//! Owns the session store and dispatcher, runs the login / logout /
//! register flows, and keeps the notice shown with the current view.

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::json;
use tracing::{error, info, warn};

use crate::api::{
    ApiError, DashboardApi, Dispatcher, ExchangesApi, NotificationsApi, ReqwestTransport, SkillsApi,
    Transport,
};
use crate::auth::{
    DurableStorage, FileStorage, KeyringStorage, MemoryStorage, SessionEvent, SessionStore,
};
use crate::config::{Config, StorageKind};
use crate::models::{Registration, TokenResponse, UserProfile};
use crate::view::{notice_for_event, Notice, ViewState};

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

pub struct SessionController {
    session: Arc<SessionStore>,
    dispatcher: Dispatcher,
    notice: Mutex<Option<Notice>>,
}

impl SessionController {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, storage: Arc<dyn DurableStorage>) -> Self {
        let session = Arc::new(SessionStore::new(storage));
        let dispatcher = Dispatcher::new(base_url, transport, session.clone());
        Self {
            session,
            dispatcher,
            notice: Mutex::new(None),
        }
    }

    /// Build the real HTTP transport and storage backend from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        let transport = ReqwestTransport::new(config.request_timeout())
            .context("Failed to build HTTP client")?;
        let storage: Arc<dyn DurableStorage> = match config.storage {
            StorageKind::File => Arc::new(FileStorage::new(config.data_dir()?)),
            StorageKind::Keyring => Arc::new(KeyringStorage::new()),
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
        };
        info!(base_url = %base_url, storage = ?config.storage, "Controller configured");
        Ok(Self::new(&base_url, Arc::new(transport), storage))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn skills(&self) -> SkillsApi {
        SkillsApi::new(self.dispatcher.clone())
    }

    pub fn exchanges(&self) -> ExchangesApi {
        ExchangesApi::new(self.dispatcher.clone())
    }

    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.dispatcher.clone())
    }

    pub fn dashboard(&self) -> DashboardApi {
        DashboardApi::new(self.dispatcher.clone())
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Restore the stored session and return the first view.
    pub fn initialize(&self) -> ViewState {
        self.session.restore();
        self.view()
    }

    pub fn view(&self) -> ViewState {
        ViewState::for_session(&self.session.current(), self.notice.lock().clone())
    }

    pub fn set_notice(&self, notice: Notice) {
        *self.notice.lock() = Some(notice);
    }

    /// Record a failed operation as the current notice.
    pub fn note_error(&self, err: &ApiError) {
        self.set_notice(Notice::error(err.user_message()));
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for a session.
    ///
    /// The profile is fetched with the new credential before anything is
    /// saved, so a failure at any step leaves the previous session in place.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let result = self.try_login(username, password).await;
        match result {
            Ok(ref profile) => {
                info!(username = %profile.username, "Login successful");
                let notice = notice_for_event(&SessionEvent::SignedIn(profile.clone()))
                    .unwrap_or_else(|| Notice::success("Logged in"));
                self.set_notice(notice);
            }
            Err(ref e) => {
                error!(error = %e, "Login failed");
                self.note_error(e);
            }
        }
        result
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation("Username and password required".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(ApiError::Validation("Username is too long".to_string()));
        }
        if password.chars().count() > MAX_PASSWORD_LENGTH {
            return Err(ApiError::Validation("Password is too long".to_string()));
        }

        let token: TokenResponse = self
            .dispatcher
            .dispatch(
                Method::POST,
                "/users/login",
                Some(json!({ "username": username, "password": password })),
            )
            .await?
            .into_json()?;

        if token.access_token.is_empty() {
            return Err(ApiError::InvalidResponse("login returned an empty token".to_string()));
        }
        if !token.token_type.is_empty() && !token.token_type.eq_ignore_ascii_case("bearer") {
            warn!(token_type = %token.token_type, "Unexpected token type, using it as a bearer token");
        }

        // A refusal of the new token comes back as Business, never as expiry.
        let profile: UserProfile = self
            .dispatcher
            .dispatch_as(&token.access_token, Method::GET, "/users/me", None)
            .await?
            .into_json()?;

        self.session.save(token.access_token, profile.clone())?;
        Ok(profile)
    }

    /// Drop the session locally. No network round trip.
    pub fn logout(&self) -> ViewState {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove stored session");
        }
        let notice = notice_for_event(&SessionEvent::SignedOut)
            .unwrap_or_else(|| Notice::info("Logged out"));
        self.set_notice(notice);
        self.view()
    }

    /// Create an account. The user still has to log in afterwards.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        let result = self.try_register(registration).await;
        match result {
            Ok(ref user) => {
                info!(username = %user.username, "Registration successful");
                self.set_notice(Notice::success("Registration successful! Please login."));
            }
            Err(ref e) => {
                warn!(error = %e, "Registration failed");
                self.note_error(e);
            }
        }
        result
    }

    async fn try_register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        registration.validate().map_err(ApiError::Validation)?;
        let mut body = registration.clone();
        body.username = body.username.trim().to_string();
        body.email = body.email.trim().to_string();
        body.full_name = body.full_name.trim().to_string();
        body.bio = body.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
        self.dispatcher.post("/users/register", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionState;
    use crate::testing::FakeTransport;
    use crate::view::{NoticeLevel, Route};

    const ALICE: &str = r#"{"id": 1, "username": "alice", "full_name": "Alice Liddell", "email": "alice@example.com",
        "bio": null, "created_at": "2024-01-01T00:00:00", "is_active": true}"#;

    fn setup() -> (Arc<FakeTransport>, Arc<MemoryStorage>, SessionController) {
        let transport = Arc::new(FakeTransport::new());
        let storage = Arc::new(MemoryStorage::new());
        let controller = SessionController::new("http://api.test", transport.clone(), storage.clone());
        controller.initialize();
        (transport, storage, controller)
    }

    fn script_backend(transport: &FakeTransport) {
        transport.respond("POST", "/users/login", 200, r#"{"access_token": "tok-alice", "token_type": "bearer"}"#);
        transport.respond("GET", "/users/me", 200, ALICE);
    }

    fn registration() -> Registration {
        Registration {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Liddell".to_string(),
            password: "rabbit".to_string(),
            bio: Some("  ".to_string()),
        }
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_success_saves_profile() {
        let (transport, storage, controller) = setup();
        script_backend(&transport);

        let profile = controller.login("alice", "correct").await.expect("login");
        assert_eq!(profile.username, "alice");
        assert_eq!(controller.session().current().profile().map(|p| p.username.as_str()), Some("alice"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].bearer, None);
        assert_eq!(requests[1].bearer.as_deref(), Some("tok-alice"));

        let view = controller.view();
        assert_eq!(view.route, Route::Dashboard);
        assert_eq!(view.notice.map(|n| n.level), Some(NoticeLevel::Success));

        // Survives a restart.
        let restored = SessionStore::new(storage).restore();
        assert_eq!(restored.credential(), Some("tok-alice"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_business_error() {
        let (transport, _, controller) = setup();
        transport.respond("POST", "/users/login", 401, r#"{"detail": "Incorrect username or password"}"#);

        let err = controller.login("alice", "wrong").await.expect_err("must fail");
        assert!(matches!(err, ApiError::Business { status: 401, .. }));
        assert_eq!(controller.session().current(), SessionState::Anonymous);
        assert_eq!(
            controller.view().notice,
            Some(Notice::error("Incorrect username or password"))
        );
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_login_network_failure_is_transport_error() {
        let (transport, _, controller) = setup();
        transport.fail("POST", "/users/login", "could not connect");

        let err = controller.login("alice", "pw").await.expect_err("must fail");
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(
            controller.view().notice,
            Some(Notice::error("Network error. Please try again."))
        );
        assert!(!controller.session().current().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let (transport, _, controller) = setup();
        assert!(matches!(controller.login("", "pw").await, Err(ApiError::Validation(_))));
        assert!(matches!(controller.login("alice", "").await, Err(ApiError::Validation(_))));
        let long = "x".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(matches!(controller.login(&long, "pw").await, Err(ApiError::Validation(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_profile_fetch_failure_saves_nothing() {
        let (transport, storage, controller) = setup();
        transport.respond("POST", "/users/login", 200, r#"{"access_token": "tok", "token_type": "bearer"}"#);
        transport.respond("GET", "/users/me", 401, r#"{"detail": "User account is not active"}"#);

        let err = controller.login("alice", "pw").await.expect_err("must fail");
        match err {
            ApiError::Business { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "User account is not active");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!controller.session().current().is_authenticated());
        assert_eq!(SessionStore::new(storage).restore(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_profile_fetch_forbidden_keeps_status() {
        let (transport, _, controller) = setup();
        transport.respond("POST", "/users/login", 200, r#"{"access_token": "tok", "token_type": "bearer"}"#);
        transport.respond("GET", "/users/me", 403, r#"{"detail": "Account suspended"}"#);

        let err = controller.login("alice", "pw").await.expect_err("must fail");
        assert!(matches!(err, ApiError::Business { status: 403, .. }));
        assert_eq!(controller.view().notice, Some(Notice::error("Account suspended")));
        assert!(!controller.session().current().is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let (transport, _, controller) = setup();
        script_backend(&transport);
        controller.login("alice", "correct").await.expect("login");

        transport.respond("POST", "/users/login", 401, r#"{"detail": "Incorrect username or password"}"#);
        assert!(controller.login("mallory", "guess").await.is_err());
        assert_eq!(controller.session().credential().as_deref(), Some("tok-alice"));
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let (transport, _, controller) = setup();
        transport.respond("POST", "/users/login", 200, r#"{"access_token": "", "token_type": "bearer"}"#);
        assert!(matches!(
            controller.login("alice", "pw").await,
            Err(ApiError::InvalidResponse(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Logout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_logout_is_local() {
        let (transport, storage, controller) = setup();
        script_backend(&transport);
        controller.login("alice", "correct").await.expect("login");
        let calls = transport.call_count();

        let view = controller.logout();
        assert_eq!(view.route, Route::Login);
        assert_eq!(view.user, None);
        assert_eq!(transport.call_count(), calls);
        assert_eq!(SessionStore::new(storage).restore(), SessionState::Anonymous);

        // Logging out twice is harmless.
        assert_eq!(controller.logout().route, Route::Login);
    }

    // -------------------------------------------------------------------------
    // Register
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_register_does_not_sign_in() {
        let (transport, _, controller) = setup();
        transport.respond("POST", "/users/register", 201, ALICE);

        let user = controller.register(&registration()).await.expect("registered");
        assert_eq!(user.username, "alice");
        assert!(!controller.session().current().is_authenticated());
        assert_eq!(
            controller.view().notice,
            Some(Notice::success("Registration successful! Please login."))
        );

        let body = transport.requests()[0].body.clone().expect("body");
        assert_eq!(body["bio"], serde_json::Value::Null);
        assert_eq!(body["password"], "rabbit");
    }

    #[tokio::test]
    async fn test_register_validation_never_dispatches() {
        let (transport, _, controller) = setup();
        let mut r = registration();
        r.email = "not-an-email".to_string();

        let err = controller.register(&r).await.expect_err("must fail");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (transport, _, controller) = setup();
        transport.respond("POST", "/users/register", 400, r#"{"detail": "Username already registered"}"#);

        let err = controller.register(&registration()).await.expect_err("must fail");
        assert_eq!(err.user_message(), "Username already registered");
    }

    // -------------------------------------------------------------------------
    // Expiry through the controller
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_expired_session_routes_to_login() {
        let (transport, _, controller) = setup();
        script_backend(&transport);
        controller.login("alice", "correct").await.expect("login");
        transport.respond("GET", "/exchanges/", 401, r#"{"detail": "Could not validate credentials"}"#);

        let err = controller.exchanges().list().await.expect_err("must fail");
        controller.note_error(&err);

        let view = controller.view();
        assert_eq!(view.route, Route::Login);
        assert_eq!(
            view.notice,
            Some(Notice::error("Your session has expired. Please log in again."))
        );
    }
}
