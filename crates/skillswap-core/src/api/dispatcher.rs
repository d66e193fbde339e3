//! Authenticated request dispatcher.
//!
//! Every backend call goes through [`Dispatcher::dispatch`]. It decides
//! whether a credential is required, attaches it, and handles credential
//! rejection in one place.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::endpoints::{access_for, Access};
use super::transport::{HttpRequest, Transport};
use super::ApiError;
use crate::auth::SessionStore;

/// Parsed success response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// `Null` for an empty body (e.g. 204)
    pub body: Value,
}

impl ApiResponse {
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("unexpected response shape: {}", e)))
    }
}

/// Credential choice for one call.
#[derive(Clone, Copy)]
enum Auth<'a> {
    /// Use the session's credential according to the endpoint table
    Session,
    /// Use this credential regardless of the session (profile fetch during login)
    Explicit(&'a str),
}

/// Clone is cheap: everything behind it is shared.
#[derive(Clone)]
pub struct Dispatcher {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
}

impl Dispatcher {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Full URL for an endpoint path like `/skills/`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request, attaching the session credential as required.
    ///
    /// A protected endpoint while anonymous fails with `Unauthenticated`
    /// before anything is sent. A 401/403 on a request that carried a
    /// credential clears the session and fails with `SessionExpired`.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(method, path, body, Auth::Session).await
    }

    /// Like [`dispatch`](Self::dispatch) but with a credential that is not
    /// (yet) the session's. A rejection here does not touch the session and
    /// comes back as `Business` with the status the backend sent.
    pub async fn dispatch_as(
        &self,
        credential: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(method, path, body, Auth::Explicit(credential)).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth<'_>,
    ) -> Result<ApiResponse, ApiError> {
        let access = access_for(&method, path);
        let bearer = match (access, auth) {
            (Access::Public, _) => None,
            (_, Auth::Explicit(credential)) => Some(credential.to_string()),
            (Access::Optional, Auth::Session) => self.session.credential(),
            (Access::Protected, Auth::Session) => match self.session.credential() {
                Some(credential) => Some(credential),
                None => {
                    debug!(%method, path, "Protected call without a session");
                    return Err(ApiError::Unauthenticated);
                }
            },
        };

        let request = HttpRequest {
            method: method.clone(),
            url: self.url(path),
            bearer: bearer.clone(),
            body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(message) => {
                warn!(%method, path, error = %message, "Request did not complete");
                return Err(ApiError::Transport(message));
            }
        };

        let status = response.status;
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            && matches!(auth, Auth::Session)
        {
            if let Some(ref credential) = bearer {
                let message = ApiError::message_from_body(status.as_u16(), &response.body);
                if self.session.expire(credential) {
                    warn!(%method, path, status = status.as_u16(), "Credential rejected, session cleared");
                }
                return Err(ApiError::SessionExpired(message));
            }
        }

        if !status.is_success() {
            warn!(
                %method,
                path,
                status = status.as_u16(),
                body = %ApiError::truncate_body(&response.body),
                "Request failed"
            );
            return Err(ApiError::from_status(status, &response.body));
        }

        let body = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).map_err(|e| {
                ApiError::InvalidResponse(format!(
                    "{} from {}: {}",
                    e,
                    path,
                    ApiError::truncate_body(&response.body)
                ))
            })?
        };

        debug!(%method, path, status = status.as_u16(), "Request succeeded");
        Ok(ApiResponse { status, body })
    }

    // ===== Typed helpers =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.dispatch(Method::GET, path, None).await?.into_json()
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.dispatch(Method::POST, path, Some(to_body(body)?)).await?.into_json()
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.dispatch(Method::PUT, path, Some(to_body(body)?)).await?.into_json()
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.dispatch(Method::DELETE, path, None).await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Validation(format!("Could not encode request: {}", e)))
}
