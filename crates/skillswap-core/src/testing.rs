//! Scripted transport for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::api::transport::{HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

enum Scripted {
    Respond(u16, String),
    Fail(String),
}

/// Replays canned responses keyed by method and path (including any query
/// string). Unscripted requests get a 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(String, String), Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
    yield_first: AtomicBool,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes.lock().insert(
            (method.to_string(), path.to_string()),
            Scripted::Respond(status, body.to_string()),
        );
    }

    pub fn fail(&self, method: &str, path: &str, message: &str) {
        self.routes.lock().insert(
            (method.to_string(), path.to_string()),
            Scripted::Fail(message.to_string()),
        );
    }

    /// Yield to the runtime before answering, so concurrent calls overlap.
    pub fn set_yield_before_respond(&self, enabled: bool) {
        self.yield_first.store(enabled, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

/// Path and query of an absolute URL.
fn path_of(url: &str) -> &str {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    match after_scheme.find('/') {
        Some(idx) => &after_scheme[idx..],
        None => "/",
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.lock().push(RecordedRequest {
            method: request.method.to_string(),
            url: request.url.clone(),
            bearer: request.bearer.clone(),
            body: request.body.clone(),
        });

        if self.yield_first.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        let key = (request.method.to_string(), path_of(&request.url).to_string());
        let routes = self.routes.lock();
        match routes.get(&key) {
            Some(Scripted::Respond(status, body)) => Ok(HttpResponse {
                status: StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body: body.clone(),
            }),
            Some(Scripted::Fail(message)) => Err(message.clone()),
            None => Ok(HttpResponse {
                status: StatusCode::NOT_FOUND,
                body: r#"{"detail": "Not Found"}"#.to_string(),
            }),
        }
    }
}
