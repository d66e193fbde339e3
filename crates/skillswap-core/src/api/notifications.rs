use super::{ApiError, Dispatcher};
use crate::models::{Notification, UnreadCount};

/// Notification endpoints. All of them require a session.
#[derive(Clone)]
pub struct NotificationsApi {
    dispatcher: Dispatcher,
}

impl NotificationsApi {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.dispatcher.get("/notifications/").await
    }

    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let count: UnreadCount = self.dispatcher.get("/notifications/unread-count").await?;
        Ok(count.unread_count)
    }

    pub async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        self.dispatcher
            .dispatch(reqwest::Method::PUT, &format!("/notifications/{}/read", id), None)
            .await?;
        Ok(())
    }
}
