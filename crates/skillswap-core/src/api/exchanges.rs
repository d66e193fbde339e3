use super::{ApiError, Dispatcher};
use crate::models::{ExchangeRequest, ExchangeStatus, NewExchangeRequest, StatusUpdate};

/// Exchange request endpoints. All of them require a session.
#[derive(Clone)]
pub struct ExchangesApi {
    dispatcher: Dispatcher,
}

impl ExchangesApi {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Requests the user sent or received.
    pub async fn list(&self) -> Result<Vec<ExchangeRequest>, ApiError> {
        self.dispatcher.get("/exchanges/").await
    }

    pub async fn get(&self, id: i64) -> Result<ExchangeRequest, ApiError> {
        self.dispatcher.get(&format!("/exchanges/{}", id)).await
    }

    /// Ask the owner of `skill_id` for an exchange.
    pub async fn create(&self, skill_id: i64, message: &str) -> Result<ExchangeRequest, ApiError> {
        let request = NewExchangeRequest {
            skill_id,
            message: message.trim().to_string(),
        };
        request.validate().map_err(ApiError::Validation)?;
        self.dispatcher.post("/exchanges/", &request).await
    }

    /// Accept, reject or complete a request (skill owner only).
    pub async fn update_status(&self, id: i64, status: ExchangeStatus) -> Result<ExchangeRequest, ApiError> {
        if !status.is_response() {
            return Err(ApiError::Validation(
                "A request can only be cancelled by withdrawing it".to_string(),
            ));
        }
        self.dispatcher
            .put(&format!("/exchanges/{}", id), &StatusUpdate { status })
            .await
    }

    /// Withdraw a request.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.dispatcher.delete(&format!("/exchanges/{}", id)).await?;
        Ok(())
    }
}
