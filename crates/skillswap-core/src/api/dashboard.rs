use futures::future::try_join3;
use serde::Serialize;

use super::{ApiError, Dispatcher, ExchangesApi, NotificationsApi, SkillsApi};
use crate::models::{ExchangeStatus, Notification};

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DashboardSummary {
    pub skills_offered: usize,
    pub exchange_requests: usize,
    /// Requests for the user's own skills still awaiting an answer
    pub pending_incoming: usize,
    pub unread_notifications: usize,
}

/// Dashboard data plus the notifications it was computed from.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub notifications: Vec<Notification>,
}

#[derive(Clone)]
pub struct DashboardApi {
    dispatcher: Dispatcher,
}

impl DashboardApi {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Load my skills, exchanges and notifications concurrently.
    pub async fn load(&self) -> Result<Dashboard, ApiError> {
        let skills = SkillsApi::new(self.dispatcher.clone());
        let exchanges = ExchangesApi::new(self.dispatcher.clone());
        let notifications = NotificationsApi::new(self.dispatcher.clone());

        let (my_skills, requests, notifications) =
            try_join3(skills.mine(), exchanges.list(), notifications.list()).await?;

        let pending_incoming = match self.dispatcher.session().profile() {
            Some(me) => requests
                .iter()
                .filter(|r| r.is_incoming_for(&me) && r.status == Some(ExchangeStatus::Pending))
                .count(),
            None => 0,
        };

        let summary = DashboardSummary {
            skills_offered: my_skills.len(),
            exchange_requests: requests.len(),
            pending_incoming,
            unread_notifications: notifications.iter().filter(|n| !n.is_read).count(),
        };
        Ok(Dashboard { summary, notifications })
    }
}
