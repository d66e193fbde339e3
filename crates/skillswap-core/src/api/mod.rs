//! REST API access for the skill swap backend.
//!
//! All requests go through the `Dispatcher`, which owns credential
//! attachment and authorization-failure handling. The resource clients
//! (`SkillsApi`, `ExchangesApi`, `NotificationsApi`, `DashboardApi`) are thin
//! typed wrappers over it.

pub mod dashboard;
pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod exchanges;
pub mod notifications;
pub mod skills;
pub mod transport;

pub use dashboard::{Dashboard, DashboardApi, DashboardSummary};
pub use dispatcher::{ApiResponse, Dispatcher};
pub use endpoints::{access_for, Access};
pub use error::ApiError;
pub use exchanges::ExchangesApi;
pub use notifications::NotificationsApi;
pub use skills::SkillsApi;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
