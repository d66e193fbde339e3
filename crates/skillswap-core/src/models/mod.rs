//! Data models for the skill swap marketplace.
//!
//! This module contains the records exchanged with the backend:
//!
//! - `UserProfile`, `Registration`, `TokenResponse`: identity and login
//! - `Skill`, `SkillSummary`, `NewSkill`, `SkillUpdate`, `Proficiency`: skill listings
//! - `ExchangeRequest`, `NewExchangeRequest`, `ExchangeStatus`: exchange requests
//! - `Notification`, `UnreadCount`: per-user notifications
//!
//! Only `UserProfile` is persisted (as part of the session). Everything else
//! is a transient view model fetched per page.

pub mod exchange;
pub mod notification;
pub mod skill;
pub mod user;

pub use exchange::{ExchangeRequest, ExchangeStatus, NewExchangeRequest, StatusUpdate};
pub use notification::{Notification, UnreadCount};
pub use skill::{NewSkill, Proficiency, Skill, SkillSummary, SkillUpdate};
pub use user::{Registration, TokenResponse, UserProfile};
