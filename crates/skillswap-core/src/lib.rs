//! Skillswap core - session handling and backend access for the skill swap
//! marketplace.
//!
//! The pieces, bottom up:
//!
//! - [`auth`]: the session store and its durable storage backends
//! - [`api`]: the authenticated request dispatcher and typed resource clients
//! - [`controller`]: login / logout / register flows over both
//! - [`view`]: the structured view state a front end renders
//!
//! All persistence and business rules live in the backend service; this
//! crate only keeps the session and talks HTTP.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod models;
pub mod utils;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::ApiError;
pub use config::Config;
pub use controller::SessionController;
pub use view::{Notice, NoticeLevel, Route, ViewState};
