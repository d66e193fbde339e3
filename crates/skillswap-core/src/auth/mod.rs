//! Session management.
//!
//! This module provides:
//! - `SessionStore`: the single owner of the persisted credential and profile
//! - `DurableStorage` backends: `FileStorage`, `KeyringStorage`, `MemoryStorage`
//!
//! The session lives under exactly two keys, `session.credential` and
//! `session.profile`, and both are written or removed together.

pub mod session;
pub mod storage;

pub use session::{SessionEvent, SessionState, SessionStore, CREDENTIAL_KEY, PROFILE_KEY};
pub use storage::{DurableStorage, FileStorage, KeyringStorage, MemoryStorage, StorageError};
