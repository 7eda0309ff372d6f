//! # lodge-store
//!
//! Persistent client-side storage for the lodge client, backed by SQLite.
//!
//! The store plays the role browser local storage plays for a web front
//! end: a flat string key/value table that survives restarts and can be
//! wiped in one call. Typed JSON helpers sit on top for structured values
//! such as the session user.

pub mod migrations;
pub mod storage;

mod error;

pub use error::{Result, StoreError};
pub use storage::LocalStorage;
