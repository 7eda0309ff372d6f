//! # lodge-shared
//!
//! Domain types shared by the lodge client crates: the rank/capability
//! model, wire shapes of users, markers and votes, form validation rules
//! and storage key constants.

pub mod constants;
pub mod error;
pub mod types;
pub mod validation;

pub use error::LodgeError;
