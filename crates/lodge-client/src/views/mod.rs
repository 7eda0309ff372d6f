//! View models.
//!
//! Each view owns its render state and exposes the user actions as async
//! methods taking `&mut self`, so a control cannot fire again while its call
//! is pending. Failures are reported once through the notifier and leave the
//! view in its last good state.

pub mod auth;
pub mod countdown;
pub mod dashboard;
pub mod entry;
pub mod map;
pub mod modal;
pub mod navigation;
pub mod promotion;
pub mod votes;

pub use auth::{LoginForm, RegisterForm};
pub use countdown::{Countdown, CountdownTicker};
pub use dashboard::{DashboardMode, DashboardView};
pub use entry::EntryView;
pub use map::{MapView, Pin};
pub use modal::{ConfirmationModal, ModalEvent, ModalState};
pub use navigation::{NavBar, NavLink};
pub use promotion::PromotionStatus;
pub use votes::{format_time, ProfileView, VoteAction, VoteRow};

use crate::error::{ApiError, ClientError};

const AUTH_ERROR: &str = "Authentication error. Please log in again.";

/// User-facing text for a failed call: 401 asks for a new login, anything
/// else gets `context` with the raw message appended.
pub(crate) fn describe_failure(context: &str, err: &ApiError) -> String {
    if err.is_unauthorized() {
        return AUTH_ERROR.to_string();
    }
    match err.detail() {
        Some(detail) => format!("{context}: {detail}"),
        None => format!("{context}: {err}"),
    }
}

/// Signals a control that is disabled in the current state.
pub(crate) fn unavailable(reason: impl Into<String>) -> ClientError {
    ClientError::Unavailable(reason.into())
}
