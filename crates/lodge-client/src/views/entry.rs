//! Entry password gate.

use lodge_shared::types::{EntryPasswordRequest, EntryPasswordResponse};
use lodge_shared::validation::validate_entry_password;
use tracing::{info, warn};

use crate::api::Outcome;
use crate::error::{ApiError, Result};
use crate::nav::Route;
use crate::state::AppState;

const DEFAULT_REJECTION: &str = "Incorrect password";
const CONNECTION_ERROR: &str = "Connection error. Please try again.";

#[derive(Debug, Default)]
pub struct EntryView {
    pub error: Option<String>,
    pub loading: bool,
}

impl EntryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the entry password. Returns whether the gate opened.
    pub async fn submit(&mut self, state: &AppState, password: &str) -> Result<bool> {
        if let Some(message) = validate_entry_password(password) {
            self.error = Some(message);
            return Ok(false);
        }
        self.error = None;
        self.loading = true;

        let body = EntryPasswordRequest { password };
        let result = state
            .api
            .post_json::<_, EntryPasswordResponse>("verify-entry-password/", &body)
            .await;
        self.loading = false;

        match result {
            Ok(Outcome::Done(response)) if response.success => {
                state.session()?.mark_entry_verified()?;
                info!("entry password accepted");
                state.navigator.go(Route::Login);
                Ok(true)
            }
            Ok(Outcome::Done(response)) => {
                self.error = Some(response.error.unwrap_or_else(|| DEFAULT_REJECTION.into()));
                Ok(false)
            }
            Ok(Outcome::Redirecting(_)) => Ok(false),
            Err(ApiError::Status { detail, .. }) => {
                self.error = Some(detail.unwrap_or_else(|| DEFAULT_REJECTION.into()));
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "entry password check failed");
                self.error = Some(CONNECTION_ERROR.into());
                Ok(false)
            }
        }
    }
}
